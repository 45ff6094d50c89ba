use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use crate::parser::schema::{self, SqlType, Table};
use crate::parser::{GazetteDocument, PdfSegmentRow};

/// Every output table, in creation order.
pub const TABLES: [Table; 4] = [schema::GAZETTE, schema::LINES, schema::ARTICLES, schema::PDF_TEXT];

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Open a database written by an earlier `convert`, without creating or altering it.
pub fn open_existing(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        bail!("database not found: {}", path.display());
    }
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open database {}", path.display()))
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    let mut ddl = String::new();
    for table in &TABLES {
        ddl.push_str(&create_table_sql(table));
    }
    ddl.push_str(
        "
        CREATE TABLE IF NOT EXISTS sources (
            id           INTEGER PRIMARY KEY,
            source_file  TEXT NOT NULL,
            kind         TEXT NOT NULL CHECK(kind IN ('xml','pdf')),
            converted_at TEXT NOT NULL,
            item_count   INTEGER NOT NULL,
            row_count    INTEGER NOT NULL
        );
        ",
    );
    conn.execute_batch(&ddl)?;
    Ok(())
}

/// `id` keeps emission order; the declared columns follow it.
fn create_table_sql(table: &Table) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("\"{}\" {} NOT NULL", c.name, c.sql_type.as_sql()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    id INTEGER PRIMARY KEY,\n    {}\n);\n",
        table.name,
        columns.join(",\n    ")
    )
}

fn quoted_columns(table: &Table) -> String {
    table
        .column_names()
        .map(|name| format!("\"{}\"", name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql(table: &Table) -> String {
    let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        quoted_columns(table),
        placeholders.join(", ")
    )
}

// ── Gazette XML ──

/// Write a batch of documents in record order: gazette rows, then lines, then articles.
pub fn save_gazette(conn: &Connection, docs: &[GazetteDocument]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut g_stmt = tx.prepare(&insert_sql(&schema::GAZETTE))?;
        for d in docs {
            g_stmt.execute(rusqlite::params_from_iter(d.gazette.values.iter()))?;
        }

        let mut l_stmt = tx.prepare(&insert_sql(&schema::LINES))?;
        for l in docs.iter().flat_map(|d| &d.lines) {
            l_stmt.execute(rusqlite::params![l.meta_id, l.gazette_id, l.line_no, l.text])?;
        }

        let mut a_stmt = tx.prepare(&insert_sql(&schema::ARTICLES))?;
        for a in docs.iter().flat_map(|d| &d.articles) {
            a_stmt.execute(rusqlite::params![
                a.meta_id, a.gazette_id, a.article_no, a.title_line, a.line_start, a.line_end, a.text,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── PDF ──

pub fn save_pdf_segments(conn: &Connection, rows: &[PdfSegmentRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(&insert_sql(&schema::PDF_TEXT))?;
        for r in rows {
            stmt.execute(rusqlite::params![
                r.source_file,
                r.page,
                r.segment_no,
                r.segment_type.as_str(),
                r.text,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Sources ──

pub fn record_source(
    conn: &Connection,
    source_file: &str,
    kind: &str,
    item_count: usize,
    row_count: usize,
) -> Result<()> {
    conn.execute(
        "INSERT INTO sources (source_file, kind, converted_at, item_count, row_count)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            source_file,
            kind,
            chrono::Utc::now().to_rfc3339(),
            item_count,
            row_count,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SourceRow {
    pub source_file: String,
    pub kind: String,
    pub converted_at: String,
    pub item_count: usize,
    pub row_count: usize,
}

// ── Stats ──

#[derive(Debug, Serialize)]
pub struct Stats {
    pub gazette: usize,
    pub lines: usize,
    pub articles: usize,
    pub pdf_text: usize,
    pub sources: Vec<SourceRow>,
}

fn count(conn: &Connection, table: &Table) -> Result<usize> {
    let n: usize = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |r| r.get(0))?;
    Ok(n)
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let mut stmt = conn.prepare(
        "SELECT source_file, kind, converted_at, item_count, row_count FROM sources ORDER BY id",
    )?;
    let sources = stmt
        .query_map([], |row| {
            Ok(SourceRow {
                source_file: row.get(0)?,
                kind: row.get(1)?,
                converted_at: row.get(2)?,
                item_count: row.get(3)?,
                row_count: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stats {
        gazette: count(conn, &schema::GAZETTE)?,
        lines: count(conn, &schema::LINES)?,
        articles: count(conn, &schema::ARTICLES)?,
        pdf_text: count(conn, &schema::PDF_TEXT)?,
        sources,
    })
}

// ── Export ──

/// Read rows back in emission order as JSON objects keyed by column name.
pub fn fetch_rows(
    conn: &Connection,
    table: &Table,
    limit: Option<usize>,
) -> Result<Vec<serde_json::Value>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY id{}",
        quoted_columns(table),
        table.name,
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            let mut obj = serde_json::Map::new();
            for (i, col) in table.columns.iter().enumerate() {
                let value = match col.sql_type {
                    SqlType::Integer => serde_json::Value::from(row.get::<_, i64>(i)?),
                    SqlType::Text => serde_json::Value::from(row.get::<_, String>(i)?),
                };
                obj.insert(col.name.to_string(), value);
            }
            Ok(serde_json::Value::Object(obj))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
