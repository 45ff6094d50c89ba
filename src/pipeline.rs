use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::db;
use crate::parser::schema;
use crate::parser::{GazetteDocumentBuilder, PdfDocumentBuilder, PdfSegmentRow};
use crate::pdf;
use crate::source;

/// Records handed to the worker pool per batch; each batch is one DB transaction.
const CHUNK_SIZE: usize = 500;
const DB_EXT: &str = "sqlite";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Xml,
    Zip,
    Pdf,
}

impl InputKind {
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xml" => Ok(InputKind::Xml),
            "zip" => Ok(InputKind::Zip),
            "pdf" => Ok(InputKind::Pdf),
            _ => bail!("unsupported input: only .xml, .zip and .pdf files are accepted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Gazette { records: usize, lines: usize, articles: usize },
    Pdf { pages: usize, segments: usize },
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::Gazette { records, lines, articles } => {
                write!(f, "{} records, {} lines, {} articles", records, lines, articles)
            }
            Summary::Pdf { pages, segments } => write!(f, "{} pages, {} segments", pages, segments),
        }
    }
}

#[derive(Debug)]
pub struct Converted {
    pub input: PathBuf,
    pub output: PathBuf,
    pub summary: Summary,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<Converted>,
    /// `"<file>: <reason>"` per failed input.
    pub errors: Vec<String>,
}

impl BatchReport {
    pub fn all_failed(&self) -> bool {
        self.converted.is_empty() && !self.errors.is_empty()
    }
}

/// Convert every input into its own database under `out_dir`.
///
/// A failing input is recorded and skipped; the rest of the batch still runs.
pub fn convert_batch(inputs: &[PathBuf], out_dir: &Path) -> Result<BatchReport> {
    std::fs::create_dir_all(out_dir)?;
    let mut taken = HashSet::new();
    let mut report = BatchReport::default();

    for input in inputs {
        match convert_file(input, out_dir, &mut taken) {
            Ok(converted) => {
                info!(
                    "{} → {} ({})",
                    input.display(),
                    converted.output.display(),
                    converted.summary
                );
                report.converted.push(converted);
            }
            Err(e) => {
                warn!("Failed to convert {}: {:#}", input.display(), e);
                report.errors.push(format!("{}: {:#}", display_name(input), e));
            }
        }
    }

    Ok(report)
}

pub fn convert_file(input: &Path, out_dir: &Path, taken: &mut HashSet<String>) -> Result<Converted> {
    let kind = InputKind::detect(input)?;
    let name = display_name(input);

    let (output, summary) = match kind {
        InputKind::Xml => {
            let xml = source::read_xml_file(input)?;
            let output = claim_output(out_dir, &format!("{}.{}", file_stem(input), DB_EXT), taken);
            let summary = with_cleanup(&output, |out| convert_gazette(&xml, &name, out))?;
            (output, summary)
        }
        InputKind::Zip => {
            let (entry, xml) = source::read_xml_from_zip(input)?;
            let stem = file_stem(Path::new(&entry));
            let output = claim_output(out_dir, &format!("{}.{}", stem, DB_EXT), taken);
            let summary = with_cleanup(&output, |out| convert_gazette(&xml, &entry, out))?;
            (output, summary)
        }
        InputKind::Pdf => {
            let output = claim_output(out_dir, &format!("{}_pdf.{}", file_stem(input), DB_EXT), taken);
            let summary = with_cleanup(&output, |out| convert_pdf(input, &name, out))?;
            (output, summary)
        }
    };

    Ok(Converted {
        input: input.to_path_buf(),
        output,
        summary,
    })
}

/// Parse records, build rows in parallel chunks, write them in record order.
pub fn convert_gazette(xml: &[u8], source_name: &str, output: &Path) -> Result<Summary> {
    let records = source::parse_records(xml)?;
    info!("Found {} records in {}", records.len(), source_name);
    if records.is_empty() {
        bail!("no <Record> elements found");
    }

    let conn = db::connect(output)?;
    db::init_schema(&conn)?;

    let builder = GazetteDocumentBuilder::new(schema::GAZETTE);
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut lines = 0;
    let mut articles = 0;
    for chunk in records.chunks(CHUNK_SIZE) {
        let docs: Vec<_> = chunk.par_iter().map(|r| builder.build(r)).collect();
        lines += docs.iter().map(|d| d.lines.len()).sum::<usize>();
        articles += docs.iter().map(|d| d.articles.len()).sum::<usize>();
        db::save_gazette(&conn, &docs)?;
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    db::record_source(&conn, source_name, "xml", records.len(), records.len() + lines + articles)?;
    info!("Lines: {}, Articles: {}", lines, articles);

    Ok(Summary::Gazette {
        records: records.len(),
        lines,
        articles,
    })
}

/// Segment every page in parallel; rows keep page then segment order.
pub fn convert_pdf(input: &Path, source_name: &str, output: &Path) -> Result<Summary> {
    let pages = pdf::extract_pages(input)?;
    let builder = PdfDocumentBuilder::new(source_name);

    let rows: Vec<PdfSegmentRow> = pages
        .par_iter()
        .map(|p| builder.build_page(p.number, &p.text))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    if rows.is_empty() {
        bail!("no extractable text in PDF");
    }

    let conn = db::connect(output)?;
    db::init_schema(&conn)?;
    db::save_pdf_segments(&conn, &rows)?;
    db::record_source(&conn, source_name, "pdf", pages.len(), rows.len())?;
    info!("PDF {} produced {} segments", source_name, rows.len());

    Ok(Summary::Pdf {
        pages: pages.len(),
        segments: rows.len(),
    })
}

/// Pick a free output file name, suffixing `_2`, `_3`, ... on collisions within a batch.
fn claim_output(out_dir: &Path, name: &str, taken: &mut HashSet<String>) -> PathBuf {
    let path = Path::new(name);
    let base = file_stem(path);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or(DB_EXT);

    let mut candidate = name.to_string();
    let mut idx = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}.{}", base, idx, ext);
        idx += 1;
    }
    taken.insert(candidate.clone());
    out_dir.join(candidate)
}

/// Start from a fresh file and remove it again if conversion fails.
fn with_cleanup<F>(output: &Path, convert: F) -> Result<Summary>
where
    F: FnOnce(&Path) -> Result<Summary>,
{
    if output.exists() {
        std::fs::remove_file(output)?;
    }
    let result = convert(output);
    if result.is_err() && output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            warn!("Could not remove partial output {}: {}", output.display(), e);
        }
    }
    result
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
