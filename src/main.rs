mod db;
mod parser;
mod pdf;
mod pipeline;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use parser::schema::{self, Table};

#[derive(Parser)]
#[command(name = "gazette_extract", about = "Legislative gazette XML/PDF to structured tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert .xml, .zip (containing XML) or .pdf files, one database per input
    Convert {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for the generated .sqlite files
        #[arg(short, long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Show row counts and conversion history of a database
    Stats {
        db: PathBuf,
        /// Print the stats as one JSON object
        #[arg(long)]
        json: bool,
    },
    /// Print rows of one table as JSON lines
    Export {
        db: PathBuf,
        #[arg(short, long, value_enum)]
        table: TableArg,
        /// Max rows to print (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TableArg {
    Gazette,
    Lines,
    Articles,
    PdfText,
}

impl TableArg {
    fn table(self) -> Table {
        match self {
            TableArg::Gazette => schema::GAZETTE,
            TableArg::Lines => schema::LINES,
            TableArg::Articles => schema::ARTICLES,
            TableArg::PdfText => schema::PDF_TEXT,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { inputs, out_dir } => {
            println!("Converting {} file(s) into {}...", inputs.len(), out_dir.display());
            let report = pipeline::convert_batch(&inputs, &out_dir)?;

            for c in &report.converted {
                println!("{} → {} ({})", c.input.display(), c.output.display(), c.summary);
            }
            if !report.errors.is_empty() {
                println!("\n--- Failed ---");
                for e in &report.errors {
                    println!("  {}", e);
                }
            }

            if report.all_failed() {
                Err(anyhow::anyhow!("all {} input(s) failed", report.errors.len()))
            } else {
                println!(
                    "Done: {} converted, {} failed.",
                    report.converted.len(),
                    report.errors.len()
                );
                Ok(())
            }
        }
        Commands::Stats { db: path, json } => {
            let conn = db::open_existing(&path)?;
            let s = db::get_stats(&conn)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                print_stats(&s);
            }
            Ok(())
        }
        Commands::Export { db: path, table, limit } => {
            let conn = db::open_existing(&path)?;
            for row in db::fetch_rows(&conn, &table.table(), limit)? {
                println!("{}", serde_json::to_string(&row)?);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn print_stats(s: &db::Stats) {
    println!("Gazette:  {}", s.gazette);
    println!("Lines:    {}", s.lines);
    println!("Articles: {}", s.articles);
    println!("PdfText:  {}", s.pdf_text);

    if !s.sources.is_empty() {
        println!("\n--- Sources ---");
        for src in &s.sources {
            println!(
                "  {:<32} | {:<3} | {:>6} items | {:>8} rows | {}",
                truncate(&src.source_file, 32),
                src.kind,
                src.item_count,
                src.row_count,
                src.converted_at
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_convert() {
        let cli = Cli::try_parse_from(["gazette_extract", "convert", "a.xml", "b.pdf", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Convert { inputs, out_dir } => {
                assert_eq!(inputs, vec![PathBuf::from("a.xml"), PathBuf::from("b.pdf")]);
                assert_eq!(out_dir, PathBuf::from("out"));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn convert_requires_inputs() {
        assert!(Cli::try_parse_from(["gazette_extract", "convert"]).is_err());
    }

    #[test]
    fn export_table_names() {
        let cli = Cli::try_parse_from(["gazette_extract", "export", "x.sqlite", "--table", "pdf-text", "-n", "3"]).unwrap();
        match cli.command {
            Commands::Export { table, limit, .. } => {
                assert_eq!(table.table().name, "pdf_text");
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn stats_json_flag() {
        let cli = Cli::try_parse_from(["gazette_extract", "stats", "x.sqlite", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats { json: true, .. }));
        let cli = Cli::try_parse_from(["gazette_extract", "stats", "x.sqlite"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats { json: false, .. }));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("公報發行條例", 4), "公報發行...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
