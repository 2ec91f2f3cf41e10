//! Process command - extract a single statement text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use mutasi_core::{DocumentParser, StatementParser};

use super::config::load_config;
use super::{format_result, load_document, parse_meta, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file, one statement line per line
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document metadata entry, e.g. creator="PT. Bank Mandiri (Persero) Tbk"
    #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    meta: Vec<(String, String)>,

    /// JSON object of metadata (default: <input>.meta.json when present)
    #[arg(long)]
    meta_file: Option<PathBuf>,

    /// Year for dates printed without one
    #[arg(short, long)]
    year: Option<i32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Report reconciliation issues
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let document = load_document(&args.input, &args.meta, args.meta_file.as_deref())?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting transactions...");

    let mut parser = StatementParser::from_config(&config);
    if let Some(year) = args.year {
        parser = parser.with_statement_year(year);
    }

    let result = parser.parse(&document);
    pb.finish_and_clear();
    let result = result?;

    for warning in &result.warnings {
        warn!("{}: {}", args.input.display(), warning);
    }

    if args.validate {
        if result.warnings.is_empty() {
            eprintln!("{} No reconciliation issues", style("✓").green());
        } else {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &result.warnings {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_result(&result, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} {} {} transactions written to {}",
            style("✓").green(),
            result.statement.transactions.len(),
            result.bank,
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
