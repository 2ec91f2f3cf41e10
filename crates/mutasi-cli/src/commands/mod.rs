//! Subcommands and the output formatting they share.

pub mod batch;
pub mod config;
pub mod process;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use mutasi_core::statement::rules::format_rupiah;
use mutasi_core::{ExtractionResult, RawDocument};

/// Output format for extraction results.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON statement summary
    Json,
    /// One CSV row per transaction
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Metadata sidecar read next to `input` when no file is named explicitly.
pub fn sidecar_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Read a statement text file and its metadata into a document.
///
/// Metadata comes from `meta_file`, else the sidecar when present. Entries in `meta`
/// override both.
pub fn load_document(
    input: &Path,
    meta: &[(String, String)],
    meta_file: Option<&Path>,
) -> anyhow::Result<RawDocument> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let meta_path = match meta_file {
        Some(path) => Some(path.to_path_buf()),
        None => Some(sidecar_path(input)).filter(|p| p.exists()),
    };

    let mut metadata: HashMap<String, String> = match meta_path {
        Some(path) => {
            debug!("Reading metadata from {}", path.display());
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid metadata file {}", path.display()))?
        }
        None => HashMap::new(),
    };

    for (key, value) in meta {
        metadata.insert(key.clone(), value.clone());
    }

    let mut document = RawDocument::new(&text, metadata);
    if let Some(name) = input.file_name().and_then(|s| s.to_str()) {
        document = document.with_filename(name);
    }

    Ok(document)
}

/// Parse a `KEY=VALUE` metadata argument.
pub fn parse_meta(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty metadata key in {:?}", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(&result.statement)?),
        OutputFormat::Json => Ok(serde_json::to_string(&result.statement)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "description", "amount", "direction", "balance", "bank"])?;

    for txn in &result.statement.transactions {
        wtr.write_record([
            &txn.date.to_string(),
            &txn.description,
            &txn.amount.to_string(),
            &txn.direction.to_string(),
            &txn.balance.map(|b| b.to_string()).unwrap_or_default(),
            &txn.bank.tag().to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let statement = &result.statement;
    let mut output = String::new();

    output.push_str(&format!("Bank: {}\n", result.bank));
    if !statement.period.is_empty() {
        output.push_str(&format!("Period: {}\n", statement.period));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Initial:  Rp {}\n", format_rupiah(statement.initial_balance)));
    output.push_str(&format!("  Incoming: Rp {}\n", format_rupiah(statement.incoming_total)));
    output.push_str(&format!("  Outgoing: Rp {}\n", format_rupiah(statement.outgoing_total)));
    output.push_str(&format!("  Closing:  Rp {}\n", format_rupiah(statement.closing_balance)));
    output.push('\n');

    output.push_str(&format!("Transactions ({}):\n", statement.transactions.len()));
    for txn in &statement.transactions {
        let sign = if txn.signed_amount().is_sign_negative() { "-" } else { "+" };
        output.push_str(&format!(
            "  {}  {}{:>16}  {}\n",
            txn.date,
            sign,
            format_rupiah(txn.amount),
            txn.description
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meta() {
        assert_eq!(
            parse_meta("creator=PT. Bank Mandiri (Persero) Tbk"),
            Ok((
                "creator".to_string(),
                "PT. Bank Mandiri (Persero) Tbk".to_string()
            ))
        );
        assert_eq!(parse_meta("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_meta("creator").is_err());
        assert!(parse_meta("=x").is_err());
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("nov/bca.txt")),
            PathBuf::from("nov/bca.txt.meta.json")
        );
    }
}
