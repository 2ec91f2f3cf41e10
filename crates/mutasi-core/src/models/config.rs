//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MutasiError, Result};
use crate::models::statement::Bank;
use crate::statement::banks::{bca, blu, bni, mandiri};

/// Main configuration for the mutasi pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutasiConfig {
    /// Extraction behaviour shared by every layout.
    pub extraction: ExtractionConfig,

    /// Per-layout tuning.
    pub layouts: LayoutConfig,
}

/// Extraction behaviour shared by every layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Year used for dates that carry none and have no period label to infer from.
    /// Falls back to the current calendar year when unset.
    pub statement_year: Option<i32>,

    /// Derive missing summary totals from the transaction list.
    pub derive_missing_totals: bool,

    /// Ignore the weak keyword tier of the classifier.
    pub strict_classification: bool,

    /// Report extraction warnings alongside the statement.
    pub include_warnings: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            statement_year: None,
            derive_missing_totals: true,
            strict_classification: false,
            include_warnings: true,
        }
    }
}

/// Scan windows for one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum narration lines gathered around a transaction anchor.
    pub description_window: usize,

    /// Maximum lines scanned after a summary label for its value.
    pub summary_window: usize,
}

impl WindowConfig {
    /// Built-in windows of `bank`'s layout.
    pub fn for_bank(bank: Bank) -> Self {
        let (description_window, summary_window) = match bank {
            Bank::Bca => (bca::DESCRIPTION_WINDOW, bca::SUMMARY_WINDOW),
            Bank::Mandiri => (mandiri::DESCRIPTION_WINDOW, mandiri::SUMMARY_WINDOW),
            Bank::Bni => (bni::DESCRIPTION_WINDOW, bni::SUMMARY_WINDOW),
            Bank::Blu => (blu::DESCRIPTION_WINDOW, blu::SUMMARY_WINDOW),
        };
        Self {
            description_window,
            summary_window,
        }
    }
}

/// A layout entry as written in the file. Absent fields keep the layout's default.
#[derive(Deserialize)]
struct WindowOverride {
    description_window: Option<usize>,
    summary_window: Option<usize>,
}

fn windows_over<'de, D: Deserializer<'de>>(
    deserializer: D,
    bank: Bank,
) -> std::result::Result<WindowConfig, D::Error> {
    let entry = WindowOverride::deserialize(deserializer)?;
    let base = WindowConfig::for_bank(bank);
    Ok(WindowConfig {
        description_window: entry.description_window.unwrap_or(base.description_window),
        summary_window: entry.summary_window.unwrap_or(base.summary_window),
    })
}

fn bca_windows<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<WindowConfig, D::Error> {
    windows_over(d, Bank::Bca)
}

fn mandiri_windows<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<WindowConfig, D::Error> {
    windows_over(d, Bank::Mandiri)
}

fn bni_windows<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<WindowConfig, D::Error> {
    windows_over(d, Bank::Bni)
}

fn blu_windows<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<WindowConfig, D::Error> {
    windows_over(d, Bank::Blu)
}

/// Per-layout tuning. Each layout keeps its own defaults, field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    #[serde(deserialize_with = "bca_windows")]
    pub bca: WindowConfig,
    #[serde(deserialize_with = "mandiri_windows")]
    pub mandiri: WindowConfig,
    #[serde(deserialize_with = "bni_windows")]
    pub bni: WindowConfig,
    #[serde(deserialize_with = "blu_windows")]
    pub blu: WindowConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            bca: WindowConfig::for_bank(Bank::Bca),
            mandiri: WindowConfig::for_bank(Bank::Mandiri),
            bni: WindowConfig::for_bank(Bank::Bni),
            blu: WindowConfig::for_bank(Bank::Blu),
        }
    }
}

impl LayoutConfig {
    /// Windows configured for `bank`.
    pub fn windows(&self, bank: Bank) -> WindowConfig {
        match bank {
            Bank::Bca => self.bca,
            Bank::Mandiri => self.mandiri,
            Bank::Bni => self.bni,
            Bank::Blu => self.blu,
        }
    }
}

impl MutasiConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MutasiError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| MutasiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
