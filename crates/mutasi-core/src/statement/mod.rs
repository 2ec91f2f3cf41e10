//! Bank statement classification and extraction.

pub mod banks;
mod classifier;
pub mod engine;
mod parser;
pub mod rules;

pub use classifier::{classify, classify_with, ClassifierRule, Signal, SignalTier};
pub use parser::{DocumentParser, ExtractionResult, StatementParser};

use crate::error::ClassificationError;
use crate::models::{Bank, LayoutConfig, MutasiConfig, RawDocument, StatementSummary};

use banks::{BcaEngine, BluEngine, BniEngine, MandiriEngine};

/// Result type for statement operations.
pub type Result<T> = std::result::Result<T, ClassificationError>;

/// Inputs an engine needs besides the document itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContext {
    /// Year for dates that carry none when no period label supplies one.
    pub fallback_year: i32,
    /// Per-layout scan windows.
    pub layouts: LayoutConfig,
    /// Derive absent summary totals from the transactions.
    pub derive_missing_totals: bool,
}

impl ExtractionContext {
    /// Default layouts, derived totals, and the given fallback year.
    pub fn new(fallback_year: i32) -> Self {
        Self {
            fallback_year,
            layouts: LayoutConfig::default(),
            derive_missing_totals: true,
        }
    }

    pub fn from_config(config: &MutasiConfig, fallback_year: i32) -> Self {
        Self {
            fallback_year,
            layouts: config.layouts.clone(),
            derive_missing_totals: config.extraction.derive_missing_totals,
        }
    }
}

/// Output of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub statement: StatementSummary,
    /// Pending transactions dropped for lack of a date or amount.
    pub warnings: Vec<String>,
}

/// Trait for per-layout statement extractors.
pub trait StatementExtractor {
    /// Bank whose layout this extractor reads.
    fn bank(&self) -> Bank;

    /// Extract transactions and totals from an already classified document.
    fn extract(&self, document: &RawDocument, context: &ExtractionContext) -> Extraction;
}

static BCA: BcaEngine = BcaEngine;
static MANDIRI: MandiriEngine = MandiriEngine;
static BNI: BniEngine = BniEngine;
static BLU: BluEngine = BluEngine;

/// The extractor for `bank`.
pub fn extractor_for(bank: Bank) -> &'static dyn StatementExtractor {
    match bank {
        Bank::Bca => &BCA,
        Bank::Mandiri => &MANDIRI,
        Bank::Bni => &BNI,
        Bank::Blu => &BLU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_for_every_bank() {
        for bank in [Bank::Bca, Bank::Mandiri, Bank::Bni, Bank::Blu] {
            assert_eq!(extractor_for(bank).bank(), bank);
        }
    }

    #[test]
    fn test_context_from_config() {
        let mut config = MutasiConfig::default();
        config.extraction.derive_missing_totals = false;
        config.layouts.bni.description_window = 2;

        let context = ExtractionContext::from_config(&config, 2024);
        assert_eq!(context.fallback_year, 2024);
        assert!(!context.derive_missing_totals);
        assert_eq!(context.layouts.bni.description_window, 2);
    }
}
