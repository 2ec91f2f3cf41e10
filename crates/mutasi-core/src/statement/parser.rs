//! Statement parser: classification followed by layout extraction.

use std::time::Instant;

use chrono::{Datelike, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::models::{Bank, LayoutConfig, MutasiConfig, RawDocument, StatementSummary};

use super::classifier::classify_with;
use super::{extractor_for, Extraction, ExtractionContext, Result};

/// Result of statement extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Layout the document was classified as.
    pub bank: Bank,
    /// Extracted statement data.
    pub statement: StatementSummary,
    /// Dropped transactions and consistency issues.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for statement parsing.
pub trait DocumentParser {
    /// Classify `document` and extract its statement.
    fn parse(&self, document: &RawDocument) -> Result<ExtractionResult>;
}

/// Classifies a document and dispatches it to the matching layout engine.
#[derive(Debug, Clone)]
pub struct StatementParser {
    /// Year for dates printed without one. Current year when unset.
    statement_year: Option<i32>,
    derive_missing_totals: bool,
    strict_classification: bool,
    include_warnings: bool,
    layouts: LayoutConfig,
}

impl StatementParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&MutasiConfig::default())
    }

    pub fn from_config(config: &MutasiConfig) -> Self {
        Self {
            statement_year: config.extraction.statement_year,
            derive_missing_totals: config.extraction.derive_missing_totals,
            strict_classification: config.extraction.strict_classification,
            include_warnings: config.extraction.include_warnings,
            layouts: config.layouts.clone(),
        }
    }

    /// Set the year used for dates without one.
    pub fn with_statement_year(mut self, year: i32) -> Self {
        self.statement_year = Some(year);
        self
    }

    /// Set whether absent summary totals are derived from transactions.
    pub fn with_derived_totals(mut self, derive: bool) -> Self {
        self.derive_missing_totals = derive;
        self
    }

    /// Set whether the keyword tier of the classifier is ignored.
    pub fn with_strict_classification(mut self, strict: bool) -> Self {
        self.strict_classification = strict;
        self
    }

    /// Set whether warnings are reported.
    pub fn with_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    /// Set per-layout scan windows.
    pub fn with_layouts(mut self, layouts: LayoutConfig) -> Self {
        self.layouts = layouts;
        self
    }

    /// Identify the layout without extracting anything.
    pub fn classify(&self, document: &RawDocument) -> Result<Bank> {
        classify_with(document, self.strict_classification)
    }

    fn context(&self) -> ExtractionContext {
        let fallback_year = self.statement_year.unwrap_or_else(|| Local::now().year());
        ExtractionContext {
            fallback_year,
            layouts: self.layouts.clone(),
            derive_missing_totals: self.derive_missing_totals,
        }
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for StatementParser {
    fn parse(&self, document: &RawDocument) -> Result<ExtractionResult> {
        let start = Instant::now();

        info!(
            "Parsing statement {} from {} lines",
            document.filename.as_deref().unwrap_or("<unnamed>"),
            document.lines.len()
        );

        let bank = self.classify(document)?;
        let context = self.context();
        debug!("Using {} layout, fallback year {}", bank, context.fallback_year);

        let Extraction {
            statement,
            mut warnings,
        } = extractor_for(bank).extract(document, &context);

        warnings.extend(statement.validate());
        if !self.include_warnings {
            warnings.clear();
        }

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} {} transactions in {}ms",
            statement.transactions.len(),
            bank,
            processing_time_ms
        );

        Ok(ExtractionResult {
            bank,
            statement,
            warnings,
            processing_time_ms,
        })
    }
}
