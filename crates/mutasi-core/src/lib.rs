//! Core library for Indonesian bank statement extraction.
//!
//! This crate provides:
//! - Layout classification (BCA, Mandiri, BNI, blu by BCA Digital)
//! - Rupiah amount normalization and Indonesian date parsing
//! - Per-layout transaction and summary extraction

pub mod error;
pub mod models;
pub mod statement;

pub use error::{ClassificationError, MutasiError, Result};
pub use models::{
    Bank, Direction, MutasiConfig, RawDocument, StatementSummary, Transaction,
};
pub use statement::rules::{format_rupiah, normalize_amount, parse_amount};
pub use statement::{
    classify, extractor_for, DocumentParser, ExtractionContext, ExtractionResult,
    StatementExtractor, StatementParser,
};
