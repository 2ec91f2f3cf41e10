//! Data models: input document, statement output, configuration.

pub mod config;
pub mod document;
pub mod statement;

pub use config::{ExtractionConfig, LayoutConfig, MutasiConfig, WindowConfig};
pub use document::RawDocument;
pub use statement::{Bank, Direction, StatementSummary, Transaction};
