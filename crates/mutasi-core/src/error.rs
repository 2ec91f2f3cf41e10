//! Error types for the mutasi-core library.

use thiserror::Error;

/// Main error type for the mutasi library.
#[derive(Error, Debug)]
pub enum MutasiError {
    /// The statement layout could not be identified.
    #[error("classification error: {0}")]
    Classification(#[from] ClassificationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while deciding which bank layout produced a document.
///
/// This is the only failure the extraction pipeline surfaces. Malformed amounts and
/// unrecognized lines are absorbed by the engines instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// No layout signature matched the metadata or the body text.
    #[error("unsupported statement format: {reason}")]
    Unsupported { reason: String },
}

impl ClassificationError {
    /// Build an `Unsupported` error from a human-readable reason.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    /// The human-readable reason carried by the error.
    pub fn reason(&self) -> &str {
        match self {
            Self::Unsupported { reason } => reason,
        }
    }
}

/// Result type for the mutasi library.
pub type Result<T> = std::result::Result<T, MutasiError>;
