//! Input document handed over by the text-extraction collaborator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::statement::rules::lines::tokenize_lines;

/// Metadata key holding the producing-system identifier.
pub const CREATOR_KEY: &str = "creator";

/// Already-extracted statement text plus document metadata.
///
/// Built once per request and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Trimmed, non-empty lines in reading order.
    pub lines: Vec<String>,

    /// Document metadata (e.g. `creator`, `producer`).
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Original file name. Advisory only, never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl RawDocument {
    /// Tokenize `text` and attach `metadata`.
    pub fn new(text: &str, metadata: HashMap<String, String>) -> Self {
        Self {
            lines: tokenize_lines(text),
            metadata,
            filename: None,
        }
    }

    /// Tokenize `text` with no metadata.
    pub fn from_text(text: &str) -> Self {
        Self::new(text, HashMap::new())
    }

    /// Attach the advisory file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set a single metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `creator` metadata value, or an empty string.
    pub fn creator(&self) -> &str {
        self.metadata
            .get(CREATOR_KEY)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether any line contains `needle`.
    pub fn body_contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
