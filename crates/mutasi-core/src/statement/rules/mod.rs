//! Layout-independent rules: tokenizing, amounts, dates, narration and summary lookup.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod lines;
pub mod patterns;
pub mod summary;

pub use amounts::{format_rupiah, normalize_amount, parse_amount, AmountExtractor};
pub use dates::{date_from_parts, find_period, month_number, year_in, Period};
pub use description::{
    assemble, finish_description, DescriptionWindow, NoiseFilter, ScanDirection, Verdict,
};
pub use lines::{collapse_whitespace, tokenize_lines};
pub use summary::{scan_summary, SummaryField, SummaryLabel, SummaryScan, SummaryValues};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value matched in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
