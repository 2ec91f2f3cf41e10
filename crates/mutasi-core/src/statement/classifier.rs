//! Layout classification: which bank produced a document.
//!
//! An ordered table of `(signal, bank)` rules, strongest first. Creator metadata is
//! checked before body brand markers, and bare bank abbreviations come last.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::ClassificationError;
use crate::models::{Bank, RawDocument};

use super::Result;

/// How much a signal can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTier {
    /// Producing-system identifier in the metadata.
    Creator,
    /// Brand, product or legal name unique to one bank.
    Brand,
    /// Bank abbreviation anywhere in the text. May misfire on documents that merely
    /// mention another bank.
    Keyword,
}

/// Evidence that points at one layout.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// Substring of the `creator` metadata value.
    Creator(&'static str),
    /// Literal appearing on some line of the body.
    Body(&'static str),
    /// Pattern matching some line of the body.
    Keyword(&'static Regex),
}

impl Signal {
    pub fn tier(&self) -> SignalTier {
        match self {
            Signal::Creator(_) => SignalTier::Creator,
            Signal::Body(_) => SignalTier::Brand,
            Signal::Keyword(_) => SignalTier::Keyword,
        }
    }

    pub fn matches(&self, document: &RawDocument) -> bool {
        match self {
            Signal::Creator(needle) => document.creator().contains(needle),
            Signal::Body(needle) => document.body_contains(needle),
            Signal::Keyword(pattern) => document.lines.iter().any(|l| pattern.is_match(l)),
        }
    }
}

/// One classification rule.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    pub signal: Signal,
    pub bank: Bank,
}

impl ClassifierRule {
    const fn new(signal: Signal, bank: Bank) -> Self {
        Self { signal, bank }
    }
}

lazy_static! {
    static ref KEYWORD_MANDIRI: Regex = Regex::new(r"(?i)\bmandiri\b").unwrap();
    static ref KEYWORD_BNI: Regex = Regex::new(r"\bBNI\b").unwrap();
    static ref KEYWORD_BLU: Regex = Regex::new(r"\bblu\b").unwrap();
    static ref KEYWORD_BCA: Regex = Regex::new(r"\bBCA\b").unwrap();

    /// Classification ladder, first match wins.
    pub static ref CLASSIFIER_RULES: Vec<ClassifierRule> = vec![
        ClassifierRule::new(Signal::Creator("PT. Bank Central Asia, Tbk"), Bank::Bca),
        ClassifierRule::new(Signal::Creator("E-statement Batch Generator"), Bank::Bca),
        ClassifierRule::new(Signal::Creator("PT. Bank Mandiri (Persero) Tbk"), Bank::Mandiri),
        ClassifierRule::new(Signal::Creator("Bank Mandiri"), Bank::Mandiri),
        ClassifierRule::new(Signal::Creator("PT Bank Negara Indonesia"), Bank::Bni),
        ClassifierRule::new(Signal::Creator("BNI"), Bank::Bni),
        ClassifierRule::new(Signal::Creator("BCA Digital"), Bank::Blu),
        ClassifierRule::new(Signal::Creator("Bank Digital BCA"), Bank::Blu),

        // BLU statements also print the BCA group name, so they go first
        ClassifierRule::new(Signal::Body("blu by BCA Digital"), Bank::Blu),
        ClassifierRule::new(Signal::Body("PT Bank Digital BCA"), Bank::Blu),
        ClassifierRule::new(Signal::Body("bluAccount"), Bank::Blu),
        ClassifierRule::new(Signal::Body("REKENING TAHAPAN"), Bank::Bca),
        ClassifierRule::new(Signal::Body("PT Bank Central Asia Tbk"), Bank::Bca),
        ClassifierRule::new(Signal::Body("Livin' by Mandiri"), Bank::Mandiri),
        ClassifierRule::new(Signal::Body("PT Bank Mandiri (Persero) Tbk"), Bank::Mandiri),
        ClassifierRule::new(Signal::Body("PT Bank Negara Indonesia (Persero) Tbk"), Bank::Bni),
        ClassifierRule::new(Signal::Body("BNI Mobile Banking"), Bank::Bni),
        ClassifierRule::new(Signal::Body("wondr by BNI"), Bank::Bni),

        ClassifierRule::new(Signal::Keyword(&KEYWORD_MANDIRI), Bank::Mandiri),
        ClassifierRule::new(Signal::Keyword(&KEYWORD_BNI), Bank::Bni),
        ClassifierRule::new(Signal::Keyword(&KEYWORD_BLU), Bank::Blu),
        ClassifierRule::new(Signal::Keyword(&KEYWORD_BCA), Bank::Bca),
    ];
}

/// Classify with every tier enabled.
pub fn classify(document: &RawDocument) -> Result<Bank> {
    classify_with(document, false)
}

/// Classify, optionally ignoring the keyword tier.
pub fn classify_with(document: &RawDocument, strict: bool) -> Result<Bank> {
    let hit = CLASSIFIER_RULES
        .iter()
        .filter(|rule| !(strict && rule.signal.tier() == SignalTier::Keyword))
        .find(|rule| rule.signal.matches(document));

    if let Some(rule) = hit {
        debug!("Classified as {} by {:?}", rule.bank, rule.signal);
        return Ok(rule.bank);
    }

    let creator = document.creator();
    let reason = if creator.is_empty() {
        "no creator metadata and no bank signature in the text".to_string()
    } else {
        format!("creator {:?} is not a known layout and the text carries no bank signature", creator)
    };
    debug!("Classification failed: {}", reason);
    Err(ClassificationError::unsupported(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(creator: &str, text: &str) -> RawDocument {
        RawDocument::from_text(text).with_metadata("creator", creator)
    }

    #[test]
    fn test_creator_signatures() {
        let bca = doc("E-statement Batch Generator (PT. Bank Central Asia, Tbk)", "25/11");
        assert_eq!(classify(&bca), Ok(Bank::Bca));

        let mandiri = doc("PT. Bank Mandiri (Persero) Tbk", "Transfer");
        assert_eq!(classify(&mandiri), Ok(Bank::Mandiri));

        let blu = doc("BCA Digital", "Kirim Uang");
        assert_eq!(classify(&blu), Ok(Bank::Blu));
    }

    #[test]
    fn test_brand_markers() {
        assert_eq!(classify(&doc("", "blu by BCA Digital\nBCA")), Ok(Bank::Blu));
        assert_eq!(classify(&doc("", "REKENING TAHAPAN")), Ok(Bank::Bca));
        assert_eq!(classify(&doc("Microsoft Word", "wondr by BNI")), Ok(Bank::Bni));
    }

    #[test]
    fn test_keyword_fallback_and_strict_mode() {
        let document = doc("", "Transfer ke rekening BCA");
        assert_eq!(classify(&document), Ok(Bank::Bca));
        assert!(classify_with(&document, true).is_err());
    }

    #[test]
    fn test_unsupported_names_creator() {
        let err = classify(&doc("Unknown Bank", "Some text")).unwrap_err();
        assert!(err.reason().contains("Unknown Bank"));
        assert!(err.to_string().starts_with("unsupported statement format"));
    }

    #[test]
    fn test_tiers() {
        assert_eq!(Signal::Creator("x").tier(), SignalTier::Creator);
        assert_eq!(Signal::Body("x").tier(), SignalTier::Brand);
    }
}
