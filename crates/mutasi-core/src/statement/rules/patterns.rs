//! Regex patterns shared by every statement layout.
//!
//! Layout-specific patterns live next to their engine in `statement::banks`.

use lazy_static::lazy_static;
use regex::Regex;

/// Month names and abbreviations, English and Indonesian. Used inside larger patterns.
pub const MONTH_NAME: &str =
    r"(?:jan|feb|mar|apr|mei|may|jun|jul|agu|agt|aug|sep|okt|oct|nov|des|dec)[a-z]*\.?";

lazy_static! {
    // Currency-shaped token: two decimals in either separator convention, or an
    // Rp-prefixed amount whose decimals are optional.
    pub static ref CURRENCY_TOKEN: Regex = Regex::new(
        r"[+-]?(?:(?:\d{1,3}(?:[.,]\d{3})+|\d+)[.,]\d{2}\b|(?i:Rp)\.?\s?-?\d{1,3}(?:\.\d{3})*(?:,\d{2})?\b)"
    ).unwrap();

    // Four-digit year
    pub static ref YEAR: Regex = Regex::new(
        r"\b((?:19|20)\d{2})\b"
    ).unwrap();

    // Standalone timestamp line: "10:15", "10:15:23", "10.15.23 WIB"
    pub static ref TIME_ONLY: Regex = Regex::new(
        r"(?i)^\d{2}[:.]\d{2}(?:[:.]\d{2})?(?:\s*WIB)?$"
    ).unwrap();

    // Timestamp anywhere in a line
    pub static ref TIME_WIB: Regex = Regex::new(
        r"(?i)\d{2}:\d{2}:\d{2}\s?WIB"
    ).unwrap();

    // Page footers: "1 of 3", "2 dari 5", "Halaman : 1 / 2", "Page 3/4". A bare "25/11" is a date.
    pub static ref PAGE_NUMBER: Regex = Regex::new(
        r"(?i)^(?:(?:halaman|page|hal\.?)\s*:?\s*\d+\s*(?:of|dari|/)\s*\d+|\d+\s+(?:of|dari)\s+\d+)$"
    ).unwrap();

    // Row counters and other bare integers
    pub static ref COUNTER: Regex = Regex::new(
        r"^\d+$"
    ).unwrap();

    // Header metadata that sits next to summary values
    pub static ref ACCOUNT_LABEL: Regex = Regex::new(
        r"(?i)^(?:no\.?\s*rek(?:ening)?|nomor\s+rekening|account\s+(?:no\.?|number)|mata\s+uang|currency|nama|name)\b"
    ).unwrap();

    pub static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"^\d[\d\s-]{6,}\d$"
    ).unwrap();

    pub static ref CURRENCY_CODE: Regex = Regex::new(
        r"(?i)^(?:IDR|Rp\.?)$"
    ).unwrap();

    pub static ref DATE_RANGE: Regex = Regex::new(&format!(
        r"(?i)\d{{1,2}}(?:[\s/-](?:\d{{1,2}}|{MONTH_NAME}))?(?:[\s/-]\d{{2,4}})?\s*(?:-|s/d|to|sampai)\s*\d{{1,2}}[\s/-](?:\d{{1,2}}|{MONTH_NAME})"
    )).unwrap();
}

/// Whether a line looks like header metadata rather than a summary value.
pub fn is_metadata_line(line: &str) -> bool {
    ACCOUNT_LABEL.is_match(line)
        || ACCOUNT_NUMBER.is_match(line)
        || CURRENCY_CODE.is_match(line)
        || DATE_RANGE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_token_conventions() {
        let found: Vec<&str> = CURRENCY_TOKEN
            .find_iter("SALDO 1,000.00 lalu 1.000,00 dan 16000.00")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["1,000.00", "1.000,00", "16000.00"]);
    }

    #[test]
    fn test_currency_token_rupiah_prefix() {
        let found: Vec<&str> = CURRENCY_TOKEN
            .find_iter("Saldo Rp 1.000.000 masuk Rp 0 keluar -Rp 50.000,50")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["Rp 1.000.000", "Rp 0", "-Rp 50.000,50"]);
    }

    #[test]
    fn test_currency_token_ignores_dates_and_times() {
        assert!(!CURRENCY_TOKEN.is_match("25/11"));
        assert!(!CURRENCY_TOKEN.is_match("10:15:23 WIB"));
        assert!(!CURRENCY_TOKEN.is_match("1234567890"));
    }

    #[test]
    fn test_page_numbers() {
        assert!(PAGE_NUMBER.is_match("1 of 3"));
        assert!(PAGE_NUMBER.is_match("2 dari 5"));
        assert!(PAGE_NUMBER.is_match("Halaman 1 dari 2"));
        assert!(PAGE_NUMBER.is_match("Halaman : 1 / 2"));
        assert!(!PAGE_NUMBER.is_match("25/11"));
        assert!(!PAGE_NUMBER.is_match("Transfer 1 of 2 parts"));
    }

    #[test]
    fn test_metadata_lines() {
        assert!(is_metadata_line("1234567890"));
        assert!(is_metadata_line("IDR"));
        assert!(is_metadata_line("01 Nov 2025 - 30 Nov 2025"));
        assert!(is_metadata_line("No. Rekening : 1234567890"));
        assert!(!is_metadata_line("1.000.000,00"));
    }

    #[test]
    fn test_time_patterns() {
        assert!(TIME_ONLY.is_match("10:15:23 WIB"));
        assert!(TIME_ONLY.is_match("14:22"));
        assert!(TIME_WIB.is_match("01 Nov 2025 10:15:23 WIB"));
    }
}
