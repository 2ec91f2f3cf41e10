//! Line tokenization and whitespace handling.

/// Split text into trimmed, non-empty lines, preserving reading order.
pub fn tokenize_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lines() {
        let text = "\n  PERIODE : NOVEMBER 2025 \r\n\r\n25/11\n\t\nKFC   \r16,000.00";
        assert_eq!(
            tokenize_lines(text),
            vec!["PERIODE : NOVEMBER 2025", "25/11", "KFC", "16,000.00"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize_lines("").is_empty());
        assert!(tokenize_lines(" \n \n").is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  TRSF \t E-BANKING   DB "), "TRSF E-BANKING DB");
    }
}
