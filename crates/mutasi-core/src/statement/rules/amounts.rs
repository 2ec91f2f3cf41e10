//! Amount normalization for locale-ambiguous statement numbers.
//!
//! Indonesian statements mix two conventions: `1.000.000,00` (Mandiri, BLU) and
//! `1,000,000.00` (BCA). A single rule covers both: when both separators appear, the
//! one that occurs later is the decimal separator.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::CURRENCY_TOKEN;
use super::{ExtractionMatch, FieldExtractor};

/// Currency-shaped token extractor for a single line.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        CURRENCY_TOKEN
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(normalize_amount(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Parse a statement amount into a signed decimal.
///
/// Accepts `1,000.00`, `1.000,00`, `-50.000,00`, `50.000,00-`, `+Rp 1.000,00`.
/// Returns `None` for anything that is not a number after cleanup.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    let mut negative = false;
    let mut body = token.trim();

    body = take_sign(body, &mut negative);
    // A second sign is only allowed after a currency prefix ("Rp -25.000")
    let unprefixed = strip_currency(body);
    if unprefixed.len() < body.len() {
        body = take_sign(unprefixed, &mut negative);
    }

    if let Some(rest) = body.strip_suffix('-') {
        negative = true;
        body = rest.trim_end();
    } else if let Some(rest) = body.strip_suffix('+') {
        body = rest.trim_end();
    }

    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit())
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: the later one is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Comma only: decimal when exactly two digits follow it
        (Some(c), None) => {
            let fraction = &cleaned[c + 1..];
            if fraction.len() == 2 && fraction.chars().all(|ch| ch.is_ascii_digit()) {
                format!("{}.{}", cleaned[..c].replace(',', ""), fraction)
            } else {
                cleaned.replace(',', "")
            }
        }
        // Dot only: grouping when repeated or followed by exactly three digits
        (None, Some(d)) => {
            let fraction = &cleaned[d + 1..];
            if cleaned.matches('.').count() > 1 || fraction.len() == 3 {
                cleaned.replace('.', "")
            } else {
                cleaned
            }
        }
        (None, None) => cleaned,
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Best-effort variant of [`parse_amount`]: malformed input yields zero.
pub fn normalize_amount(token: &str) -> Decimal {
    match parse_amount(token) {
        Some(value) => value,
        None => {
            debug!("Could not normalize amount token {:?}, using zero", token);
            Decimal::ZERO
        }
    }
}

/// Format an amount in Indonesian style (`1.234.567,89`).
pub fn format_rupiah(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((&s, "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{},{}", sign, formatted, decimal_part)
}

fn take_sign<'a>(s: &'a str, negative: &mut bool) -> &'a str {
    if let Some(rest) = s.strip_prefix('-') {
        *negative = true;
        rest.trim_start()
    } else if let Some(rest) = s.strip_prefix('+') {
        rest.trim_start()
    } else {
        s
    }
}

fn strip_currency(s: &str) -> &str {
    for prefix in ["Rp.", "RP.", "rp.", "Rp", "RP", "rp", "IDR", "idr"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            return rest.trim_start();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_both_separators() {
        assert_eq!(parse_amount("1,000.00"), Some(dec("1000.00")));
        assert_eq!(parse_amount("1.000,00"), Some(dec("1000.00")));
        assert_eq!(parse_amount("1,000,000.50"), Some(dec("1000000.50")));
        assert_eq!(parse_amount("12.345.678,90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_signs() {
        assert_eq!(parse_amount("-50.000,00"), Some(dec("-50000.00")));
        assert_eq!(parse_amount("+1.000.000,00"), Some(dec("1000000.00")));
        assert_eq!(parse_amount("50.000,00-"), Some(dec("-50000.00")));
        assert_eq!(parse_amount("- Rp 25.000,00"), Some(dec("-25000.00")));
        assert_eq!(parse_amount("Rp -25.000"), Some(dec("-25000")));
    }

    #[test]
    fn test_comma_only() {
        assert_eq!(parse_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("1,000"), Some(dec("1000")));
        assert_eq!(parse_amount("1,000,000"), Some(dec("1000000")));
    }

    #[test]
    fn test_dot_only() {
        assert_eq!(parse_amount("16000.00"), Some(dec("16000.00")));
        assert_eq!(parse_amount("50.000"), Some(dec("50000")));
        assert_eq!(parse_amount("1.500.000"), Some(dec("1500000")));
    }

    #[test]
    fn test_malformed_degrades_to_zero() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("--5"), None);
        assert_eq!(normalize_amount("n/a"), Decimal::ZERO);
        assert_eq!(normalize_amount(""), Decimal::ZERO);
    }

    #[test]
    fn test_extract_all_positions() {
        let matches = AmountExtractor::new().extract_all("500.00 DB 4,983,500.00");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].value, dec("500.00"));
        assert_eq!(matches[1].value, dec("4983500.00"));
        assert_eq!(matches[0].position, Some((0, 6)));
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(dec("1234567.89")), "1.234.567,89");
        assert_eq!(format_rupiah(dec("-50000")), "-50.000,00");
        assert_eq!(format_rupiah(Decimal::ZERO), "0,00");
    }
}
