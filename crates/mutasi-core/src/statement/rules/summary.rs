//! Label-anchored lookup of period totals.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::trace;

use super::amounts::AmountExtractor;
use super::patterns::{is_metadata_line, CURRENCY_TOKEN, MONTH_NAME};
use super::FieldExtractor;

lazy_static! {
    // What may precede a label on its row: nothing, or the row's date ("01/12 SALDO AWAL")
    static ref LABEL_PREFIX: Regex = Regex::new(&format!(
        r"(?i)^(?:\d{{1,2}}[/-]\d{{1,2}}(?:[/-]\d{{2,4}})?|\d{{1,2}}\s+{MONTH_NAME}(?:\s+\d{{4}})?)?\s*$"
    )).unwrap();

    static ref CURRENCY_WORD: Regex = Regex::new(r"(?i)\b(?:Rp|IDR)\b").unwrap();
}

/// Summary field a label refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryField {
    InitialBalance,
    ClosingBalance,
    IncomingTotal,
    OutgoingTotal,
}

/// A label pattern and the field its value fills.
#[derive(Debug, Clone, Copy)]
pub struct SummaryLabel {
    pub pattern: &'static Regex,
    pub field: SummaryField,
}

/// Values found for each field. `None` means the label or its value was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryValues {
    pub initial_balance: Option<Decimal>,
    pub closing_balance: Option<Decimal>,
    pub incoming_total: Option<Decimal>,
    pub outgoing_total: Option<Decimal>,
}

impl SummaryValues {
    pub fn get(&self, field: SummaryField) -> Option<Decimal> {
        match field {
            SummaryField::InitialBalance => self.initial_balance,
            SummaryField::ClosingBalance => self.closing_balance,
            SummaryField::IncomingTotal => self.incoming_total,
            SummaryField::OutgoingTotal => self.outgoing_total,
        }
    }

    fn set(&mut self, field: SummaryField, value: Decimal) {
        let slot = match field {
            SummaryField::InitialBalance => &mut self.initial_balance,
            SummaryField::ClosingBalance => &mut self.closing_balance,
            SummaryField::IncomingTotal => &mut self.incoming_total,
            SummaryField::OutgoingTotal => &mut self.outgoing_total,
        };
        *slot = Some(value);
    }
}

/// Result of a summary scan.
#[derive(Debug, Clone, Default)]
pub struct SummaryScan {
    pub values: SummaryValues,

    /// Label and value lines. Engines must not read these as transaction content.
    pub consumed: HashSet<usize>,
}

/// Whether a label match at `start..end` heads a summary row.
///
/// Narration that merely mentions a label ("Dana Masuk dari BUDI") is not a row: only a
/// date may come before the label and only values or currency codes after it.
pub fn is_label_row(line: &str, start: usize, end: usize) -> bool {
    if !LABEL_PREFIX.is_match(&line[..start]) {
        return false;
    }
    let rest = CURRENCY_TOKEN.replace_all(&line[end..], " ");
    let rest = CURRENCY_WORD.replace_all(&rest, " ");
    !rest.chars().any(char::is_alphabetic)
}

/// Find summary labels and their values.
///
/// Each label row is consumed, see [`is_label_row`]. The first occurrence of a field takes a value from the
/// same line after the label, or else from the first currency-bearing line within
/// `window` lines below it. The forward scan passes over metadata lines, other labels
/// and values already taken, and ends at a line for which `boundary` holds.
pub fn scan_summary(
    lines: &[String],
    labels: &[SummaryLabel],
    window: usize,
    boundary: &dyn Fn(&str) -> bool,
) -> SummaryScan {
    let extractor = AmountExtractor::new();

    let label_hits: Vec<(usize, SummaryField, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            labels.iter().find_map(|label| {
                label
                    .pattern
                    .find(line)
                    .filter(|m| is_label_row(line, m.start(), m.end()))
                    .map(|m| (idx, label.field, m.end()))
            })
        })
        .collect();
    let label_lines: HashSet<usize> = label_hits.iter().map(|(idx, _, _)| *idx).collect();

    let mut scan = SummaryScan {
        consumed: label_lines.clone(),
        ..Default::default()
    };

    for (idx, field, end) in label_hits {
        if scan.values.get(field).is_some() {
            continue;
        }

        if let Some(m) = extractor.extract(&lines[idx][end..]) {
            trace!("Summary {:?} inline on line {}: {}", field, idx, m.value);
            scan.values.set(field, m.value.abs());
            continue;
        }

        for j in (idx + 1..lines.len()).take(window) {
            if label_lines.contains(&j) || scan.consumed.contains(&j) {
                continue;
            }
            let line = &lines[j];
            if boundary(line) {
                break;
            }
            if is_metadata_line(line) {
                continue;
            }
            if let Some(m) = extractor.extract(line) {
                trace!("Summary {:?} on line {}: {}", field, j, m.value);
                scan.values.set(field, m.value.abs());
                scan.consumed.insert(j);
                break;
            }
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    lazy_static! {
        static ref AWAL: Regex = Regex::new(r"(?i)saldo\s+awal").unwrap();
        static ref AKHIR: Regex = Regex::new(r"(?i)saldo\s+akhir").unwrap();
        static ref MASUK: Regex = Regex::new(r"(?i)dana\s+masuk").unwrap();
        static ref KELUAR: Regex = Regex::new(r"(?i)dana\s+keluar").unwrap();
        static ref SIGNED: Regex = Regex::new(r"^[+-]").unwrap();
    }

    fn labels() -> Vec<SummaryLabel> {
        vec![
            SummaryLabel { pattern: &AWAL, field: SummaryField::InitialBalance },
            SummaryLabel { pattern: &MASUK, field: SummaryField::IncomingTotal },
            SummaryLabel { pattern: &KELUAR, field: SummaryField::OutgoingTotal },
            SummaryLabel { pattern: &AKHIR, field: SummaryField::ClosingBalance },
        ]
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn no_boundary(_: &str) -> bool {
        false
    }

    #[test]
    fn test_inline_values() {
        let doc = lines(&["SALDO AWAL : 1,000,000.00", "SALDO AKHIR 984,000.00"]);
        let scan = scan_summary(&doc, &labels(), 5, &no_boundary);
        assert_eq!(scan.values.initial_balance, Some(dec("1000000.00")));
        assert_eq!(scan.values.closing_balance, Some(dec("984000.00")));
        assert_eq!(scan.consumed, [0, 1].into_iter().collect());
    }

    #[test]
    fn test_stacked_labels_take_values_in_order() {
        let doc = lines(&[
            "Saldo Awal",
            "Dana Masuk",
            "Dana Keluar",
            "Saldo Akhir",
            "1234567890",
            "IDR",
            "100.000,00",
            "0,00",
            "50.000,00",
            "50.000,00",
        ]);
        let scan = scan_summary(&doc, &labels(), 15, &no_boundary);
        assert_eq!(
            scan.values,
            SummaryValues {
                initial_balance: Some(dec("100000.00")),
                incoming_total: Some(dec("0.00")),
                outgoing_total: Some(dec("50000.00")),
                closing_balance: Some(dec("50000.00")),
            }
        );
        assert!(!scan.consumed.contains(&4));
        assert!(scan.consumed.contains(&9));
    }

    #[test]
    fn test_boundary_stops_scan() {
        let doc = lines(&["Saldo Akhir", "Transfer", "-50.000,00"]);
        let scan = scan_summary(&doc, &labels(), 15, &|l: &str| SIGNED.is_match(l));
        assert_eq!(scan.values.closing_balance, None);
        assert_eq!(scan.consumed, [0].into_iter().collect());
    }

    #[test]
    fn test_window_limit() {
        let doc = lines(&["Saldo Awal", "a", "b", "c", "1.000,00"]);
        let scan = scan_summary(&doc, &labels(), 3, &no_boundary);
        assert_eq!(scan.values.initial_balance, None);
    }

    #[test]
    fn test_narration_mentioning_label_is_not_consumed() {
        let doc = lines(&["Dana Masuk dari BUDI", "200.000,00", "Dana Masuk", "Rp 75.000"]);
        let scan = scan_summary(&doc, &labels(), 5, &no_boundary);
        assert_eq!(scan.values.incoming_total, Some(dec("75000")));
        assert!(!scan.consumed.contains(&0));
        assert!(!scan.consumed.contains(&1));
    }

    #[test]
    fn test_label_rows() {
        assert!(is_label_row("Saldo Awal", 0, 10));
        assert!(is_label_row("Saldo Awal : Rp 1.000.000 (IDR)", 0, 10));
        assert!(is_label_row("01/12 SALDO AWAL 1,000,000.00", 6, 16));
        assert!(!is_label_row("Incoming Transfer from Alice", 0, 8));
        assert!(!is_label_row("Setoran Saldo Awal", 8, 18));
    }

    #[test]
    fn test_repeated_label_keeps_first_value() {
        let doc = lines(&["Saldo Awal 10,00", "Saldo Awal 20,00"]);
        let scan = scan_summary(&doc, &labels(), 5, &no_boundary);
        assert_eq!(scan.values.initial_balance, Some(dec("10.00")));
        assert_eq!(scan.consumed.len(), 2);
    }
}
