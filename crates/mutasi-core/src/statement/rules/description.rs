//! Bounded narration assembly around a transaction anchor.

use std::collections::HashSet;

use regex::Regex;

use super::lines::collapse_whitespace;

/// Which side of the anchor narration is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Lines preceding the anchor (Mandiri, BLU).
    Backward,
    /// Lines following the anchor (BCA, BNI trailing narration).
    Forward,
}

/// Bounded scan window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptionWindow {
    pub max_lines: usize,
    pub direction: ScanDirection,
}

impl DescriptionWindow {
    pub fn backward(max_lines: usize) -> Self {
        Self {
            max_lines,
            direction: ScanDirection::Backward,
        }
    }

    pub fn forward(max_lines: usize) -> Self {
        Self {
            max_lines,
            direction: ScanDirection::Forward,
        }
    }
}

/// What the filter decided for a candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Skip,
    Stop,
}

/// Per-layout noise filter. Stop patterns win over skip patterns.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    pub skip: Vec<&'static Regex>,
    pub stop: Vec<&'static Regex>,
}

impl NoiseFilter {
    pub fn new(skip: Vec<&'static Regex>, stop: Vec<&'static Regex>) -> Self {
        Self { skip, stop }
    }

    pub fn verdict(&self, line: &str) -> Verdict {
        if self.stop.iter().any(|re| re.is_match(line)) {
            Verdict::Stop
        } else if self.skip.iter().any(|re| re.is_match(line)) {
            Verdict::Skip
        } else {
            Verdict::Accept
        }
    }
}

/// Collect narration lines around `anchor` (exclusive).
///
/// Skipped lines still count toward the window. Indices in `excluded` end the scan,
/// since they belong to the summary block. Accepted lines keep document order.
pub fn assemble(
    lines: &[String],
    anchor: usize,
    window: DescriptionWindow,
    filter: &NoiseFilter,
    excluded: &HashSet<usize>,
) -> Vec<String> {
    let indices: Box<dyn Iterator<Item = usize>> = match window.direction {
        ScanDirection::Backward => Box::new((0..anchor).rev().take(window.max_lines)),
        ScanDirection::Forward => {
            Box::new((anchor + 1..lines.len()).take(window.max_lines))
        }
    };

    let mut parts = Vec::new();
    for idx in indices {
        if excluded.contains(&idx) {
            break;
        }
        let line = &lines[idx];
        match filter.verdict(line) {
            Verdict::Stop => break,
            Verdict::Skip => continue,
            Verdict::Accept => parts.push(line.clone()),
        }
    }

    if window.direction == ScanDirection::Backward {
        parts.reverse();
    }
    parts
}

/// Join narration parts, blank out `strip` fragments and collapse whitespace.
pub fn finish_description<S: AsRef<str>>(parts: &[S], strip: &[&'static Regex]) -> String {
    let mut joined = parts
        .iter()
        .map(|part| part.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    for re in strip {
        joined = re.replace_all(&joined, " ").into_owned();
    }
    collapse_whitespace(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref NUMBER: Regex = Regex::new(r"^\d+$").unwrap();
        static ref AMOUNT: Regex = Regex::new(r"^[+-][\d.]+,\d{2}$").unwrap();
        static ref TGL: Regex = Regex::new(r"TGL:\s*\d{2}/\d{2}").unwrap();
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn filter() -> NoiseFilter {
        NoiseFilter::new(vec![&*NUMBER], vec![&*AMOUNT])
    }

    #[test]
    fn test_backward_keeps_order_and_stops_at_anchor() {
        let doc = lines(&["-10.000,00", "Transfer to", "2", "Bob", "-50.000,00"]);
        let parts = assemble(&doc, 4, DescriptionWindow::backward(6), &filter(), &HashSet::new());
        assert_eq!(parts, vec!["Transfer to", "Bob"]);
    }

    #[test]
    fn test_window_counts_skipped_lines() {
        let doc = lines(&["Far away", "1", "2", "Near", "-50.000,00"]);
        let parts = assemble(&doc, 4, DescriptionWindow::backward(3), &filter(), &HashSet::new());
        assert_eq!(parts, vec!["Near"]);
    }

    #[test]
    fn test_forward_stops_at_excluded() {
        let doc = lines(&["16,000.00", "KFC", "SALDO AKHIR", "TRAILING"]);
        let excluded: HashSet<usize> = [2].into_iter().collect();
        let parts = assemble(&doc, 0, DescriptionWindow::forward(5), &filter(), &excluded);
        assert_eq!(parts, vec!["KFC"]);
    }

    #[test]
    fn test_finish_description_strips_fragments() {
        let text = finish_description(&["  KFC ", "TGL: 25/11  QR"], &[&*TGL]);
        assert_eq!(text, "KFC QR");
        assert_eq!(finish_description::<&str>(&[], &[]), "");
    }
}
