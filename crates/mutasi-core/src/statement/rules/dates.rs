//! Date helpers: month names, year inference and statement periods.

use chrono::NaiveDate;
use regex::Regex;

use super::patterns::YEAR;

/// Month number for an English or Indonesian month name or abbreviation.
///
/// Only the first three letters are significant, so `Nov`, `NOVEMBER` and `Nop.` all
/// resolve, as do the Indonesian `Mei`, `Agu`/`Agt`, `Okt` and `Des`.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name
        .trim()
        .chars()
        .take(3)
        .flat_map(char::to_lowercase)
        .collect();

    match prefix.as_str() {
        "jan" => Some(1),
        "feb" | "peb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "mei" | "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "agu" | "agt" | "aug" => Some(8),
        "sep" => Some(9),
        "okt" | "oct" => Some(10),
        "nov" | "nop" => Some(11),
        "des" | "dec" => Some(12),
        _ => None,
    }
}

/// First four-digit year in `text`.
pub fn year_in(text: &str) -> Option<i32> {
    YEAR.captures(text).and_then(|caps| caps[1].parse().ok())
}

/// Build a date from captured parts.
///
/// `month` may be numeric (`11`) or a name (`Nov`). Two-digit years are taken as 20xx.
/// A missing year uses `fallback_year`.
pub fn date_from_parts(
    day: &str,
    month: &str,
    year: Option<&str>,
    fallback_year: i32,
) -> Option<NaiveDate> {
    let day: u32 = day.trim().parse().ok()?;
    let month = match month.trim().parse::<u32>() {
        Ok(m) => m,
        Err(_) => month_number(month)?,
    };
    let year = match year.map(str::trim).filter(|y| !y.is_empty()) {
        Some(y) => parse_year(y)?,
        None => fallback_year,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    Some(if year < 100 { 2000 + year } else { year })
}

/// Statement period found in the header region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    /// Label text, e.g. `NOVEMBER 2025` or `01 Nov 2025 - 30 Nov 2025`.
    pub label: String,

    /// Year read from the label, if it carries one.
    pub year: Option<i32>,

    /// Indices of the lines the period occupies.
    pub lines: Vec<usize>,
}

/// Locate the period label.
///
/// `label` must have one capture group holding the inline value. When that group is
/// empty the value is taken from the following line.
pub fn find_period(lines: &[String], label: &Regex) -> Option<Period> {
    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = label.captures(line) else {
            continue;
        };

        let inline = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let (text, used) = if !inline.is_empty() {
            (inline.to_string(), vec![idx])
        } else if let Some(next) = lines.get(idx + 1) {
            (next.trim().to_string(), vec![idx, idx + 1])
        } else {
            (String::new(), vec![idx])
        };

        return Some(Period {
            year: year_in(&text),
            label: text,
            lines: used,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(month_number("Nov"), Some(11));
        assert_eq!(month_number("NOVEMBER"), Some(11));
        assert_eq!(month_number("Mei"), Some(5));
        assert_eq!(month_number("Agustus"), Some(8));
        assert_eq!(month_number("Okt"), Some(10));
        assert_eq!(month_number("Desember"), Some(12));
        assert_eq!(month_number("Foo"), None);
    }

    #[test]
    fn test_date_from_parts() {
        assert_eq!(
            date_from_parts("25", "11", None, 2025),
            NaiveDate::from_ymd_opt(2025, 11, 25)
        );
        assert_eq!(
            date_from_parts("01", "Nov", Some("2024"), 2025),
            NaiveDate::from_ymd_opt(2024, 11, 1)
        );
        assert_eq!(
            date_from_parts("05", "01", Some("25"), 2000),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert_eq!(date_from_parts("31", "02", None, 2025), None);
    }

    #[test]
    fn test_find_period_inline_and_next_line() {
        let label = Regex::new(r"(?i)^PERIODE\s*:?\s*(.*)$").unwrap();

        let lines = vec!["REKENING TAHAPAN".to_string(), "PERIODE : NOVEMBER 2025".to_string()];
        let period = find_period(&lines, &label).unwrap();
        assert_eq!(period.label, "NOVEMBER 2025");
        assert_eq!(period.year, Some(2025));
        assert_eq!(period.lines, vec![1]);

        let lines = vec!["Periode".to_string(), "01 Okt 2024 - 31 Okt 2024".to_string()];
        let period = find_period(&lines, &label).unwrap();
        assert_eq!(period.year, Some(2024));
        assert_eq!(period.lines, vec![0, 1]);
    }

    #[test]
    fn test_find_period_absent() {
        let label = Regex::new(r"(?i)^PERIODE\s*:?\s*(.*)$").unwrap();
        assert!(find_period(&["25/11".to_string()], &label).is_none());
    }
}
