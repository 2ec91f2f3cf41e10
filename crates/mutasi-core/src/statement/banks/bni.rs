//! BNI e-statement layout.
//!
//! Rows start with a date (`01/11/2025`, `01 Nov 2025` or `01 Nov`). Amounts follow
//! either separator convention and may carry a sign, an `Rp`/`IDR` prefix and a
//! `D`/`K` or `DB`/`CR` marker.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Bank, Direction, RawDocument};
use crate::statement::engine::{
    extract_statement, Cursor, DirectionHint, LayoutEngine, LineAction, LineKind, LineRule,
    ScanContext, Step,
};
use crate::statement::rules::patterns::{ACCOUNT_LABEL, MONTH_NAME, PAGE_NUMBER, TIME_ONLY};
use crate::statement::rules::{NoiseFilter, SummaryField, SummaryLabel};
use crate::statement::{Extraction, ExtractionContext, StatementExtractor};

use super::{close_state, date_anchored_step, DateAnchored};

/// Narration lines read after the amount line.
pub const DESCRIPTION_WINDOW: usize = 4;

/// Lines scanned below a summary label for its value.
pub const SUMMARY_WINDOW: usize = 16;

const AMOUNT: &str = r"\d{1,3}(?:[.,]\d{3})*[.,]\d{2}";

lazy_static! {
    static ref PERIOD: Regex = Regex::new(
        r"(?i)^(?:Periode(?:\s+Transaksi)?|Period)\s*:?\s*(.*)$"
    ).unwrap();

    static ref DATE_NUMERIC: Regex = Regex::new(
        r"^(?P<day>\d{2})/(?P<month>\d{2})/(?P<year>\d{4})(?:\s+(?P<rest>.+))?$"
    ).unwrap();

    static ref DATE_NAMED: Regex = Regex::new(&format!(
        r"(?i)^(?P<day>\d{{1,2}})\s+(?P<month>{MONTH_NAME})(?:\s+(?P<year>\d{{4}}))?(?:\s+(?P<rest>.+))?$"
    )).unwrap();

    static ref AMOUNT_LINE: Regex = Regex::new(&format!(
        r"^(?P<sign>[+-])?\s*(?:Rp\.?|RP\.?|IDR)?\s*(?P<amount>{AMOUNT})(?:\s*(?P<marker>DB|CR|D|K))?(?:\s+(?P<balance>(?:Rp\.?\s*|IDR\s*)?{AMOUNT}))?$"
    )).unwrap();

    static ref INLINE_AMOUNT: Regex = Regex::new(&format!(
        r"^(?:(?P<text>.*?)[\s|]+)?(?P<sign>[+-])?(?:Rp\.?\s*|IDR\s*)?(?P<amount>{AMOUNT})(?:\s*(?P<marker>DB|CR|D|K))?(?:[\s|]+(?P<balance>(?:Rp\.?\s*|IDR\s*)?{AMOUNT}))?[\s|]*$"
    )).unwrap();

    static ref HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:tanggal|transaksi|uraian|keterangan|tipe|nominal|saldo|debet|debit|kredit|credit|posting|date|description|amount|balance|branch|cabang|journal|no\.?\s*ref|\||/)\s*)+$"
    ).unwrap();

    static ref LEGAL: Regex = Regex::new(
        r"(?i)(?:PT\s+Bank\s+Negara\s+Indonesia\s+\(Persero\)\s+Tbk\s+(?:terdaftar|berizin)|dijamin\s+oleh\s+LPS|Lembaga\s+Penjamin\s+Simpanan|BNI\s+Call|bni\.co\.id)"
    ).unwrap();

    static ref STRIP_PIPE: Regex = Regex::new(r"\|").unwrap();
    static ref STRIP_TIME: Regex = Regex::new(r"(?i)\b\d{2}:\d{2}(?::\d{2})?(?:\s*WIB)?").unwrap();

    static ref DEBIT_HINT: Regex = Regex::new(
        r"(?i)\b(?:TRANSFER\s+KE|TRF\s+KE|PEMBAYARAN|PEMBELIAN|TARIK\s+TUNAI|BIAYA|ADMIN|PAJAK)"
    ).unwrap();
    static ref CREDIT_HINT: Regex = Regex::new(
        r"(?i)\b(?:TRANSFER\s+DARI|TRF\s+DARI|SETOR|BUNGA|REFUND|GAJI)"
    ).unwrap();

    static ref SALDO_AWAL: Regex = Regex::new(
        r"(?i)\b(?:Saldo\s+Awal|Beginning\s+Balance|Opening\s+Balance)\s*:?"
    ).unwrap();
    static ref TOTAL_KREDIT: Regex = Regex::new(
        r"(?i)\b(?:Total\s+Kredit|Total\s+Credit|Dana\s+Masuk)\s*:?"
    ).unwrap();
    static ref TOTAL_DEBET: Regex = Regex::new(
        r"(?i)\b(?:Total\s+Debet|Total\s+Debit|Dana\s+Keluar)\s*:?"
    ).unwrap();
    static ref SALDO_AKHIR: Regex = Regex::new(
        r"(?i)\b(?:Saldo\s+Akhir|Ending\s+Balance|Closing\s+Balance)\s*:?"
    ).unwrap();

    static ref RULES: Vec<LineRule> = vec![
        LineRule::new(&HEADER, LineAction::Noise),
        LineRule::new(&LEGAL, LineAction::Noise),
        LineRule::new(&PAGE_NUMBER, LineAction::Noise),
        LineRule::new(&TIME_ONLY, LineAction::Noise),
        LineRule::new(&ACCOUNT_LABEL, LineAction::Noise),
        LineRule::new(&DATE_NUMERIC, LineAction::Date),
        LineRule::new(&DATE_NAMED, LineAction::Date),
        LineRule::new(&AMOUNT_LINE, LineAction::Amount),
    ];

    static ref LABELS: Vec<SummaryLabel> = vec![
        SummaryLabel { pattern: &SALDO_AWAL, field: SummaryField::InitialBalance },
        SummaryLabel { pattern: &TOTAL_KREDIT, field: SummaryField::IncomingTotal },
        SummaryLabel { pattern: &TOTAL_DEBET, field: SummaryField::OutgoingTotal },
        SummaryLabel { pattern: &SALDO_AKHIR, field: SummaryField::ClosingBalance },
    ];

    static ref TRAILING: NoiseFilter = NoiseFilter::new(
        vec![&*AMOUNT_LINE, &*HEADER, &*LEGAL, &*PAGE_NUMBER, &*TIME_ONLY, &*ACCOUNT_LABEL],
        vec![&*DATE_NUMERIC, &*DATE_NAMED],
    );

    static ref STRIP: Vec<&'static Regex> = vec![&*STRIP_PIPE, &*STRIP_TIME];

    static ref HINTS: Vec<DirectionHint> = vec![
        DirectionHint::new(&DEBIT_HINT, Direction::Debit),
        DirectionHint::new(&CREDIT_HINT, Direction::Credit),
    ];
}

/// BNI layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BniEngine;

impl StatementExtractor for BniEngine {
    fn bank(&self) -> Bank {
        Bank::Bni
    }

    fn extract(&self, document: &RawDocument, context: &ExtractionContext) -> Extraction {
        extract_statement(self, document, context)
    }
}

impl LayoutEngine for BniEngine {
    fn rules(&self) -> &[LineRule] {
        &RULES
    }

    fn summary_labels(&self) -> &[SummaryLabel] {
        &LABELS
    }

    fn period_label(&self) -> Option<&'static Regex> {
        Some(&*PERIOD)
    }

    // Signed or marked amounts are transaction rows. Bare amounts may be summary values.
    fn is_summary_boundary(&self, line: &str) -> bool {
        DATE_NUMERIC.is_match(line)
            || DATE_NAMED.is_match(line)
            || AMOUNT_LINE
                .captures(line)
                .is_some_and(|caps| caps.name("sign").is_some() || caps.name("marker").is_some())
    }

    fn strip_patterns(&self) -> &[&'static Regex] {
        &STRIP
    }

    fn direction_hints(&self) -> &[DirectionHint] {
        &HINTS
    }

    fn step(&self, cursor: Cursor, idx: usize, kind: LineKind, ctx: &ScanContext<'_>) -> Step {
        let layout = DateAnchored {
            inline_amount: &INLINE_AMOUNT,
            trailing: &TRAILING,
        };
        date_anchored_step(self, &layout, cursor, idx, kind, ctx)
    }

    fn finish(&self, cursor: Cursor, _ctx: &ScanContext<'_>) -> Step {
        Step::to(Cursor::default()).closing(close_state(self, cursor.state))
    }
}
