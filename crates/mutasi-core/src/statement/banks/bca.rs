//! BCA e-statement (`REKENING TAHAPAN`) layout.
//!
//! Rows start with a `DD/MM` date; the year comes from the `PERIODE` header. Amounts
//! use `1,000.00` grouping with an optional `DB`/`CR` marker and a running balance.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Bank, Direction, RawDocument};
use crate::statement::engine::{
    extract_statement, Cursor, DirectionHint, LayoutEngine, LineAction, LineKind, LineRule,
    ScanContext, Step,
};
use crate::statement::rules::patterns::PAGE_NUMBER;
use crate::statement::rules::{NoiseFilter, SummaryField, SummaryLabel};
use crate::statement::{Extraction, ExtractionContext, StatementExtractor};

use super::{close_state, date_anchored_step, DateAnchored};

/// Narration lines read after the amount line.
pub const DESCRIPTION_WINDOW: usize = 5;

/// Lines scanned below a summary label for its value.
pub const SUMMARY_WINDOW: usize = 5;

lazy_static! {
    static ref PERIOD: Regex = Regex::new(r"(?i)^PERIODE\s*:?\s*(.*)$").unwrap();

    static ref DATE_ANCHOR: Regex = Regex::new(
        r"^(?P<day>\d{2})/(?P<month>\d{2})(?:\s+(?P<rest>.+))?$"
    ).unwrap();

    static ref AMOUNT_LINE: Regex = Regex::new(
        r"^(?P<amount>\d{1,3}(?:,\d{3})*\.\d{2})(?:\s*(?P<marker>DB|CR))?(?:\s+(?P<balance>\d{1,3}(?:,\d{3})*\.\d{2}))?$"
    ).unwrap();

    static ref INLINE_AMOUNT: Regex = Regex::new(
        r"^(?:(?P<text>.*?)\s+)?(?P<amount>\d{1,3}(?:,\d{3})*\.\d{2})(?:\s*(?P<marker>DB|CR))?(?:\s+(?P<balance>\d{1,3}(?:,\d{3})*\.\d{2}))?$"
    ).unwrap();

    static ref TERMINATOR: Regex = Regex::new(
        r"(?i)^(?:SALDO\s+AWAL|SALDO\s+AKHIR|MUTASI\s+CR|MUTASI\s+DB)\b"
    ).unwrap();

    static ref HEADER: Regex = Regex::new(
        r"(?i)^(?:TANGGAL(?:\s+KETERANGAN)?(?:\s+CBG)?(?:\s+MUTASI)?(?:\s+SALDO)?|KETERANGAN|CBG|MUTASI|SALDO|REKENING\s+TAHAPAN|HALAMAN\b.*|TANGGAL\s*:.*|NO\.?\s*REKENING\b.*|KCU\b.*|MATA\s+UANG\b.*)$"
    ).unwrap();

    static ref LEGAL: Regex = Regex::new(
        r"(?i)(?:bersambung\s+ke\s+halaman|BCA\s+berhak|apabila\s+nasabah|dijamin\s+oleh\s+LPS|Lembaga\s+Penjamin\s+Simpanan)"
    ).unwrap();

    static ref STRIP_TRANSAKSI: Regex = Regex::new(r"(?i)\bTRANSAKSI\s+(?:DEBIT|KREDIT)\b").unwrap();
    static ref STRIP_TGL: Regex = Regex::new(r"(?i)\bTGL:\s*\d{2}/\d{2}").unwrap();

    static ref DEBIT_HINT: Regex = Regex::new(
        r"(?i)\b(?:TRANSAKSI\s+DEBIT|BIAYA\s+ADM|TARIKAN\s+ATM|TRSF\s+E-BANKING\s+DB|PAJAK\s+BUNGA|SWITCHING\s+DB|BI-FAST\s+DB|KARTU\s+DEBIT|BYR\s+VIA)"
    ).unwrap();
    static ref CREDIT_HINT: Regex = Regex::new(
        r"(?i)\b(?:TRANSAKSI\s+KREDIT|TRSF\s+E-BANKING\s+CR|SWITCHING\s+CR|BI-FAST\s+CR|SETORAN|KR\s+OTOMATIS|BUNGA)"
    ).unwrap();

    static ref SALDO_AWAL: Regex = Regex::new(r"(?i)\bSALDO\s+AWAL\s*:?").unwrap();
    static ref MUTASI_CR: Regex = Regex::new(r"(?i)\bMUTASI\s+CR\s*:?").unwrap();
    static ref MUTASI_DB: Regex = Regex::new(r"(?i)\bMUTASI\s+DB\s*:?").unwrap();
    static ref SALDO_AKHIR: Regex = Regex::new(r"(?i)\bSALDO\s+AKHIR\s*:?").unwrap();

    static ref RULES: Vec<LineRule> = vec![
        LineRule::new(&TERMINATOR, LineAction::Summary),
        LineRule::new(&HEADER, LineAction::Noise),
        LineRule::new(&LEGAL, LineAction::Noise),
        LineRule::new(&PAGE_NUMBER, LineAction::Noise),
        LineRule::new(&DATE_ANCHOR, LineAction::Date),
        LineRule::new(&AMOUNT_LINE, LineAction::Amount),
    ];

    static ref LABELS: Vec<SummaryLabel> = vec![
        SummaryLabel { pattern: &SALDO_AWAL, field: SummaryField::InitialBalance },
        SummaryLabel { pattern: &MUTASI_CR, field: SummaryField::IncomingTotal },
        SummaryLabel { pattern: &MUTASI_DB, field: SummaryField::OutgoingTotal },
        SummaryLabel { pattern: &SALDO_AKHIR, field: SummaryField::ClosingBalance },
    ];

    static ref TRAILING: NoiseFilter = NoiseFilter::new(
        vec![&*AMOUNT_LINE, &*HEADER, &*LEGAL, &*PAGE_NUMBER],
        vec![&*DATE_ANCHOR, &*TERMINATOR],
    );

    static ref STRIP: Vec<&'static Regex> = vec![&*STRIP_TRANSAKSI, &*STRIP_TGL];

    static ref HINTS: Vec<DirectionHint> = vec![
        DirectionHint::new(&DEBIT_HINT, Direction::Debit),
        DirectionHint::new(&CREDIT_HINT, Direction::Credit),
    ];
}

/// BCA layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcaEngine;

impl StatementExtractor for BcaEngine {
    fn bank(&self) -> Bank {
        Bank::Bca
    }

    fn extract(&self, document: &RawDocument, context: &ExtractionContext) -> Extraction {
        extract_statement(self, document, context)
    }
}

impl LayoutEngine for BcaEngine {
    fn rules(&self) -> &[LineRule] {
        &RULES
    }

    fn summary_labels(&self) -> &[SummaryLabel] {
        &LABELS
    }

    fn period_label(&self) -> Option<&'static Regex> {
        Some(&*PERIOD)
    }

    fn is_summary_boundary(&self, line: &str) -> bool {
        DATE_ANCHOR.is_match(line)
            || AMOUNT_LINE
                .captures(line)
                .is_some_and(|caps| caps.name("marker").is_some())
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
