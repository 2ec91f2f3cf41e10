//! Mandiri (Livin') e-statement layout.
//!
//! Each row is a signed amount (`-50.000,00`) with its narration printed above it and
//! its date (`01 Nov 2025`, optionally with a `WIB` time) printed below it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Bank, RawDocument};
use crate::statement::engine::{
    extract_statement, Cursor, EngineState, LayoutEngine, LineAction, LineKind, LineRule,
    PendingTransaction, ScanContext, Step,
};
use crate::statement::rules::patterns::{COUNTER, MONTH_NAME, PAGE_NUMBER, TIME_ONLY};
use crate::statement::rules::{NoiseFilter, SummaryField, SummaryLabel};
use crate::statement::{Extraction, ExtractionContext, StatementExtractor};

use super::{close_state, lookback};

/// Narration lines read above the amount line.
pub const DESCRIPTION_WINDOW: usize = 6;

/// Lines scanned below a summary label for its value.
pub const SUMMARY_WINDOW: usize = 15;

lazy_static! {
    static ref PERIOD: Regex = Regex::new(
        r"(?i)^(?:Periode|Period)(?:\s*/\s*Period)?\s*:?\s*(.*)$"
    ).unwrap();

    static ref SIGNED_AMOUNT: Regex = Regex::new(
        r"^(?P<sign>[+-])\s?(?P<amount>\d{1,3}(?:\.\d{3})*,\d{2})(?:\s+(?P<balance>\d{1,3}(?:\.\d{3})*,\d{2}))?$"
    ).unwrap();

    static ref BALANCE_LINE: Regex = Regex::new(r"^\d{1,3}(?:\.\d{3})*,\d{2}$").unwrap();

    static ref DATE_LINE: Regex = Regex::new(&format!(
        r"(?i)^(?P<day>\d{{1,2}})\s+(?P<month>{MONTH_NAME})(?:\s+(?P<year>\d{{4}}))?(?:\s*,?\s*\d{{2}}[:.]\d{{2}}(?:[:.]\d{{2}})?(?:\s*WIB)?)?$"
    )).unwrap();

    // Any date inside a line ends the lookback
    static ref DATE_ANYWHERE: Regex = Regex::new(&format!(
        r"(?i)\b\d{{1,2}}\s+{MONTH_NAME}\s+\d{{4}}\b"
    )).unwrap();

    static ref HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:no\.?|tanggal|date|keterangan|remarks|nominal|amount|saldo|balance|\(?idr\)?|/)\s*)+$"
    ).unwrap();

    static ref LEGAL: Regex = Regex::new(
        r"(?i)(?:PT\s+Bank\s+Mandiri\s+\(Persero\)\s+Tbk\.?\s+(?:terdaftar|berizin)|dijamin\s+oleh\s+LPS|Lembaga\s+Penjamin\s+Simpanan|Mandiri\s+Call|bankmandiri\.co\.id|dokumen\s+ini\s+dicetak)"
    ).unwrap();

    static ref SALDO_AWAL: Regex = Regex::new(
        r"(?i)\b(?:Saldo\s+Awal|Initial\s+Balance|Opening\s+Balance)\b"
    ).unwrap();
    static ref DANA_MASUK: Regex = Regex::new(
        r"(?i)\b(?:Dana\s+Masuk|Incoming(?:\s+Funds)?)\b"
    ).unwrap();
    static ref DANA_KELUAR: Regex = Regex::new(
        r"(?i)\b(?:Dana\s+Keluar|Outgoing(?:\s+Funds)?)\b"
    ).unwrap();
    static ref SALDO_AKHIR: Regex = Regex::new(
        r"(?i)\b(?:Saldo\s+Akhir|Closing\s+Balance|Ending\s+Balance)\b"
    ).unwrap();

    static ref RULES: Vec<LineRule> = vec![
        LineRule::new(&PAGE_NUMBER, LineAction::Noise),
        LineRule::new(&LEGAL, LineAction::Noise),
        LineRule::new(&SIGNED_AMOUNT, LineAction::Amount),
        LineRule::new(&DATE_LINE, LineAction::Date),
        LineRule::new(&BALANCE_LINE, LineAction::Balance),
    ];

    static ref LABELS: Vec<SummaryLabel> = vec![
        SummaryLabel { pattern: &SALDO_AWAL, field: SummaryField::InitialBalance },
        SummaryLabel { pattern: &DANA_MASUK, field: SummaryField::IncomingTotal },
        SummaryLabel { pattern: &DANA_KELUAR, field: SummaryField::OutgoingTotal },
        SummaryLabel { pattern: &SALDO_AKHIR, field: SummaryField::ClosingBalance },
    ];

    static ref LOOKBACK: NoiseFilter = NoiseFilter::new(
        vec![
            &*COUNTER,
            &*BALANCE_LINE,
            &*HEADER,
            &*TIME_ONLY,
            &*PAGE_NUMBER,
            &*LEGAL,
        ],
        vec![&*DATE_ANYWHERE, &*SIGNED_AMOUNT],
    );
}

/// Mandiri layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandiriEngine;

impl StatementExtractor for MandiriEngine {
    fn bank(&self) -> Bank {
        Bank::Mandiri
    }

    fn extract(&self, document: &RawDocument, context: &ExtractionContext) -> Extraction {
        extract_statement(self, document, context)
    }
}

impl LayoutEngine for MandiriEngine {
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
        SIGNED_AMOUNT.is_match(line) || DATE_LINE.is_match(line)
    }

    /// An amount opens a transaction awaiting its date. A second amount before that
    /// date arrives drops the first with a warning.
    fn step(&self, cursor: Cursor, idx: usize, kind: LineKind, ctx: &ScanContext<'_>) -> Step {
        let Cursor { state, group_date } = cursor;
        let at = |state: EngineState| Cursor { state, group_date };

        match (state, kind) {
            (
                state,
                LineKind::Amount {
                    value,
                    direction,
                    balance,
                },
            ) => {
                let mut pending = PendingTransaction::from_amount(value, direction, balance, None);
                pending.narration = lookback(idx, ctx, &LOOKBACK);
                Step::to(at(EngineState::TransactionOpen(pending))).closing(close_state(self, state))
            }
            (EngineState::TransactionOpen(mut pending), LineKind::Date { date, .. }) => {
                pending.date = Some(date);
                Step::to(at(EngineState::Idle)).closing(self.close(pending))
            }
            (EngineState::TransactionOpen(mut pending), LineKind::Balance(value)) => {
                if pending.balance.is_none() {
                    pending.balance = Some(value);
                }
                Step::to(at(EngineState::TransactionOpen(pending)))
            }
            (state, _) => Step::to(at(state)),
        }
    }

    fn finish(&self, cursor: Cursor, _ctx: &ScanContext<'_>) -> Step {
        Step::to(Cursor::default()).closing(close_state(self, cursor.state))
    }
}
