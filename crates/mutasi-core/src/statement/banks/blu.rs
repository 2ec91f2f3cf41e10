//! blu by BCA Digital statement layout.
//!
//! Transactions are grouped under date headers (`01 November 2025`). Each row is a
//! signed amount, sometimes merged with its time and running balance on one line
//! (`10:15 -Rp 50.000 Rp 950.000`), with narration printed above it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Bank, RawDocument};
use crate::statement::engine::{
    extract_statement, Closed, Cursor, EngineState, LayoutEngine, LineAction, LineKind,
    LineRule, PendingTransaction, ScanContext, Step,
};
use crate::statement::rules::patterns::{COUNTER, MONTH_NAME, PAGE_NUMBER, TIME_ONLY};
use crate::statement::rules::{NoiseFilter, SummaryField, SummaryLabel};
use crate::statement::{Extraction, ExtractionContext, StatementExtractor};

use super::{close_state, lookback};

/// Narration lines read above the amount line.
pub const DESCRIPTION_WINDOW: usize = 5;

/// Lines scanned below a summary label for its value.
pub const SUMMARY_WINDOW: usize = 20;

const RUPIAH: &str = r"\d{1,3}(?:\.\d{3})*(?:,\d{2})?";

lazy_static! {
    static ref PERIOD: Regex = Regex::new(r"(?i)^Periode\s*:?\s*(.*)$").unwrap();

    static ref GROUP_NAMED: Regex = Regex::new(&format!(
        r"(?i)^(?P<day>\d{{1,2}})\s+(?P<month>{MONTH_NAME})\s+(?P<year>\d{{4}})$"
    )).unwrap();

    static ref GROUP_NUMERIC: Regex = Regex::new(
        r"^(?P<day>\d{2})/(?P<month>\d{2})/(?P<year>\d{4})$"
    ).unwrap();

    static ref SIGNED_AMOUNT: Regex = Regex::new(&format!(
        r"(?i)^(?:\d{{2}}[:.]\d{{2}}(?:[:.]\d{{2}})?(?:\s*WIB)?\s+)?(?P<sign>[+-])\s?(?:Rp\.?\s?)?(?P<amount>{RUPIAH})(?:\s+(?P<balance>(?:Rp\.?\s?)?{RUPIAH}))?$"
    )).unwrap();

    static ref BALANCE_LINE: Regex = Regex::new(
        r"(?i)^(?:Rp\.?\s?\d{1,3}(?:\.\d{3})*(?:,\d{2})?|\d{1,3}(?:\.\d{3})+(?:,\d{2})?|\d{1,3}(?:\.\d{3})*,\d{2})$"
    ).unwrap();

    static ref HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:tanggal|waktu|keterangan|deskripsi|nominal|jumlah|saldo|mutasi|riwayat\s+transaksi|transaction\s+history)\s*)+$"
    ).unwrap();

    static ref LEGAL: Regex = Regex::new(
        r"(?i)(?:PT\s+Bank\s+Digital\s+BCA|terdaftar\s+dan\s+diawasi|\bLPS\b|Lembaga\s+Penjamin\s+Simpanan)"
    ).unwrap();

    static ref SALDO_AWAL: Regex = Regex::new(r"(?i)\bSaldo\s+Awal\b").unwrap();
    static ref UANG_MASUK: Regex = Regex::new(
        r"(?i)\b(?:Total\s+Uang\s+Masuk|Dana\s+Masuk|Pemasukan)\b"
    ).unwrap();
    static ref UANG_KELUAR: Regex = Regex::new(
        r"(?i)\b(?:Total\s+Uang\s+Keluar|Dana\s+Keluar|Pengeluaran)\b"
    ).unwrap();
    static ref SALDO_AKHIR: Regex = Regex::new(r"(?i)\bSaldo\s+Akhir\b").unwrap();

    static ref RULES: Vec<LineRule> = vec![
        LineRule::new(&LEGAL, LineAction::Noise),
        LineRule::new(&PAGE_NUMBER, LineAction::Noise),
        LineRule::new(&GROUP_NAMED, LineAction::Date),
        LineRule::new(&GROUP_NUMERIC, LineAction::Date),
        LineRule::new(&SIGNED_AMOUNT, LineAction::Amount),
        LineRule::new(&BALANCE_LINE, LineAction::Balance),
    ];

    static ref LABELS: Vec<SummaryLabel> = vec![
        SummaryLabel { pattern: &SALDO_AWAL, field: SummaryField::InitialBalance },
        SummaryLabel { pattern: &UANG_MASUK, field: SummaryField::IncomingTotal },
        SummaryLabel { pattern: &UANG_KELUAR, field: SummaryField::OutgoingTotal },
        SummaryLabel { pattern: &SALDO_AKHIR, field: SummaryField::ClosingBalance },
    ];

    static ref LOOKBACK: NoiseFilter = NoiseFilter::new(
        vec![
            &*TIME_ONLY,
            &*BALANCE_LINE,
            &*COUNTER,
            &*PAGE_NUMBER,
            &*HEADER,
            &*LEGAL,
        ],
        vec![&*GROUP_NAMED, &*GROUP_NUMERIC, &*SIGNED_AMOUNT],
    );
}

/// BLU layout engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BluEngine;

impl BluEngine {
    /// Close an open transaction, giving it `date` if it never had one.
    fn close_with_date(&self, state: EngineState, date: Option<chrono::NaiveDate>) -> Closed {
        match state {
            EngineState::TransactionOpen(mut pending) => {
                if pending.date.is_none() {
                    pending.date = date;
                }
                self.close(pending)
            }
            other => close_state(self, other),
        }
    }
}

impl StatementExtractor for BluEngine {
    fn bank(&self) -> Bank {
        Bank::Blu
    }

    fn extract(&self, document: &RawDocument, context: &ExtractionContext) -> Extraction {
        extract_statement(self, document, context)
    }
}

impl LayoutEngine for BluEngine {
    fn rules(&self) -> &[LineRule] {
        &RULES
    }

    fn summary_labels(&self) -> &[SummaryLabel] {
        &LABELS
    }

    fn period_label(&self) -> Option<&'static Regex> {
        Some(&*PERIOD)
    }

    // Group headers carry the full date.
    fn infers_year_from_period(&self) -> bool {
        false
    }

    fn is_summary_boundary(&self, line: &str) -> bool {
        SIGNED_AMOUNT.is_match(line) || GROUP_NAMED.is_match(line) || GROUP_NUMERIC.is_match(line)
    }

    fn step(&self, cursor: Cursor, idx: usize, kind: LineKind, ctx: &ScanContext<'_>) -> Step {
        let Cursor { state, group_date } = cursor;

        match (state, kind) {
            (state, LineKind::Date { date, .. }) => {
                let closed = self.close_with_date(state, Some(date));
                Step::to(Cursor {
                    state: EngineState::Idle,
                    group_date: Some(date),
                })
                .closing(closed)
            }
            (
                state,
                LineKind::Amount {
                    value,
                    direction,
                    balance,
                },
            ) => {
                let closed = close_state(self, state);
                let mut pending =
                    PendingTransaction::from_amount(value, direction, balance, group_date);
                pending.narration = lookback(idx, ctx, &LOOKBACK);
                Step::to(Cursor {
                    state: EngineState::TransactionOpen(pending),
                    group_date,
                })
                .closing(closed)
            }
            (EngineState::TransactionOpen(mut pending), LineKind::Balance(value)) => {
                if pending.balance.is_none() {
                    pending.balance = Some(value);
                }
                Step::to(Cursor {
                    state: EngineState::TransactionOpen(pending),
                    group_date,
                })
            }
            (state, _) => Step::to(Cursor { state, group_date }),
        }
    }

    fn finish(&self, cursor: Cursor, _ctx: &ScanContext<'_>) -> Step {
        let closed = self.close_with_date(cursor.state, cursor.group_date);
        Step::to(Cursor::default()).closing(closed)
    }
}
