//! Per-layout extraction engines.
//!
//! BCA and BNI open a transaction on a date line and read narration on both sides of
//! the amount. Mandiri and BLU open on a signed amount and look back for narration.

pub mod bca;
pub mod blu;
pub mod bni;
pub mod mandiri;

pub use bca::BcaEngine;
pub use blu::BluEngine;
pub use bni::BniEngine;
pub use mandiri::MandiriEngine;

use regex::Regex;
use tracing::debug;

use crate::statement::engine::{
    amount_from_captures, Closed, Cursor, EngineState, LayoutEngine, LineKind,
    PendingTransaction, ScanContext, Step,
};
use crate::statement::rules::{assemble, DescriptionWindow, NoiseFilter};

/// Close whatever the state holds.
pub(crate) fn close_state<E: LayoutEngine + ?Sized>(engine: &E, state: EngineState) -> Closed {
    match state {
        EngineState::Idle => Closed::Nothing,
        EngineState::AccumulatingDescription(pending) | EngineState::TransactionOpen(pending) => {
            engine.close(pending)
        }
    }
}

/// Narration lines preceding an amount anchor.
pub(crate) fn lookback(idx: usize, ctx: &ScanContext<'_>, filter: &NoiseFilter) -> Vec<String> {
    assemble(
        ctx.lines,
        idx,
        DescriptionWindow::backward(ctx.windows.description_window),
        filter,
        &ctx.consumed,
    )
}

/// Narration lines following an amount line.
pub(crate) fn trailing(idx: usize, ctx: &ScanContext<'_>, filter: &NoiseFilter) -> Vec<String> {
    assemble(
        ctx.lines,
        idx,
        DescriptionWindow::forward(ctx.windows.description_window),
        filter,
        &ctx.consumed,
    )
}

/// Read trailing narration after the amount line at `idx` into `pending`.
fn read_trailing(
    pending: &mut PendingTransaction,
    idx: usize,
    ctx: &ScanContext<'_>,
    filter: &NoiseFilter,
) {
    pending.narration.extend(trailing(idx, ctx, filter));
    pending.trailing_until = Some(idx + ctx.windows.description_window);
}

/// Split narration printed on a date line from an amount at its end.
///
/// `pattern` captures an optional `text` group followed by the amount groups.
pub(crate) fn split_inline_amount(rest: &str, pattern: &Regex) -> Option<(String, LineKind)> {
    let caps = pattern.captures(rest)?;
    let text = caps
        .name("text")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some((text, amount_from_captures(&caps)))
}

/// Tables a date-anchored layout plugs into [`date_anchored_step`].
pub(crate) struct DateAnchored<'a> {
    /// Amount at the end of a date line's narration.
    pub inline_amount: &'a Regex,
    /// Filter for narration after the amount line.
    pub trailing: &'a NoiseFilter,
}

/// Transition shared by BCA and BNI.
///
/// A date line closes the previous transaction and starts gathering narration. The
/// amount line moves to `TransactionOpen` after pulling in trailing narration. A later
/// amount-shaped line becomes the running balance. Summary lines close.
pub(crate) fn date_anchored_step<E: LayoutEngine + ?Sized>(
    engine: &E,
    layout: &DateAnchored<'_>,
    cursor: Cursor,
    idx: usize,
    kind: LineKind,
    ctx: &ScanContext<'_>,
) -> Step {
    let Cursor { state, group_date } = cursor;
    let cursor = Cursor {
        state: EngineState::Idle,
        group_date,
    };

    match (state, kind) {
        (state, LineKind::Date { date, rest }) => {
            let closed = close_state(engine, state);
            let mut pending = PendingTransaction::dated(date);

            let next = match rest {
                Some(rest) => match split_inline_amount(&rest, layout.inline_amount) {
                    Some((text, LineKind::Amount { value, direction, balance })) => {
                        if !text.is_empty() {
                            pending.narration.push(text);
                        }
                        pending.set_amount(value, direction, balance);
                        read_trailing(&mut pending, idx, ctx, layout.trailing);
                        EngineState::TransactionOpen(pending)
                    }
                    _ => {
                        pending.narration.push(rest);
                        EngineState::AccumulatingDescription(pending)
                    }
                },
                None => EngineState::AccumulatingDescription(pending),
            };
            Step::to(cursor.with_state(next)).closing(closed)
        }
        (EngineState::AccumulatingDescription(mut pending), LineKind::Text) => {
            pending.narration.push(ctx.lines[idx].clone());
            Step::to(cursor.with_state(EngineState::AccumulatingDescription(pending)))
        }
        (
            EngineState::AccumulatingDescription(mut pending),
            LineKind::Amount {
                value,
                direction,
                balance,
            },
        ) => {
            pending.set_amount(value, direction, balance);
            read_trailing(&mut pending, idx, ctx, layout.trailing);
            Step::to(cursor.with_state(EngineState::TransactionOpen(pending)))
        }
        (EngineState::TransactionOpen(mut pending), LineKind::Amount { value, .. })
        | (EngineState::TransactionOpen(mut pending), LineKind::Balance(value)) => {
            if pending.balance.is_none() {
                pending.balance = Some(value);
            }
            Step::to(cursor.with_state(EngineState::TransactionOpen(pending)))
        }
        (EngineState::TransactionOpen(pending), LineKind::Text)
            if pending.trailing_until.is_some_and(|end| idx > end) =>
        {
            let warning = format!(
                "Ignored {} narration past the description window: {}",
                engine.bank(),
                ctx.lines[idx]
            );
            debug!("{}", warning);
            Step::to(cursor.with_state(EngineState::TransactionOpen(pending))).warn(warning)
        }
        (state, LineKind::Summary) => Step::to(cursor).closing(close_state(engine, state)),
        (state, _) => Step::to(cursor.with_state(state)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;

    use crate::models::{RawDocument, Transaction};
    use crate::statement::engine::{extract_statement, run_engine, LayoutEngine, ScanContext};
    use crate::statement::{Extraction, ExtractionContext};

    pub fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Run an engine over bare lines with no summary block.
    pub fn run<E: LayoutEngine>(engine: &E, items: &[&str], year: i32) -> (Vec<Transaction>, Vec<String>) {
        let lines = lines(items);
        let ctx = ScanContext {
            lines: &lines,
            consumed: HashSet::new(),
            year,
            windows: ExtractionContext::new(year).layouts.windows(engine.bank()),
        };
        run_engine(engine, &ctx)
    }

    pub fn extract<E: LayoutEngine>(engine: &E, text: &str, year: i32) -> Extraction {
        extract_statement(engine, &RawDocument::from_text(text), &ExtractionContext::new(year))
    }
}
