//! Line classification and the forward-pass state machine shared by every layout.
//!
//! A layout supplies an ordered table of [`LineRule`]s and a transition function. The
//! driver classifies each line, feeds it to the layout together with the current
//! [`Cursor`] and collects whatever the step emits.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::{Direction, RawDocument, StatementSummary, Transaction, WindowConfig};
use crate::statement::rules::{
    date_from_parts, find_period, finish_description, normalize_amount, scan_summary,
    SummaryLabel, SummaryValues,
};
use crate::statement::{Extraction, ExtractionContext, StatementExtractor};

/// What a matching rule makes of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    /// Structural noise: headers, footers, legal text.
    Noise,
    /// Summary label or terminator.
    Summary,
    /// Date anchor. Captures `day`, `month`, optional `year` and `rest`.
    Date,
    /// Amount line. Captures `amount`, optional `sign`, `marker` and `balance`.
    Amount,
    /// Standalone running balance. Captures optional `balance`.
    Balance,
}

/// One entry of a layout's classification table.
#[derive(Debug, Clone, Copy)]
pub struct LineRule {
    pub pattern: &'static Regex,
    pub action: LineAction,
}

impl LineRule {
    pub const fn new(pattern: &'static Regex, action: LineAction) -> Self {
        Self { pattern, action }
    }
}

/// Classified line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Date {
        date: NaiveDate,
        rest: Option<String>,
    },
    Amount {
        value: Decimal,
        direction: Option<Direction>,
        balance: Option<Decimal>,
    },
    Balance(Decimal),
    Summary,
    Noise,
    Text,
}

/// Classify `line` with the first matching rule.
///
/// A date rule whose captures do not form a valid calendar date falls through to the
/// next rule. Lines no rule claims are [`LineKind::Text`].
pub fn classify_line(rules: &[LineRule], line: &str, year: i32) -> LineKind {
    for rule in rules {
        let Some(caps) = rule.pattern.captures(line) else {
            continue;
        };

        match rule.action {
            LineAction::Noise => return LineKind::Noise,
            LineAction::Summary => return LineKind::Summary,
            LineAction::Date => {
                if let Some(kind) = date_from_captures(&caps, year) {
                    return kind;
                }
            }
            LineAction::Amount => return amount_from_captures(&caps),
            LineAction::Balance => {
                let token = caps
                    .name("balance")
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                return LineKind::Balance(normalize_amount(token).abs());
            }
        }
    }
    LineKind::Text
}

fn date_from_captures(caps: &Captures<'_>, year: i32) -> Option<LineKind> {
    let date = date_from_parts(
        caps.name("day")?.as_str(),
        caps.name("month")?.as_str(),
        caps.name("year").map(|m| m.as_str()),
        year,
    )?;
    let rest = caps
        .name("rest")
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty());
    Some(LineKind::Date { date, rest })
}

/// Build an amount line from `amount`, `sign`, `marker` and `balance` captures.
pub fn amount_from_captures(caps: &Captures<'_>) -> LineKind {
    let sign = caps.name("sign").map(|m| m.as_str()).unwrap_or("");
    let token = caps
        .name("amount")
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or("");
    let signed = normalize_amount(&format!("{sign}{token}"));

    let direction = caps
        .name("marker")
        .and_then(|m| direction_for_marker(m.as_str()))
        .or_else(|| {
            (!sign.is_empty() || signed.is_sign_negative()).then(|| Direction::from_signed(signed))
        });

    LineKind::Amount {
        value: signed.abs(),
        direction,
        balance: caps
            .name("balance")
            .map(|m| normalize_amount(m.as_str()).abs()),
    }
}

/// Direction named by a debit/credit marker column.
pub fn direction_for_marker(marker: &str) -> Option<Direction> {
    match marker.trim().to_uppercase().as_str() {
        "DB" | "D" | "DR" | "DEBIT" | "DEBET" => Some(Direction::Debit),
        "CR" | "K" | "C" | "KREDIT" | "CREDIT" => Some(Direction::Credit),
        _ => None,
    }
}

/// Narration keyword that implies a direction when the layout prints no marker.
#[derive(Debug, Clone, Copy)]
pub struct DirectionHint {
    pub pattern: &'static Regex,
    pub direction: Direction,
}

impl DirectionHint {
    pub const fn new(pattern: &'static Regex, direction: Direction) -> Self {
        Self { pattern, direction }
    }
}

/// A transaction still being assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingTransaction {
    pub date: Option<NaiveDate>,
    pub narration: Vec<String>,
    pub amount: Option<Decimal>,
    pub direction: Option<Direction>,
    pub balance: Option<Decimal>,
    /// Last line index already read as trailing narration.
    pub trailing_until: Option<usize>,
}

impl PendingTransaction {
    /// Pending transaction opened by a date anchor.
    pub fn dated(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// Pending transaction opened by an amount anchor.
    pub fn from_amount(
        value: Decimal,
        direction: Option<Direction>,
        balance: Option<Decimal>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            date,
            amount: Some(value),
            direction,
            balance,
            ..Default::default()
        }
    }

    pub fn set_amount(&mut self, value: Decimal, direction: Option<Direction>, balance: Option<Decimal>) {
        self.amount = Some(value);
        self.direction = direction;
        self.balance = balance;
    }

    pub fn has_narration(&self) -> bool {
        !self.narration.is_empty()
    }
}

/// Position of the state machine between lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EngineState {
    /// No transaction in progress.
    #[default]
    Idle,
    /// Anchor seen, narration being gathered, amount not yet known.
    AccumulatingDescription(PendingTransaction),
    /// Amount known; waiting for the line that closes the transaction.
    TransactionOpen(PendingTransaction),
}

/// Engine state plus the date of the current group header (BLU).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    pub state: EngineState,
    pub group_date: Option<NaiveDate>,
}

impl Cursor {
    pub fn with_state(self, state: EngineState) -> Self {
        Self { state, ..self }
    }
}

/// Outcome of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub cursor: Cursor,
    pub emitted: Option<Transaction>,
    pub warning: Option<String>,
}

impl Step {
    pub fn to(cursor: Cursor) -> Self {
        Self {
            cursor,
            emitted: None,
            warning: None,
        }
    }

    /// Attach the outcome of closing a pending transaction.
    pub fn closing(mut self, closed: Closed) -> Self {
        match closed {
            Closed::Emitted(t) => self.emitted = Some(t),
            Closed::Discarded(w) => self.warning = Some(w),
            Closed::Nothing => {}
        }
        self
    }

    pub fn warn(mut self, warning: String) -> Self {
        self.warning = Some(warning);
        self
    }
}

/// What happened to a pending transaction when it was closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Closed {
    Emitted(Transaction),
    Discarded(String),
    Nothing,
}

/// Read-only inputs to every transition.
#[derive(Debug, Clone)]
pub struct ScanContext<'a> {
    pub lines: &'a [String],
    /// Summary and period lines. Classified as [`LineKind::Summary`].
    pub consumed: HashSet<usize>,
    /// Year for dates printed without one.
    pub year: i32,
    pub windows: WindowConfig,
}

/// A statement layout: classification tables plus a transition function.
pub trait LayoutEngine: StatementExtractor {
    /// Ordered line classification table.
    fn rules(&self) -> &[LineRule];

    fn summary_labels(&self) -> &[SummaryLabel];

    /// Period label pattern with one capture group for the inline value.
    fn period_label(&self) -> Option<&'static Regex> {
        None
    }

    /// Whether dates without a year take it from the period label.
    fn infers_year_from_period(&self) -> bool {
        true
    }

    /// Lines that end a forward summary value scan.
    fn is_summary_boundary(&self, line: &str) -> bool;

    /// Fragments blanked out of the finished description.
    fn strip_patterns(&self) -> &[&'static Regex] {
        &[]
    }

    /// Narration keywords that decide direction when no sign or marker did.
    fn direction_hints(&self) -> &[DirectionHint] {
        &[]
    }

    /// Advance the machine by one classified line.
    fn step(&self, cursor: Cursor, idx: usize, kind: LineKind, ctx: &ScanContext<'_>) -> Step;

    /// Flush whatever is pending at end of input.
    fn finish(&self, cursor: Cursor, ctx: &ScanContext<'_>) -> Step;

    /// Turn a pending transaction into a record, or explain why it was dropped.
    fn close(&self, pending: PendingTransaction) -> Closed {
        let bank = self.bank();
        let raw = pending.narration.join(" ");

        let (Some(date), Some(amount)) = (pending.date, pending.amount) else {
            if !pending.has_narration() && pending.amount.is_none() {
                return Closed::Nothing;
            }
            let missing = if pending.date.is_none() { "date" } else { "amount" };
            debug!("Discarding {} transaction without {}: {:?}", bank, missing, raw);
            return Closed::Discarded(format!(
                "Discarded {} transaction without {}: {}",
                bank,
                missing,
                if raw.is_empty() { "(no description)" } else { raw.as_str() }
            ));
        };

        let direction = pending
            .direction
            .or_else(|| {
                self.direction_hints()
                    .iter()
                    .find(|hint| hint.pattern.is_match(&raw))
                    .map(|hint| hint.direction)
            })
            .unwrap_or(Direction::Credit);

        let mut description = finish_description(&pending.narration, self.strip_patterns());
        if description.is_empty() {
            description = bank.default_description().to_string();
        }

        Closed::Emitted(Transaction {
            date,
            description,
            amount: amount.abs(),
            direction,
            balance: pending.balance,
            bank,
        })
    }
}

/// Drive `engine` over every line in `ctx`.
pub fn run_engine<E: LayoutEngine + ?Sized>(
    engine: &E,
    ctx: &ScanContext<'_>,
) -> (Vec<Transaction>, Vec<String>) {
    let mut transactions = Vec::new();
    let mut warnings = Vec::new();
    let mut cursor = Cursor::default();

    let mut collect = |step: Step, transactions: &mut Vec<Transaction>| {
        if let Some(t) = step.emitted {
            transactions.push(t);
        }
        if let Some(w) = step.warning {
            warnings.push(w);
        }
        step.cursor
    };

    for (idx, line) in ctx.lines.iter().enumerate() {
        let kind = if ctx.consumed.contains(&idx) {
            LineKind::Summary
        } else {
            classify_line(engine.rules(), line, ctx.year)
        };
        trace!("{} line {} {:?} -> {:?}", engine.bank(), idx, line, kind);
        cursor = collect(engine.step(cursor, idx, kind, ctx), &mut transactions);
    }
    collect(engine.finish(cursor, ctx), &mut transactions);

    (transactions, warnings)
}

/// Full extraction for one layout: period, summary block, transactions and totals.
pub fn extract_statement<E: LayoutEngine + ?Sized>(
    engine: &E,
    document: &RawDocument,
    context: &ExtractionContext,
) -> Extraction {
    let bank = engine.bank();
    let lines = document.lines.as_slice();
    let windows = context.layouts.windows(bank);
    let mut consumed = HashSet::new();

    let period = engine.period_label().and_then(|re| find_period(lines, re));
    if let Some(period) = &period {
        consumed.extend(period.lines.iter().copied());
    }

    let year = period
        .as_ref()
        .and_then(|p| p.year)
        .filter(|_| engine.infers_year_from_period())
        .unwrap_or(context.fallback_year);

    let scan = scan_summary(
        lines,
        engine.summary_labels(),
        windows.summary_window,
        &|line: &str| engine.is_summary_boundary(line),
    );
    consumed.extend(scan.consumed.iter().copied());

    let ctx = ScanContext {
        lines,
        consumed,
        year,
        windows,
    };
    let (transactions, warnings) = run_engine(engine, &ctx);
    debug!(
        "{}: {} transactions, {} warnings, year {}",
        bank,
        transactions.len(),
        warnings.len(),
        year
    );

    let statement = summarize(
        period.map(|p| p.label).unwrap_or_default(),
        &scan.values,
        transactions,
        context.derive_missing_totals,
    );

    Extraction {
        statement,
        warnings,
    }
}

/// Assemble the summary, deriving absent totals from the transactions when allowed.
pub fn summarize(
    period: String,
    values: &SummaryValues,
    transactions: Vec<Transaction>,
    derive_missing: bool,
) -> StatementSummary {
    let mut statement = StatementSummary {
        period,
        transactions,
        ..Default::default()
    };

    if !derive_missing {
        statement.initial_balance = values.initial_balance.unwrap_or_default();
        statement.closing_balance = values.closing_balance.unwrap_or_default();
        statement.incoming_total = values.incoming_total.unwrap_or_default();
        statement.outgoing_total = values.outgoing_total.unwrap_or_default();
        return statement;
    }

    statement.incoming_total = values
        .incoming_total
        .unwrap_or_else(|| statement.credit_sum());
    statement.outgoing_total = values
        .outgoing_total
        .unwrap_or_else(|| statement.debit_sum());

    statement.initial_balance = values.initial_balance.unwrap_or_else(|| {
        statement
            .transactions
            .iter()
            .find_map(|t| t.balance.map(|b| b - t.signed_amount()))
            .unwrap_or_default()
            .max(Decimal::ZERO)
    });

    statement.closing_balance = values.closing_balance.unwrap_or_else(|| {
        statement
            .transactions
            .iter()
            .rev()
            .find_map(|t| t.balance)
            .unwrap_or_else(|| {
                (statement.initial_balance + statement.incoming_total - statement.outgoing_total)
                    .max(Decimal::ZERO)
            })
    });

    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bank;
    use lazy_static::lazy_static;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    lazy_static! {
        static ref HEADER: Regex = Regex::new(r"^HEADER$").unwrap();
        static ref DATE: Regex =
            Regex::new(r"^(?P<day>\d{2})/(?P<month>\d{2})(?:\s+(?P<rest>.+))?$").unwrap();
        static ref AMOUNT: Regex = Regex::new(
            r"^(?P<sign>[+-])?(?P<amount>[\d.]+,\d{2})(?:\s+(?P<marker>DB|CR))?(?:\s+(?P<balance>[\d.]+,\d{2}))?$"
        )
        .unwrap();
        static ref RULES: Vec<LineRule> = vec![
            LineRule::new(&HEADER, LineAction::Noise),
            LineRule::new(&DATE, LineAction::Date),
            LineRule::new(&AMOUNT, LineAction::Amount),
        ];
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(amount: &str, direction: Direction, balance: Option<&str>) -> Transaction {
        Transaction {
            date: ymd(2025, 11, 1),
            description: "x".to_string(),
            amount: dec(amount),
            direction,
            balance: balance.map(dec),
            bank: Bank::Bca,
        }
    }

    #[test]
    fn test_classify_line_first_match_wins() {
        assert_eq!(classify_line(&RULES, "HEADER", 2025), LineKind::Noise);
        assert_eq!(
            classify_line(&RULES, "25/11 KFC", 2025),
            LineKind::Date {
                date: ymd(2025, 11, 25),
                rest: Some("KFC".to_string())
            }
        );
        assert_eq!(classify_line(&RULES, "just words", 2025), LineKind::Text);
    }

    #[test]
    fn test_invalid_date_falls_through() {
        assert_eq!(classify_line(&RULES, "31/02", 2025), LineKind::Text);
    }

    #[test]
    fn test_amount_direction_sources() {
        assert_eq!(
            classify_line(&RULES, "-50.000,00", 2025),
            LineKind::Amount {
                value: dec("50000.00"),
                direction: Some(Direction::Debit),
                balance: None
            }
        );
        assert_eq!(
            classify_line(&RULES, "1.000,00 CR 2.000,00", 2025),
            LineKind::Amount {
                value: dec("1000.00"),
                direction: Some(Direction::Credit),
                balance: Some(dec("2000.00"))
            }
        );
        assert_eq!(
            classify_line(&RULES, "1.000,00", 2025),
            LineKind::Amount {
                value: dec("1000.00"),
                direction: None,
                balance: None
            }
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(direction_for_marker("DB"), Some(Direction::Debit));
        assert_eq!(direction_for_marker("k"), Some(Direction::Credit));
        assert_eq!(direction_for_marker("XX"), None);
    }

    #[test]
    fn test_summarize_uses_found_values() {
        let values = SummaryValues {
            initial_balance: Some(dec("100")),
            closing_balance: Some(dec("90")),
            incoming_total: Some(dec("0")),
            outgoing_total: Some(dec("10")),
        };
        let statement = summarize(String::new(), &values, vec![], true);
        assert_eq!(statement.initial_balance, dec("100"));
        assert_eq!(statement.closing_balance, dec("90"));
        assert_eq!(statement.outgoing_total, dec("10"));
    }

    #[test]
    fn test_summarize_derives_from_balances() {
        let transactions = vec![
            txn("50", Direction::Debit, Some("950")),
            txn("20", Direction::Credit, Some("970")),
        ];
        let statement = summarize(String::new(), &SummaryValues::default(), transactions, true);
        assert_eq!(statement.incoming_total, dec("20"));
        assert_eq!(statement.outgoing_total, dec("50"));
        assert_eq!(statement.initial_balance, dec("1000"));
        assert_eq!(statement.closing_balance, dec("970"));
        assert!(statement.validate().is_empty());
    }

    #[test]
    fn test_summarize_without_balances() {
        let transactions = vec![txn("16000.00", Direction::Debit, None)];
        let statement = summarize(String::new(), &SummaryValues::default(), transactions, true);
        assert_eq!(statement.initial_balance, Decimal::ZERO);
        assert_eq!(statement.outgoing_total, dec("16000.00"));
        assert_eq!(statement.closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_derived_initial_balance_is_never_negative() {
        // A credit larger than the balance printed beside it
        let transactions = vec![txn("100000.00", Direction::Credit, Some("50000.00"))];
        let statement = summarize(String::new(), &SummaryValues::default(), transactions, true);
        assert_eq!(statement.initial_balance, Decimal::ZERO);
        assert_eq!(statement.closing_balance, dec("50000.00"));
    }

    #[test]
    fn test_summarize_no_derivation() {
        let transactions = vec![txn("5", Direction::Credit, Some("5"))];
        let statement = summarize(String::new(), &SummaryValues::default(), transactions, false);
        assert_eq!(statement.incoming_total, Decimal::ZERO);
        assert_eq!(statement.closing_balance, Decimal::ZERO);
    }
}
