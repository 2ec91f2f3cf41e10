//! Statement data models shared by every layout engine.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Issuing bank of a statement layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bank {
    /// PT Bank Central Asia e-statement.
    Bca,
    /// Bank Mandiri (Livin') e-statement.
    Mandiri,
    /// Bank Negara Indonesia e-statement.
    Bni,
    /// blu by BCA Digital.
    Blu,
}

impl Bank {
    /// Canonical tag used in serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            Bank::Bca => "BCA",
            Bank::Mandiri => "MANDIRI",
            Bank::Bni => "BNI",
            Bank::Blu => "BLU",
        }
    }

    /// Label substituted when a transaction has no narration.
    pub fn default_description(&self) -> &'static str {
        match self {
            Bank::Bca => "BCA Transaction",
            Bank::Mandiri => "Mandiri Transaction",
            Bank::Bni => "BNI Transaction",
            Bank::Blu => "BLU Transaction",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Whether a transaction increases or decreases the account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money coming in.
    Credit,
    /// Money going out.
    Debit,
}

impl Direction {
    /// Direction implied by the sign of a normalized amount.
    pub fn from_signed(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Direction::Debit
        } else {
            Direction::Credit
        }
    }

    /// Apply the direction to a non-negative amount.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Direction::Credit => amount,
            Direction::Debit => -amount,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Credit => f.write_str("credit"),
            Direction::Debit => f.write_str("debit"),
        }
    }
}

/// A single dated, signed, described movement on the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date.
    pub date: NaiveDate,

    /// Narration, whitespace-collapsed.
    pub description: String,

    /// Absolute amount. The sign lives in `direction`.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Credit or debit.
    pub direction: Direction,

    /// Running balance, when the layout prints one next to the amount.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub balance: Option<Decimal>,

    /// Bank whose layout produced this record.
    pub bank: Bank,
}

impl Transaction {
    /// Amount with the direction applied (debits negative).
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// Structured result for one source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Free-text label of the covered date range. May be empty.
    pub period: String,

    /// Balance at the start of the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,

    /// Balance at the end of the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,

    /// Sum of credits over the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub incoming_total: Decimal,

    /// Sum of debits over the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub outgoing_total: Decimal,

    /// Transactions in document order.
    pub transactions: Vec<Transaction>,
}

impl StatementSummary {
    /// Bank of the transactions, if any were extracted.
    pub fn bank(&self) -> Option<Bank> {
        self.transactions.first().map(|t| t.bank)
    }

    /// Sum of credit amounts in the transaction list.
    pub fn credit_sum(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.direction == Direction::Credit)
            .map(|t| t.amount)
            .sum()
    }

    /// Sum of debit amounts in the transaction list.
    pub fn debit_sum(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.direction == Direction::Debit)
            .map(|t| t.amount)
            .sum()
    }

    /// Check the statement for internal inconsistencies and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = Decimal::new(1, 2);

        if self.transactions.is_empty() {
            issues.push("No transactions".to_string());
        }

        if let Some(bank) = self.bank() {
            if self.transactions.iter().any(|t| t.bank != bank) {
                issues.push("Transactions from more than one bank".to_string());
            }
        }

        if self.transactions.iter().any(|t| t.amount.is_sign_negative()) {
            issues.push("Negative transaction amount".to_string());
        }

        let expected_closing = self.initial_balance + self.incoming_total - self.outgoing_total;
        if (expected_closing - self.closing_balance).abs() > tolerance {
            issues.push(format!(
                "Closing balance ({}) differs from initial + incoming - outgoing ({})",
                self.closing_balance, expected_closing
            ));
        }

        let credits = self.credit_sum();
        if (credits - self.incoming_total).abs() > tolerance {
            issues.push(format!(
                "Credit sum ({}) differs from incoming total ({})",
                credits, self.incoming_total
            ));
        }

        let debits = self.debit_sum();
        if (debits - self.outgoing_total).abs() > tolerance {
            issues.push(format!(
                "Debit sum ({}) differs from outgoing total ({})",
                debits, self.outgoing_total
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn txn(amount: &str, direction: Direction) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            description: "Test".to_string(),
            amount: dec(amount),
            direction,
            balance: None,
            bank: Bank::Mandiri,
        }
    }

    #[test]
    fn test_bank_tags() {
        assert_eq!(Bank::Bca.tag(), "BCA");
        assert_eq!(Bank::Mandiri.to_string(), "MANDIRI");
        assert_eq!(Bank::Blu.default_description(), "BLU Transaction");
    }

    #[test]
    fn test_direction_from_signed() {
        assert_eq!(Direction::from_signed(dec("-50000.00")), Direction::Debit);
        assert_eq!(Direction::from_signed(dec("10.00")), Direction::Credit);
        assert_eq!(Direction::from_signed(Decimal::ZERO), Direction::Credit);
        assert_eq!(Direction::Debit.signed(dec("5")), dec("-5"));
    }

    #[test]
    fn test_serialized_shape() {
        let t = txn("50000.00", Direction::Debit);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["date"], "2025-11-01");
        assert_eq!(json["direction"], "debit");
        assert_eq!(json["bank"], "MANDIRI");
        assert_eq!(json["amount"], 50000.0);
        assert!(json["balance"].is_null());
    }

    #[test]
    fn test_validate_consistent_statement() {
        let statement = StatementSummary {
            period: "November 2025".to_string(),
            initial_balance: dec("100000.00"),
            closing_balance: dec("150000.00"),
            incoming_total: dec("100000.00"),
            outgoing_total: dec("50000.00"),
            transactions: vec![
                txn("100000.00", Direction::Credit),
                txn("50000.00", Direction::Debit),
            ],
        };
        assert!(statement.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_mismatch() {
        let statement = StatementSummary {
            closing_balance: dec("1.00"),
            transactions: vec![txn("10.00", Direction::Credit)],
            ..Default::default()
        };
        let issues = statement.validate();
        assert!(issues.iter().any(|i| i.starts_with("Closing balance")));
        assert!(issues.iter().any(|i| i.starts_with("Credit sum")));
    }
}
