//! End-to-end extraction through the public parser facade.

use chrono::NaiveDate;
use mutasi_core::{
    normalize_amount, Bank, Direction, DocumentParser, RawDocument, StatementParser,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

const BCA_CREATOR: &str = "E-statement Batch Generator (PT. Bank Central Asia, Tbk)";
const MANDIRI_CREATOR: &str = "PT. Bank Mandiri (Persero) Tbk";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn document(creator: &str, text: &str) -> RawDocument {
    RawDocument::from_text(text).with_metadata("creator", creator)
}

fn parser() -> StatementParser {
    StatementParser::new().with_statement_year(2025)
}

#[test]
fn bca_keyword_debit() {
    let doc = document(BCA_CREATOR, "25/11\nTRANSAKSI DEBIT KFC\n16,000.00\nTGL: 25/11");
    let result = parser().parse(&doc).unwrap();

    assert_eq!(result.bank, Bank::Bca);
    let txns = &result.statement.transactions;
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 11, 25).unwrap());
    assert!(txns[0].description.contains("KFC"));
    assert_eq!(txns[0].amount, dec("16000.00"));
    assert_eq!(txns[0].direction, Direction::Debit);
}

#[test]
fn bca_uses_injected_year() {
    let doc = document(BCA_CREATOR, "25/11\nTRANSAKSI DEBIT KFC\n16,000.00");
    let result = StatementParser::new()
        .with_statement_year(2019)
        .parse(&doc)
        .unwrap();
    assert_eq!(
        result.statement.transactions[0].date,
        NaiveDate::from_ymd_opt(2019, 11, 25).unwrap()
    );
}

#[test]
fn mandiri_signed_amount() {
    let doc = document(MANDIRI_CREATOR, "Transfer to Bob\n-50.000,00\n01 Nov 2025");
    let result = parser().parse(&doc).unwrap();

    assert_eq!(result.bank, Bank::Mandiri);
    let txns = &result.statement.transactions;
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    assert!(txns[0].description.contains("Transfer to Bob"));
    assert_eq!(txns[0].amount, dec("50000.00"));
    assert_eq!(txns[0].direction, Direction::Debit);
}

#[test]
fn unsupported_creator() {
    let doc = document("Unknown Bank", "Some text");
    let err = parser().parse(&doc).unwrap_err();
    assert!(err.to_string().contains("Unknown Bank"));
}

#[test]
fn bni_statement_with_summary() {
    let text = "Periode : 01 Nov 2025 - 30 Nov 2025\n\
                Saldo Awal\n\
                Total Kredit\n\
                Total Debet\n\
                Saldo Akhir\n\
                1234567890\n\
                IDR\n\
                1.000.000,00\n\
                500.000,00\n\
                100.000,00\n\
                1.400.000,00\n\
                02 Nov 2025 10:15:23\n\
                SETOR TUNAI\n\
                500.000,00 K 1.500.000,00\n\
                03 Nov 2025\n\
                BIAYA ADMIN | 14:00\n\
                100.000,00 D 1.400.000,00";
    let doc = document("PT Bank Negara Indonesia (Persero) Tbk", text);
    let result = parser().parse(&doc).unwrap();

    assert_eq!(result.bank, Bank::Bni);
    assert!(result.warnings.is_empty());
    let statement = &result.statement;
    assert_eq!(statement.closing_balance, dec("1400000.00"));
    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(statement.transactions[0].direction, Direction::Credit);
    assert_eq!(statement.transactions[1].direction, Direction::Debit);
}

#[test]
fn blu_statement_by_brand_marker() {
    let text = "blu by BCA Digital\n\
                Saldo Awal\n\
                Rp 1.000.000\n\
                Total Uang Masuk\n\
                Rp 0\n\
                Total Uang Keluar\n\
                Rp 50.000\n\
                Saldo Akhir\n\
                Rp 950.000\n\
                01 Nov 2025\n\
                Kirim Uang\n\
                -Rp 50.000\n\
                PT Bank Digital BCA terdaftar dan diawasi oleh OJK";
    let result = parser().parse(&RawDocument::from_text(text)).unwrap();

    assert_eq!(result.bank, Bank::Blu);
    assert!(result.warnings.is_empty());
    let txns = &result.statement.transactions;
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].description, "Kirim Uang");
    assert_eq!(txns[0].amount, dec("50000"));
}

#[test]
fn amounts_are_never_negative_and_order_is_kept() {
    let text = "01/11\n\
                TRSF E-BANKING CR\n\
                500,000.00 CR 1,500,000.00\n\
                02/11\n\
                BIAYA ADM\n\
                10,000.00 DB 1,490,000.00\n\
                03/11 TARIKAN ATM 100,000.00 DB 1,390,000.00";
    let result = parser().parse(&document(BCA_CREATOR, text)).unwrap();
    let txns = &result.statement.transactions;

    assert_eq!(txns.len(), 3);
    assert!(txns.iter().all(|t| !t.amount.is_sign_negative()));
    let days: Vec<u32> = txns.iter().map(|t| chrono::Datelike::day(&t.date)).collect();
    assert_eq!(days, vec![1, 2, 3]);
    assert_eq!(txns[2].balance, Some(dec("1390000.00")));
}

#[test]
fn parsing_is_idempotent() {
    let doc = document(MANDIRI_CREATOR, "Biaya Admin\n-2.500,00\n30 Nov 2025\nBunga\n+1.000,00\n30 Nov 2025");
    let first = parser().parse(&doc).unwrap();
    let second = parser().parse(&doc).unwrap();
    assert_eq!(first.statement, second.statement);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn statement_serializes_with_lowercase_direction() {
    let doc = document(MANDIRI_CREATOR, "Transfer to Bob\n-50.000,00\n01 Nov 2025");
    let result = parser().parse(&doc).unwrap();
    let json = serde_json::to_value(&result.statement).unwrap();
    assert_eq!(json["transactions"][0]["direction"], "debit");
    assert_eq!(json["transactions"][0]["bank"], "MANDIRI");
}

#[test]
fn normalizer_cases() {
    assert_eq!(normalize_amount("1,000.00"), dec("1000.00"));
    assert_eq!(normalize_amount("1.000,00"), dec("1000.00"));
    assert_eq!(normalize_amount("-50.000,00"), dec("-50000.00"));
    assert_eq!(normalize_amount("abc"), Decimal::ZERO);
}
