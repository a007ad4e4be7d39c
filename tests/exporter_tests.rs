// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use hisaab::models::{MarketRate, Metal, NewAccount, NewTransaction, TxnType};
use hisaab::zakat::{self, ZakatInputs};
use hisaab::{cli, commands::exporter, db, ledger, rates};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use serde_json::json;
use tempfile::tempdir;

fn export(conn: &Connection, what: &str, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches =
        cli.get_matches_from(["hisaab", "export", what, "--format", format, "--out", out]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let mut conn = db::open_in_memory().unwrap();
    let id = ledger::create_account(&conn, &NewAccount::bank("Checking", dec!(100))).unwrap();
    ledger::insert_transaction(
        &mut conn,
        &NewTransaction {
            amount: dec!(12.34),
            txn_type: TxnType::Debit,
            category: "Groceries".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap(),
            account_id: id,
        },
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();
    export(&conn, "transactions", "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": "1",
                "timestamp": "2025-01-02T08:00:00.000Z",
                "account": "Checking",
                "type": "DEBIT",
                "amount": "12.34",
                "category": "Groceries"
            }
        ])
    );
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = db::open_in_memory().unwrap();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();
    assert!(export(&conn, "transactions", "xml", &out_str).is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_zakat_history_as_csv() {
    let conn = db::open_in_memory().unwrap();
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    rates::append(&conn, &MarketRate::from_per_gram(Metal::Gold, dec!(20000), at).unwrap()).unwrap();
    let inputs = ZakatInputs {
        cash_in_hand: "2000000".into(),
        ..ZakatInputs::default()
    };
    zakat::run(&conn, &inputs, at).unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("zakat.csv");
    let out_str = out_path.to_string_lossy().to_string();
    export(&conn, "zakat-history", "csv", &out_str).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["calculated_at", "total_assets", "total_debts", "nisab_threshold", "payable_amount"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "2025-03-01T00:00:00.000Z");
    assert_eq!(rows[0][4].parse::<rust_decimal::Decimal>().unwrap(), dec!(50000));
}
