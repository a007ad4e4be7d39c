// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use hisaab::aggregate::{self, Snapshot};
use hisaab::models::{NewAccount, NewTransaction, TxnType};
use hisaab::utils::month_bounds;
use hisaab::{cli, commands::budgets, db, ledger};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["hisaab", "budget"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("budget", m)) => budgets::handle(conn, m),
        _ => panic!("no budget subcommand"),
    }
}

#[test]
fn budget_set_replaces_previous_limit() {
    let conn = db::open_in_memory().unwrap();
    run(&conn, &["set", "--category", "Dining", "--limit", "5,000"]).unwrap();
    run(&conn, &["set", "--category", "Dining", "--limit", "6000", "--icon", "🍽"]).unwrap();
    let budgets = ledger::query_budgets(&conn).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit_amount, dec!(6000));
    assert_eq!(budgets[0].icon.as_deref(), Some("🍽"));
}

#[test]
fn non_positive_or_malformed_limit_is_rejected() {
    let conn = db::open_in_memory().unwrap();
    assert!(run(&conn, &["set", "--category", "Dining", "--limit", "0"]).is_err());
    assert!(run(&conn, &["set", "--category", "Dining", "--limit", "lots"]).is_err());
    assert!(ledger::query_budgets(&conn).unwrap().is_empty());
    assert!(run(&conn, &["rm", "--category", "Dining"]).is_err());
}

#[test]
fn month_window_drives_budget_spend() {
    let mut conn = db::open_in_memory().unwrap();
    let id = ledger::create_account(&conn, &NewAccount::bank("Cash", dec!(1000))).unwrap();
    run(&conn, &["set", "--category", "Dining", "--limit", "50.00"]).unwrap();
    // Mid-month in every timezone.
    for (day, amount) in [(10, dec!(9)), (20, dec!(16))] {
        ledger::insert_transaction(
            &mut conn,
            &NewTransaction {
                amount,
                txn_type: TxnType::Debit,
                category: "Dining".into(),
                timestamp: Utc.with_ymd_and_hms(2025, 8, day, 12, 0, 0).unwrap(),
                account_id: id,
            },
        )
        .unwrap();
    }
    let (start, end) = month_bounds(2025, 8).unwrap();
    let progress = aggregate::budget_progress(&Snapshot::load(&conn).unwrap(), start, end).unwrap();
    assert_eq!(format!("{:.2}", progress[0].spent), "25.00");
    assert_eq!(progress[0].progress, dec!(0.5));

    let (start, end) = month_bounds(2025, 9).unwrap();
    let progress = aggregate::budget_progress(&Snapshot::load(&conn).unwrap(), start, end).unwrap();
    assert_eq!(progress[0].spent, dec!(0));

    run(&conn, &["progress", "--month", "2025-08", "--json"]).unwrap();
}
