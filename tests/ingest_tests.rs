// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone, Utc};
use hisaab::config;
use hisaab::db;
use hisaab::ingest::{self, IngestOutcome, IngestSummary};
use hisaab::ledger::{self, TxnFilter};
use hisaab::models::{AccountType, NewAccount, TxnType};
use hisaab::parser::{EASYPAISA_APP_ID, JAZZCASH_APP_ID};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 14, 30, 0).unwrap()
}

#[test]
fn parsed_notification_posts_to_provider_account() {
    let mut conn = db::open_in_memory().unwrap();
    let outcome = ingest::ingest_notification(
        &mut conn,
        EASYPAISA_APP_ID,
        "You have sent Rs. 1,500 to Ali via Raast on 01/01/2020",
        now(),
    );
    let IngestOutcome::Posted {
        transaction_id,
        account_id,
    } = outcome
    else {
        panic!("expected a posting, got {outcome:?}");
    };

    let account = ledger::account_by_id(&conn, account_id).unwrap();
    assert_eq!(account.name, "Easypaisa");
    assert_eq!(account.account_type, AccountType::Bank);
    assert_eq!(account.current_balance, dec!(-1500));

    let t = ledger::get_transaction(&conn, transaction_id).unwrap();
    assert_eq!(t.txn_type, TxnType::Debit);
    assert_eq!(t.category, "Easypaisa - Ali");
    assert_eq!(t.timestamp, now(), "posting time is ingestion time");
}

#[test]
fn provider_account_is_reused() {
    let mut conn = db::open_in_memory().unwrap();
    for _ in 0..2 {
        ingest::ingest_notification(&mut conn, JAZZCASH_APP_ID, "received Rs. 100", now());
    }
    let accounts = ledger::query_accounts(&conn).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].current_balance, dec!(200));
}

#[test]
fn default_account_setting_wins_when_present() {
    let mut conn = db::open_in_memory().unwrap();
    let id = ledger::create_account(&conn, &NewAccount::bank("Meezan", dec!(5000))).unwrap();
    config::set_setting(&conn, config::DEFAULT_ACCOUNT, "Meezan").unwrap();

    let outcome = ingest::ingest_notification(&mut conn, JAZZCASH_APP_ID, "You received Rs. 250 from Zara", now());
    assert!(matches!(outcome, IngestOutcome::Posted { account_id, .. } if account_id == id));
    assert_eq!(ledger::account_by_id(&conn, id).unwrap().current_balance, dec!(5250));

    // Pointing at a deleted account falls back to the provider account.
    ledger::delete_account(&mut conn, "Meezan").unwrap();
    let outcome = ingest::ingest_notification(&mut conn, JAZZCASH_APP_ID, "You received Rs. 250 from Zara", now());
    assert!(matches!(outcome, IngestOutcome::Posted { .. }));
    assert!(ledger::find_account(&conn, "JazzCash").unwrap().is_some());
}

#[test]
fn unmatched_notifications_post_nothing() {
    let mut conn = db::open_in_memory().unwrap();
    assert_eq!(
        ingest::ingest_notification(&mut conn, "com.android.chrome", "sent Rs. 5 to A via B", now()),
        IngestOutcome::Ignored
    );
    assert_eq!(
        ingest::ingest_notification(&mut conn, EASYPAISA_APP_ID, "Your OTP is 1234", now()),
        IngestOutcome::Ignored
    );
    assert!(ledger::query_accounts(&conn).unwrap().is_empty());
    assert!(ledger::query_transactions(&conn, &TxnFilter::default()).unwrap().is_empty());
}

#[test]
fn ledger_failure_is_dropped_not_raised() {
    let mut conn = db::open_in_memory().unwrap();
    conn.execute_batch("DROP TABLE transactions").unwrap();
    let outcome = ingest::ingest_notification(&mut conn, EASYPAISA_APP_ID, "received Rs. 10", now());
    assert_eq!(outcome, IngestOutcome::Dropped);
}

#[test]
fn csv_batch_counts_each_row_independently() {
    let mut conn = db::open_in_memory().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "source,text").unwrap();
    writeln!(file, "{},\"sent Rs. 1,000 to Ali via Raast\"", EASYPAISA_APP_ID).unwrap();
    writeln!(file, "{},\"You have received PKR 2,500.00\"", JAZZCASH_APP_ID).unwrap();
    writeln!(file, "com.whatsapp,\"sent Rs. 10 to Bob via chat\"").unwrap();
    writeln!(file, "{}", EASYPAISA_APP_ID).unwrap();
    file.flush().unwrap();

    let summary = ingest::ingest_csv(&mut conn, file.path(), now()).unwrap();
    assert_eq!(
        summary,
        IngestSummary {
            posted: 2,
            ignored: 1,
            dropped: 0,
            malformed: 1,
        }
    );
    assert_eq!(ledger::query_transactions(&conn, &TxnFilter::default()).unwrap().len(), 2);
}

#[test]
fn balance_overflow_drops_the_posting_and_keeps_the_ledger() {
    let mut conn = db::open_in_memory().unwrap();
    let text = "You have sent Rs. 79,228,162,514,264,337,593,543,950,335 to Ali via Easypaisa";
    let first = ingest::ingest_notification(&mut conn, EASYPAISA_APP_ID, text, now());
    assert!(matches!(first, IngestOutcome::Posted { .. }));

    let second = ingest::ingest_notification(&mut conn, EASYPAISA_APP_ID, text, now());
    assert_eq!(second, IngestOutcome::Dropped);

    let account = ledger::account_by_name(&conn, "Easypaisa").unwrap();
    assert_eq!(account.current_balance, -Decimal::MAX);
    assert_eq!(ledger::query_transactions(&conn, &TxnFilter::default()).unwrap().len(), 1);
}
