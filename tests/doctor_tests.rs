// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use hisaab::commands::doctor;
use hisaab::models::{MarketRate, Metal, NewAccount};
use hisaab::{config, db, ledger, rates};
use rust_decimal_macros::dec;

#[test]
fn clean_ledger_only_misses_rates() {
    let conn = db::open_in_memory().unwrap();
    ledger::create_account(&conn, &NewAccount::bank("Meezan", dec!(10))).unwrap();
    let issues = doctor::find_issues(&conn).unwrap();
    let kinds: Vec<_> = issues.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(kinds, vec!["missing_rate", "missing_rate"]);

    for metal in Metal::all() {
        rates::append(&conn, &MarketRate::from_per_gram(metal, dec!(100), Utc::now()).unwrap()).unwrap();
    }
    assert!(doctor::find_issues(&conn).unwrap().is_empty());
}

#[test]
fn drifted_and_inverted_balances_are_reported() {
    let conn = db::open_in_memory().unwrap();
    for metal in Metal::all() {
        rates::append(&conn, &MarketRate::from_per_gram(metal, dec!(100), Utc::now()).unwrap()).unwrap();
    }
    ledger::create_account(&conn, &NewAccount::bank("Meezan", dec!(10))).unwrap();
    ledger::create_account(&conn, &NewAccount::credit_card("Visa", dec!(10))).unwrap();
    conn.execute_batch(
        "UPDATE accounts SET current_balance='99' WHERE name='Meezan';
         UPDATE accounts SET current_balance='5' WHERE name='Visa';
         INSERT INTO budgets(category, limit_amount) VALUES ('Legacy', '0');",
    )
    .unwrap();

    let issues = doctor::find_issues(&conn).unwrap();
    let kinds: Vec<_> = issues.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        kinds,
        vec!["bank_balance_drift", "credit_card_positive", "budget_non_positive"]
    );
}

#[test]
fn settings_are_validated_and_typed() {
    let conn = db::open_in_memory().unwrap();
    assert_eq!(config::nisab_standard(&conn).unwrap(), Metal::Gold);
    assert_eq!(config::rate_fetch_attempts(&conn).unwrap(), 3);
    assert_eq!(config::rate_fetch_interval_hours(&conn).unwrap(), 12);
    assert_eq!(config::rate_source_url(&conn).unwrap(), config::DEFAULT_RATE_SOURCE_URL);

    config::set_setting(&conn, config::NISAB_STANDARD, "silver").unwrap();
    assert_eq!(config::nisab_standard(&conn).unwrap(), Metal::Silver);
    assert!(config::set_setting(&conn, config::NISAB_STANDARD, "platinum").is_err());
    assert!(config::set_setting(&conn, config::RATE_FETCH_ATTEMPTS, "0").is_err());
    assert!(config::set_setting(&conn, "base_currency", "PKR").is_err());

    config::set_setting(&conn, config::DEFAULT_ACCOUNT, "Meezan").unwrap();
    assert_eq!(config::default_account(&conn).unwrap().as_deref(), Some("Meezan"));
    config::unset_setting(&conn, config::DEFAULT_ACCOUNT).unwrap();
    assert!(config::default_account(&conn).unwrap().is_none());
    assert_eq!(config::list_settings(&conn).unwrap().len(), 1);
}
