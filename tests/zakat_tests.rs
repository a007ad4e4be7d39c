// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone, Utc};
use hisaab::commands::zakat::run_wizard;
use hisaab::db;
use hisaab::error::HisaabError;
use hisaab::ledger;
use hisaab::models::{MarketRate, Metal, NewAccount, WeightUnit};
use hisaab::rates;
use hisaab::zakat::{self, ZakatInputs, ZakatResult, ZakatStep, ZakatVerdict, ZakatWizard};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Cursor;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 10, 0, 0).unwrap()
}

fn gold_at(per_gram: Decimal) -> MarketRate {
    MarketRate::from_per_gram(Metal::Gold, per_gram, now()).unwrap()
}

fn inputs(cash: &str, jewelry: &str, debts: &str) -> ZakatInputs {
    ZakatInputs {
        metal: Metal::Gold,
        cash_in_hand: cash.into(),
        jewelry_weight: jewelry.into(),
        jewelry_unit: WeightUnit::Tola,
        other_assets: String::new(),
        debts: debts.into(),
    }
}

fn assessed(v: ZakatVerdict) -> ZakatResult {
    match v {
        ZakatVerdict::Assessed(r) => r,
        other => panic!("expected an assessment, got {other:?}"),
    }
}

#[test]
fn below_nisab_owes_nothing() {
    let r = assessed(zakat::calculate(
        &inputs("100,000", "5", "10000"),
        Some(&gold_at(dec!(20000))),
        Decimal::ZERO,
    ));
    assert_eq!(r.weight_in_grams, dec!(58.32));
    assert_eq!(r.jewelry_value, dec!(1166400));
    assert_eq!(r.total_assets, dec!(1266400));
    assert_eq!(r.net_wealth, dec!(1256400));
    assert_eq!(r.nisab_threshold, dec!(1749600));
    assert!(!r.is_wajib);
    assert_eq!(r.payable_amount, Decimal::ZERO);
}

#[test]
fn exactly_at_nisab_is_due() {
    let rate = gold_at(dec!(40000));
    // jewelry 2,332,800 + cash 1,176,400 - debts 10,000 = 3,499,200 = nisab
    let r = assessed(zakat::calculate(
        &inputs("1176400", "5", "10000"),
        Some(&rate),
        Decimal::ZERO,
    ));
    assert_eq!(r.nisab_threshold, dec!(3499200));
    assert_eq!(r.net_wealth, r.nisab_threshold);
    assert!(r.is_wajib);
    assert_eq!(r.payable_amount, dec!(87480));

    let below = assessed(zakat::calculate(
        &inputs("1176399.99", "5", "10000"),
        Some(&rate),
        Decimal::ZERO,
    ));
    assert!(!below.is_wajib);
}

#[test]
fn bank_balance_and_other_assets_count() {
    let mut i = inputs("", "", "");
    i.other_assets = "500000".into();
    let r = assessed(zakat::calculate(&i, Some(&gold_at(dec!(20000))), dec!(1500000)));
    assert_eq!(r.total_assets, dec!(2000000));
    assert!(r.is_wajib);
    assert_eq!(r.payable_amount, dec!(50000));
}

#[test]
fn silver_standard_and_gram_weights() {
    let silver = MarketRate::from_per_gram(Metal::Silver, dec!(250), now()).unwrap();
    let i = ZakatInputs {
        metal: Metal::Silver,
        cash_in_hand: "100000".into(),
        jewelry_weight: "100".into(),
        jewelry_unit: WeightUnit::Gram,
        other_assets: String::new(),
        debts: String::new(),
    };
    let r = assessed(zakat::calculate(&i, Some(&silver), Decimal::ZERO));
    assert_eq!(r.nisab_threshold, dec!(153090));
    assert_eq!(r.weight_in_grams, dec!(100));
    assert_eq!(r.total_assets, dec!(125000));
    assert!(!r.is_wajib);
}

#[test]
fn garbage_entries_read_as_zero() {
    let r = assessed(zakat::calculate(
        &inputs("abc", " ", "??"),
        Some(&gold_at(dec!(20000))),
        Decimal::ZERO,
    ));
    assert_eq!(r.total_assets, Decimal::ZERO);
    assert_eq!(r.total_debts, Decimal::ZERO);
    assert!(!r.is_wajib);
}

#[test]
fn missing_rate_is_its_own_outcome() {
    let v = zakat::calculate(&inputs("1000000", "", ""), None, Decimal::ZERO);
    assert_eq!(v, ZakatVerdict::NoRateAvailable { metal: Metal::Gold });

    // A rate for the other metal does not count.
    let silver = MarketRate::from_per_gram(Metal::Silver, dec!(250), now()).unwrap();
    let v = zakat::calculate(&inputs("1000000", "", ""), Some(&silver), Decimal::ZERO);
    assert!(matches!(v, ZakatVerdict::NoRateAvailable { .. }));
}

fn seeded() -> Connection {
    let conn = db::open_in_memory().unwrap();
    rates::append(&conn, &gold_at(dec!(20000))).unwrap();
    conn
}

#[test]
fn run_reads_bank_total_and_records_snapshot() {
    let conn = seeded();
    ledger::create_account(&conn, &NewAccount::bank("Meezan", dec!(2000000))).unwrap();
    ledger::create_account(&conn, &NewAccount::credit_card("Visa", dec!(9999))).unwrap();

    let r = assessed(zakat::run(&conn, &inputs("", "", "0"), now()).unwrap());
    assert_eq!(r.bank_balance, dec!(2000000));
    assert!(r.is_wajib);
    assert_eq!(r.payable_amount, dec!(50000));

    let hist = zakat::history(&conn).unwrap();
    assert_eq!(hist.len(), 1);
    assert_eq!(hist[0].calculated_at, now());
    assert_eq!(hist[0].total_assets, dec!(2000000));
    assert_eq!(hist[0].nisab_threshold, dec!(1749600));
    assert_eq!(hist[0].payable_amount, dec!(50000));
}

#[test]
fn every_run_appends_and_missing_rate_records_nothing() {
    let conn = seeded();
    zakat::run(&conn, &inputs("1", "", ""), now()).unwrap();
    zakat::run(&conn, &inputs("1", "", ""), now()).unwrap();
    assert_eq!(zakat::history(&conn).unwrap().len(), 2);

    let mut silver = inputs("1", "", "");
    silver.metal = Metal::Silver;
    let v = zakat::run(&conn, &silver, now()).unwrap();
    assert!(matches!(v, ZakatVerdict::NoRateAvailable { metal: Metal::Silver }));
    assert_eq!(zakat::history(&conn).unwrap().len(), 2);
}

#[test]
fn wizard_moves_forward_and_back_without_losing_inputs() {
    let conn = seeded();
    let mut w = ZakatWizard::new(ZakatInputs::default());
    assert_eq!(w.step(), ZakatStep::Nisab);
    assert!(w.back().is_err());

    assert_eq!(w.advance(&conn, now()).unwrap(), ZakatStep::Assets);
    w.inputs.cash_in_hand = "100000".into();
    w.inputs.jewelry_weight = "5".into();
    assert_eq!(w.advance(&conn, now()).unwrap(), ZakatStep::Debts);
    w.inputs.debts = "10000".into();

    assert_eq!(w.back().unwrap(), ZakatStep::Assets);
    assert_eq!(w.inputs.cash_in_hand, "100000");
    assert!(matches!(
        w.go_to(ZakatStep::Result),
        Err(HisaabError::InvalidStep { .. })
    ));

    w.advance(&conn, now()).unwrap();
    assert_eq!(w.advance(&conn, now()).unwrap(), ZakatStep::Result);
    let r = match w.verdict() {
        Some(ZakatVerdict::Assessed(r)) => r.clone(),
        other => panic!("no verdict: {other:?}"),
    };
    assert_eq!(r.net_wealth, dec!(1256400));
    assert!(w.advance(&conn, now()).is_err(), "result is terminal");

    w.go_to(ZakatStep::Nisab).unwrap();
    assert!(w.verdict().is_none());
    assert_eq!(w.inputs.debts, "10000");
}

#[test]
fn scripted_wizard_session_with_back() {
    let conn = seeded();
    // nisab, cash, then back to nisab; keep both answers on the way forward.
    let script = "gold\n100000\nback\n\n\n5\ntola\n\n10000\n\n";
    let mut input = Cursor::new(script.as_bytes());
    let mut out = Vec::new();
    let verdict = run_wizard(&conn, &mut input, &mut out).unwrap();

    let r = assessed(verdict.expect("reached the result step"));
    assert_eq!(r.total_assets, dec!(1266400));
    assert_eq!(r.total_debts, dec!(10000));
    assert!(!r.is_wajib);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Step 3/3"));
    assert_eq!(zakat::history(&conn).unwrap().len(), 1);
}

#[test]
fn oversized_jewelry_is_out_of_range_and_not_recorded() {
    let conn = seeded();
    let mut i = inputs("", "", "");
    i.jewelry_weight = "79228162514264337593543950335".into();
    let v = zakat::run(&conn, &i, now()).unwrap();
    assert_eq!(v, ZakatVerdict::OutOfRange { metal: Metal::Gold });
    assert!(zakat::history(&conn).unwrap().is_empty());
}

#[test]
fn negative_entries_count_as_entered() {
    let mut i = inputs("100000", "", "");
    i.other_assets = "-500".into();
    let r = assessed(zakat::calculate(&i, Some(&gold_at(dec!(20000))), Decimal::ZERO));
    assert_eq!(r.total_assets, dec!(99500));
}
