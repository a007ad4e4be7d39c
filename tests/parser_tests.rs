// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hisaab::models::TxnType;
use hisaab::parser::{self, EASYPAISA_APP_ID, JAZZCASH_APP_ID};
use rust_decimal_macros::dec;

#[test]
fn outbound_transfer_is_a_debit_to_the_recipient() {
    let p = parser::parse(EASYPAISA_APP_ID, "You have sent Rs. 1,500 to Ali Khan via Raast")
        .expect("should match");
    assert_eq!(p.txn_type, TxnType::Debit);
    assert_eq!(p.amount, dec!(1500));
    assert_eq!(p.category, "Easypaisa - Ali Khan");
    assert_eq!(p.provider, "Easypaisa");
}

#[test]
fn outbound_transfer_keeps_fraction_and_separators() {
    let p = parser::parse(
        JAZZCASH_APP_ID,
        "Dear customer, you sent PKR 12,500.50 to Sara via JazzCash app. Ref 88123",
    )
    .expect("should match");
    assert_eq!(p.amount, dec!(12500.50));
    assert_eq!(p.category, "JazzCash - Sara");
}

#[test]
fn currency_marker_is_optional_and_case_is_ignored() {
    let p = parser::parse(EASYPAISA_APP_ID, "SENT 250 TO BILAL VIA IBFT").expect("should match");
    assert_eq!(p.amount, dec!(250));
    assert_eq!(p.category, "Easypaisa - BILAL");
}

#[test]
fn blank_recipient_falls_back_to_provider_name() {
    let p = parser::parse(EASYPAISA_APP_ID, "sent Rs. 100 to   via Raast").expect("should match");
    assert_eq!(p.category, "Easypaisa");
    assert_eq!(p.txn_type, TxnType::Debit);
}

#[test]
fn received_text_is_a_credit_with_first_marked_amount() {
    let p = parser::parse(
        JAZZCASH_APP_ID,
        "You have received Rs. 2,000.00 from Ahmed. New balance Rs. 9,999.00",
    )
    .expect("should match");
    assert_eq!(p.txn_type, TxnType::Credit);
    assert_eq!(p.amount, dec!(2000.00));
    assert_eq!(p.category, "JazzCash");
}

#[test]
fn unknown_source_is_rejected_without_reading_text() {
    assert!(parser::parse("com.whatsapp", "You have sent Rs. 1,500 to Ali via Raast").is_none());
    assert!(parser::parse("", "received Rs. 10").is_none());
}

#[test]
fn unrelated_text_is_no_match() {
    for text in [
        "Your OTP is 482910. Do not share it.",
        "Bundle activated: 10GB for Rs. 500",
        "",
        "   ",
    ] {
        assert!(parser::parse(EASYPAISA_APP_ID, text).is_none(), "{text:?}");
    }
}

#[test]
fn non_positive_or_missing_amount_never_matches() {
    assert!(parser::parse(EASYPAISA_APP_ID, "sent Rs. 0 to Ali via Raast").is_none());
    assert!(parser::parse(EASYPAISA_APP_ID, "sent Rs. 0.00 to Ali via Raast").is_none());
    assert!(parser::parse(EASYPAISA_APP_ID, "You received a new message").is_none());
    assert!(parser::parse(JAZZCASH_APP_ID, "received Rs. 0").is_none());
}

#[test]
fn hostile_input_does_not_panic() {
    let long = "sent ".repeat(5_000) + "Rs. 9" + &",9".repeat(2_000);
    let _ = parser::parse(EASYPAISA_APP_ID, &long);
    let _ = parser::parse(JAZZCASH_APP_ID, "received Rs. 99999999999999999999999999999999999");
    let _ = parser::parse(JAZZCASH_APP_ID, "received ₨ ٣٤٥ 🙂");
}

#[test]
fn provider_table_lists_both_apps() {
    let ids: Vec<_> = parser::providers().iter().map(|p| p.app_id).collect();
    assert_eq!(ids, vec![EASYPAISA_APP_ID, JAZZCASH_APP_ID]);
    assert_eq!(
        parser::provider_for(JAZZCASH_APP_ID).map(|p| p.display_name),
        Some("JazzCash")
    );
}

#[test]
fn recipient_is_trimmed_but_not_reflowed() {
    let p = parser::parse(EASYPAISA_APP_ID, "You have sent Rs. 90 to  Ali  Khan via Raast")
        .expect("should match");
    assert_eq!(p.category, "Easypaisa - Ali  Khan");
}
