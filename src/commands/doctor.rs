// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::Snapshot;
use crate::models::{Metal, TxnType};
use crate::rates;
use crate::utils::{fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// (issue, detail) pairs describing ledger inconsistencies.
pub fn find_issues(conn: &Connection) -> Result<Vec<(String, String)>> {
    let snapshot = Snapshot::load(conn)?;
    let mut issues = Vec::new();

    // 1) Bank balances that drifted from their postings
    let mut net: HashMap<i64, Option<Decimal>> = HashMap::new();
    for t in &snapshot.transactions {
        let signed = match t.txn_type {
            TxnType::Credit => t.amount,
            TxnType::Debit => -t.amount,
        };
        let slot = net.entry(t.account_id).or_insert(Some(Decimal::ZERO));
        *slot = slot.and_then(|d| d.checked_add(signed));
    }
    for a in &snapshot.accounts {
        if a.account_type.is_bank() {
            let postings = net.get(&a.id).copied().unwrap_or(Some(Decimal::ZERO));
            let Some(expected) = postings.and_then(|p| a.initial_balance.checked_add(p)) else {
                issues.push((
                    "bank_balance_overflow".into(),
                    format!("{}: postings exceed the representable range", a.name),
                ));
                continue;
            };
            if expected != a.current_balance {
                issues.push((
                    "bank_balance_drift".into(),
                    format!(
                        "{}: stored {}, postings give {}",
                        a.name,
                        fmt_money(&a.current_balance),
                        fmt_money(&expected)
                    ),
                ));
            }
        } else if a.current_balance > Decimal::ZERO {
            issues.push((
                "credit_card_positive".into(),
                format!("{}: {}", a.name, fmt_money(&a.current_balance)),
            ));
        }
    }

    // 2) Budgets that cannot be consumed meaningfully
    for b in &snapshot.budgets {
        if b.limit_amount <= Decimal::ZERO {
            issues.push((
                "budget_non_positive".into(),
                format!("{}: {}", b.category, fmt_money(&b.limit_amount)),
            ));
        }
    }

    // 3) Zakat cannot be judged without rates
    for metal in Metal::all() {
        if rates::latest(conn, metal)?.is_none() {
            issues.push(("missing_rate".into(), metal.to_string()));
        }
    }
    Ok(issues)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let issues = find_issues(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
