// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{self, Snapshot};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use super::month_window;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let snapshot = Snapshot::load(conn)?;
    match m.subcommand() {
        Some(("balance", sub)) => balance(&snapshot, sub)?,
        Some(("spend-by-category", sub)) => spend_by_category(&snapshot, sub)?,
        Some(("safe-to-spend", sub)) => safe_to_spend(&snapshot, sub)?,
        Some(("cash-flow", sub)) => cash_flow(&snapshot, sub)?,
        _ => {}
    }
    Ok(())
}

fn balance(snapshot: &Snapshot, sub: &clap::ArgMatches) -> Result<()> {
    let net = aggregate::net_balance(snapshot)?;
    let payload = json!({
        "accounts": snapshot.accounts.iter().map(|a| json!({
            "name": a.name,
            "type": a.account_type,
            "balance": a.current_balance,
        })).collect::<Vec<_>>(),
        "net_balance": net,
    });
    if !maybe_print_json(sub.get_flag("json"), &payload)? {
        let mut rows: Vec<Vec<String>> = snapshot
            .accounts
            .iter()
            .map(|a| {
                vec![
                    a.name.clone(),
                    a.account_type.label().to_string(),
                    fmt_money(&a.current_balance),
                ]
            })
            .collect();
        rows.push(vec!["Net balance".into(), String::new(), fmt_money(&net)]);
        println!("{}", pretty_table(&["Account", "Type", "Balance"], rows));
    }
    Ok(())
}

fn spend_by_category(snapshot: &Snapshot, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end) = month_window(sub)?;
    let spend = aggregate::category_spend(snapshot, start, end)?;
    if !maybe_print_json(sub.get_flag("json"), &spend)? {
        let rows = spend
            .iter()
            .map(|(cat, amt)| vec![cat.clone(), fmt_money(amt)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}

fn safe_to_spend(snapshot: &Snapshot, sub: &clap::ArgMatches) -> Result<()> {
    let s = aggregate::safe_to_spend_breakdown(snapshot)?;
    if !maybe_print_json(sub.get_flag("json"), &s)? {
        let rows = vec![
            vec!["Bank balances".into(), fmt_money(&s.bank_total)],
            vec!["Budgeted".into(), fmt_money(&-s.budgeted)],
            vec!["Card outstanding".into(), fmt_money(&-s.card_outstanding)],
            vec!["Goal savings".into(), fmt_money(&-s.goal_savings)],
            vec!["Safe to spend".into(), fmt_money(&s.amount)],
        ];
        println!("{}", pretty_table(&["", "Amount"], rows));
    }
    Ok(())
}

fn cash_flow(snapshot: &Snapshot, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end) = month_window(sub)?;
    let flow = aggregate::cash_flow(snapshot, start, end)?;
    let payload = json!({
        "income": flow.income,
        "expense": flow.expense,
        "net": flow.net(),
    });
    if !maybe_print_json(sub.get_flag("json"), &payload)? {
        let rows = vec![vec![
            fmt_money(&flow.income),
            fmt_money(&flow.expense),
            fmt_money(&flow.net()),
        ]];
        println!("{}", pretty_table(&["Income", "Expense", "Net"], rows));
    }
    Ok(())
}
