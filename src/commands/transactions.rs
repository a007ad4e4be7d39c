// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, TxnFilter};
use crate::models::{NewTransaction, TxnType};
use crate::utils::{
    arg, fmt_instant, fmt_money, maybe_print_json, month_bounds, opt_arg, parse_amount,
    parse_month, parse_when, pretty_table,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow::anyhow!("Missing --id"))?;
            ledger::delete_transaction(conn, id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account = ledger::account_by_name(conn, arg(sub, "account")?)?;
    let amount = parse_amount(arg(sub, "amount")?)?;
    let txn_type = TxnType::parse(arg(sub, "type")?)?;
    let category = arg(sub, "category")?;
    let timestamp = match opt_arg(sub, "at") {
        Some(s) => parse_when(s)?,
        None => Utc::now(),
    };
    let id = ledger::insert_transaction(
        conn,
        &NewTransaction {
            amount,
            txn_type,
            category: category.to_string(),
            timestamp,
            account_id: account.id,
        },
    )?;
    println!(
        "Recorded {} {} in '{}' on '{}' (id {})",
        txn_type.as_str().to_lowercase(),
        fmt_money(&amount),
        category,
        account.name,
        id
    );
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow::anyhow!("Missing --id"))?;
    let old = ledger::get_transaction(conn, id)?;
    let account_id = match opt_arg(sub, "account") {
        Some(name) => ledger::account_by_name(conn, name)?.id,
        None => old.account_id,
    };
    let new = NewTransaction {
        amount: match opt_arg(sub, "amount") {
            Some(s) => parse_amount(s)?,
            None => old.amount,
        },
        txn_type: match opt_arg(sub, "type") {
            Some(s) => TxnType::parse(s)?,
            None => old.txn_type,
        },
        category: opt_arg(sub, "category")
            .map(str::to_string)
            .unwrap_or(old.category),
        timestamp: match opt_arg(sub, "at") {
            Some(s) => parse_when(s)?,
            None => old.timestamp,
        },
        account_id,
    };
    ledger::update_transaction(conn, id, &new)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.timestamp.clone(),
                    r.account.clone(),
                    r.txn_type.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "When", "Account", "Type", "Amount", "Category"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub timestamp: String,
    pub account: String,
    pub txn_type: String,
    pub amount: String,
    pub category: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut filter = TxnFilter {
        limit: sub.get_one::<usize>("limit").copied(),
        category: opt_arg(sub, "category").map(str::to_string),
        ..TxnFilter::default()
    };
    if let Some(name) = opt_arg(sub, "account") {
        filter.account_id = Some(ledger::account_by_name(conn, name)?.id);
    }
    if let Some(kind) = opt_arg(sub, "type") {
        filter.txn_type = Some(TxnType::parse(kind)?);
    }
    if let Some(month) = opt_arg(sub, "month") {
        let (year, mon) = parse_month(month)?;
        let (start, end) = month_bounds(year, mon)?;
        filter.start = Some(start);
        filter.end = Some(end);
    }

    let names: HashMap<i64, String> = ledger::query_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let rows = ledger::query_transactions(conn, &filter)?
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            timestamp: fmt_instant(&t.timestamp),
            account: names.get(&t.account_id).cloned().unwrap_or_default(),
            txn_type: t.txn_type.as_str().to_string(),
            amount: fmt_money(&t.amount),
            category: t.category,
        })
        .collect();
    Ok(rows)
}
