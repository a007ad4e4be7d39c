// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{self, Snapshot};
use crate::ledger;
use crate::models::Budget;
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

use super::month_window;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let category = arg(sub, "category")?;
            ledger::delete_budget(conn, category)?;
            println!("Removed budget for '{}'", category);
        }
        Some(("progress", sub)) => progress(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = arg(sub, "category")?;
    let limit = parse_decimal(arg(sub, "limit")?)?;
    ledger::upsert_budget(
        conn,
        &Budget {
            category: category.to_string(),
            limit_amount: limit,
            icon: opt_arg(sub, "icon").map(str::to_string),
        },
    )?;
    println!("Budget set for {} = {}", category.trim(), fmt_money(&limit));
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = ledger::query_budgets(conn)?;
    if !maybe_print_json(sub.get_flag("json"), &budgets)? {
        let rows = budgets
            .iter()
            .map(|b| {
                vec![
                    b.icon.clone().unwrap_or_default(),
                    b.category.clone(),
                    fmt_money(&b.limit_amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["", "Category", "Monthly limit"], rows));
    }
    Ok(())
}

fn progress(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (start, end) = month_window(sub)?;
    let snapshot = Snapshot::load(conn)?;
    let data = aggregate::budget_progress(&snapshot, start, end)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.category.clone(),
                    fmt_money(&p.limit),
                    fmt_money(&p.spent),
                    fmt_money(&p.remaining),
                    format!("{:.0}%", (p.progress * rust_decimal::Decimal::ONE_HUNDRED).round()),
                    p.tier.as_str().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Limit", "Spent", "Remaining", "Used", "Status"],
                rows
            )
        );
    }
    Ok(())
}
