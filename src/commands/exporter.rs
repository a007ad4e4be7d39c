// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, TxnFilter};
use crate::utils::{arg, fmt_instant};
use crate::zakat;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("zakat-history", sub)) => export_zakat_history(conn, sub),
        _ => Ok(()),
    }
}

fn format_of(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = arg(sub, "format")?.to_lowercase();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    Ok(fmt)
}

fn write_out(fmt: &str, out: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(headers)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<serde_json::Value> = rows
            .into_iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = headers
                    .iter()
                    .zip(row)
                    .map(|(h, v)| (h.to_string(), json!(v)))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    Ok(())
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = arg(sub, "out")?;

    let names: HashMap<i64, String> = ledger::query_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let mut txns = ledger::query_transactions(conn, &TxnFilter::default())?;
    // Oldest first reads better in a file.
    txns.reverse();
    let rows = txns
        .into_iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                fmt_instant(&t.timestamp),
                names.get(&t.account_id).cloned().unwrap_or_default(),
                t.txn_type.as_str().to_string(),
                t.amount.to_string(),
                t.category,
            ]
        })
        .collect();
    write_out(
        &fmt,
        out,
        &["id", "timestamp", "account", "type", "amount", "category"],
        rows,
    )?;
    println!("Exported transactions to {}", out);
    Ok(())
}

fn export_zakat_history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = arg(sub, "out")?;
    let rows = zakat::history(conn)?
        .into_iter()
        .map(|s| {
            vec![
                fmt_instant(&s.calculated_at),
                s.total_assets.to_string(),
                s.total_debts.to_string(),
                s.nisab_threshold.to_string(),
                s.payable_amount.to_string(),
            ]
        })
        .collect();
    write_out(
        &fmt,
        out,
        &[
            "calculated_at",
            "total_assets",
            "total_debts",
            "nisab_threshold",
            "payable_amount",
        ],
        rows,
    )?;
    println!("Exported zakat history to {}", out);
    Ok(())
}
