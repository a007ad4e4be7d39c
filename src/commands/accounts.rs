// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger;
use crate::models::{AccountType, NewAccount};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let account_type = AccountType::for_new(arg(sub, "type")?)?;
            let amount = parse_decimal(opt_arg(sub, "amount").unwrap_or("0"))?;
            let new = NewAccount {
                name: name.to_string(),
                account_type,
                amount,
                issuer: opt_arg(sub, "issuer").map(str::to_string),
                statement_day: sub.get_one::<u32>("statement-day").copied(),
                color: opt_arg(sub, "color").map(str::to_string),
            };
            ledger::create_account(conn, &new)?;
            let account = ledger::account_by_name(conn, name)?;
            println!(
                "Added {} account '{}' (balance {})",
                account.account_type.label(),
                account.name,
                fmt_money(&account.current_balance)
            );
        }
        Some(("list", sub)) => {
            let accounts = ledger::query_accounts(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &accounts)? {
                let rows = accounts
                    .iter()
                    .map(|a| {
                        vec![
                            a.name.clone(),
                            a.account_type.label().to_string(),
                            fmt_money(&a.initial_balance),
                            fmt_money(&a.current_balance),
                            a.issuer.clone().unwrap_or_default(),
                            a.statement_day.map(|d| d.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Name", "Type", "Opening", "Balance", "Issuer", "Statement day"],
                        rows
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            let removed = ledger::delete_account(conn, name)?;
            println!("Removed account '{}' and {} transaction(s)", name, removed);
        }
        Some(("rename", sub)) => {
            let name = arg(sub, "name")?;
            let to = arg(sub, "to")?;
            ledger::rename_account(conn, name, to)?;
            println!("Renamed account '{}' to '{}'", name, to);
        }
        Some(("set-opening", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let account = ledger::edit_initial_balance(conn, arg(sub, "name")?, amount)?;
            println!(
                "Opening balance of '{}' is now {} (balance {})",
                account.name,
                fmt_money(&account.initial_balance),
                fmt_money(&account.current_balance)
            );
        }
        Some(("set-outstanding", sub)) => {
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let account = ledger::set_outstanding(conn, arg(sub, "name")?, amount)?;
            println!(
                "Outstanding on '{}' is now {}",
                account.name,
                fmt_money(&account.current_balance.abs())
            );
        }
        _ => {}
    }
    Ok(())
}
