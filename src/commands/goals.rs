// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, NewGoal};
use crate::utils::{arg, fmt_money, maybe_print_json, opt_arg, parse_amount, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let goal = NewGoal {
                name: arg(sub, "name")?.to_string(),
                target_amount: parse_amount(arg(sub, "target")?)?,
                deadline: opt_arg(sub, "deadline").map(parse_date).transpose()?,
                icon: opt_arg(sub, "icon").map(str::to_string),
                color: opt_arg(sub, "color").map(str::to_string),
            };
            ledger::add_goal(conn, &goal)?;
            println!(
                "Added goal '{}' (target {})",
                goal.name.trim(),
                fmt_money(&goal.target_amount)
            );
        }
        Some(("list", sub)) => {
            let goals = ledger::query_goals(conn)?;
            if !maybe_print_json(sub.get_flag("json"), &goals)? {
                let rows = goals
                    .iter()
                    .map(|g| {
                        vec![
                            g.name.clone(),
                            fmt_money(&g.saved_amount),
                            fmt_money(&g.target_amount),
                            g.deadline.map(|d| d.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Goal", "Saved", "Target", "Deadline"], rows)
                );
            }
        }
        Some(("top-up", sub)) => {
            let amount = parse_amount(arg(sub, "amount")?)?;
            let (goal, reached) = ledger::top_up_goal(conn, arg(sub, "name")?, amount)?;
            println!(
                "'{}' now at {} of {}",
                goal.name,
                fmt_money(&goal.saved_amount),
                fmt_money(&goal.target_amount)
            );
            if reached {
                println!("Goal reached!");
            }
        }
        Some(("withdraw", sub)) => {
            let amount = parse_amount(arg(sub, "amount")?)?;
            let goal = ledger::withdraw_from_goal(conn, arg(sub, "name")?, amount)?;
            println!("'{}' now at {}", goal.name, fmt_money(&goal.saved_amount));
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            ledger::delete_goal(conn, name)?;
            println!("Removed goal '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
