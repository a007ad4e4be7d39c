// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::models::{Metal, WeightUnit};
use crate::utils::{fmt_instant, fmt_money, maybe_print_json, opt_arg, pretty_table};
use crate::zakat::{self, ZakatInputs, ZakatStep, ZakatVerdict, ZakatWizard};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::io::{BufRead, Write};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("calculate", sub)) => calculate(conn, sub)?,
        Some(("wizard", _)) => {
            let stdin = std::io::stdin();
            let mut out = std::io::stdout();
            run_wizard(conn, &mut stdin.lock(), &mut out)?;
        }
        Some(("history", sub)) => history(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn calculate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let metal = match opt_arg(sub, "metal") {
        Some(m) => Metal::parse(m)?,
        None => config::nisab_standard(conn)?,
    };
    let inputs = ZakatInputs {
        metal,
        cash_in_hand: opt_arg(sub, "cash").unwrap_or_default().to_string(),
        jewelry_weight: opt_arg(sub, "jewelry").unwrap_or_default().to_string(),
        jewelry_unit: WeightUnit::parse(opt_arg(sub, "unit").unwrap_or("tola"))?,
        other_assets: opt_arg(sub, "other").unwrap_or_default().to_string(),
        debts: opt_arg(sub, "debts").unwrap_or_default().to_string(),
    };
    let verdict = zakat::run(conn, &inputs, Utc::now())?;
    if !maybe_print_json(sub.get_flag("json"), &verdict)? {
        print_verdict(&mut std::io::stdout(), &verdict)?;
    }
    Ok(())
}

pub fn print_verdict(out: &mut dyn Write, verdict: &ZakatVerdict) -> Result<()> {
    match verdict {
        ZakatVerdict::NoRateAvailable { metal } => {
            writeln!(
                out,
                "No {} rate available; cannot judge nisab. Record one with `hisaab rates add` or `hisaab rates fetch`.",
                metal.as_str().to_lowercase()
            )?;
        }
        ZakatVerdict::OutOfRange { .. } => {
            writeln!(out, "Entries are too large to total; nothing was recorded.")?;
        }
        ZakatVerdict::Assessed(r) => {
            let rows = vec![
                vec!["Rate per gram".into(), fmt_money(&r.rate_per_gram)],
                vec!["Bank balances".into(), fmt_money(&r.bank_balance)],
                vec!["Jewelry (g)".into(), r.weight_in_grams.round_dp(3).to_string()],
                vec!["Jewelry value".into(), fmt_money(&r.jewelry_value)],
                vec!["Total assets".into(), fmt_money(&r.total_assets)],
                vec!["Debts".into(), fmt_money(&r.total_debts)],
                vec!["Net wealth".into(), fmt_money(&r.net_wealth)],
                vec![
                    format!("Nisab ({})", r.metal.as_str().to_lowercase()),
                    fmt_money(&r.nisab_threshold),
                ],
                vec![
                    "Zakat due".into(),
                    if r.is_wajib { "yes".into() } else { "no".into() },
                ],
                vec!["Payable".into(), fmt_money(&r.payable_amount)],
            ];
            writeln!(out, "{}", pretty_table(&["", "Amount"], rows))?;
        }
    }
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = zakat::history(conn)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    fmt_instant(&s.calculated_at),
                    fmt_money(&s.total_assets),
                    fmt_money(&s.total_debts),
                    fmt_money(&s.nisab_threshold),
                    fmt_money(&s.payable_amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Calculated", "Assets", "Debts", "Nisab", "Payable"], rows)
        );
    }
    Ok(())
}

enum Answer {
    Value(String),
    Back,
    Eof,
}

fn ask(input: &mut dyn BufRead, out: &mut dyn Write, prompt: &str, current: &str) -> Result<Answer> {
    if current.is_empty() {
        write!(out, "{}: ", prompt)?;
    } else {
        write!(out, "{} [{}]: ", prompt, current)?;
    }
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Answer::Eof);
    }
    let line = line.trim();
    if line.eq_ignore_ascii_case("back") {
        return Ok(Answer::Back);
    }
    // Blank keeps what was entered before.
    Ok(Answer::Value(if line.is_empty() {
        current.to_string()
    } else {
        line.to_string()
    }))
}

fn unit_name(u: WeightUnit) -> &'static str {
    match u {
        WeightUnit::Tola => "tola",
        WeightUnit::Gram => "gram",
    }
}

/// Drive the wizard from line input. Typing `back` at any prompt returns to the
/// previous step with all entries kept. Returns the final verdict, if the
/// result step was reached.
pub fn run_wizard(
    conn: &Connection,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Option<ZakatVerdict>> {
    let inputs = ZakatInputs {
        metal: config::nisab_standard(conn)?,
        ..ZakatInputs::default()
    };
    let mut wizard = ZakatWizard::new(inputs);

    macro_rules! answer {
        ($prompt:expr, $current:expr) => {
            match ask(input, out, $prompt, $current)? {
                Answer::Value(v) => v,
                Answer::Back => {
                    if wizard.back().is_err() {
                        writeln!(out, "Already at the first step.")?;
                    }
                    continue;
                }
                Answer::Eof => return Ok(wizard.verdict().cloned()),
            }
        };
    }

    loop {
        match wizard.step() {
            ZakatStep::Nisab => {
                writeln!(out, "Step 1/3: nisab standard")?;
                let current = wizard.inputs.metal.as_str().to_lowercase();
                let v = answer!("Metal (gold/silver)", &current);
                match Metal::parse(&v) {
                    Ok(m) => wizard.inputs.metal = m,
                    Err(e) => {
                        writeln!(out, "{}", e)?;
                        continue;
                    }
                }
            }
            ZakatStep::Assets => {
                writeln!(out, "Step 2/3: assets (blank counts as zero, `back` to revise)")?;
                let current = wizard.inputs.cash_in_hand.clone();
                let v = answer!("Cash in hand", &current);
                wizard.inputs.cash_in_hand = v;
                let current = wizard.inputs.jewelry_weight.clone();
                let v = answer!("Jewelry weight", &current);
                wizard.inputs.jewelry_weight = v;
                let current = unit_name(wizard.inputs.jewelry_unit);
                let v = answer!("Unit (tola/gram)", current);
                match WeightUnit::parse(&v) {
                    Ok(u) => wizard.inputs.jewelry_unit = u,
                    Err(e) => {
                        writeln!(out, "{}", e)?;
                        continue;
                    }
                }
                let current = wizard.inputs.other_assets.clone();
                let v = answer!("Other assets", &current);
                wizard.inputs.other_assets = v;
            }
            ZakatStep::Debts => {
                writeln!(out, "Step 3/3: liabilities")?;
                let current = wizard.inputs.debts.clone();
                let v = answer!("Debts", &current);
                wizard.inputs.debts = v;
            }
            ZakatStep::Result => {
                if let Some(v) = wizard.verdict() {
                    print_verdict(out, v)?;
                }
                let _ = answer!("Type `back` to revise, Enter to finish", "");
                return Ok(wizard.verdict().cloned());
            }
        }
        wizard.advance(conn, Utc::now())?;
    }
}
