// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::fetch::{self, HtmlRateScraper, RetryPolicy};
use crate::models::{MarketRate, Metal};
use crate::rates;
use crate::utils::{arg, fmt_instant, fmt_money, maybe_print_json, opt_arg, parse_amount, pretty_table};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::time::Duration;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("latest", sub)) => latest(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("fetch", sub)) => fetch_once(conn, sub)?,
        Some(("watch", sub)) => watch(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn metals(sub: &clap::ArgMatches) -> Result<Vec<Metal>> {
    match opt_arg(sub, "metal") {
        Some(m) => Ok(vec![Metal::parse(m)?]),
        None => Ok(Metal::all().to_vec()),
    }
}

fn rate_row(r: &MarketRate) -> Vec<String> {
    vec![
        r.metal.to_string(),
        fmt_money(&r.rate_per_gram),
        fmt_money(&r.rate_per_tola),
        fmt_instant(&r.timestamp),
    ]
}

const RATE_HEADERS: [&str; 4] = ["Metal", "Per gram", "Per tola", "As of"];

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let metal = Metal::parse(arg(sub, "metal")?)?;
    let now = Utc::now();
    let rate = match (opt_arg(sub, "per-gram"), opt_arg(sub, "per-tola")) {
        (Some(g), _) => MarketRate::from_per_gram(metal, parse_amount(g)?, now)?,
        (None, Some(t)) => MarketRate::from_per_tola(metal, parse_amount(t)?, now),
        (None, None) => anyhow::bail!("Give --per-gram or --per-tola"),
    };
    rates::append(conn, &rate)?;
    println!(
        "Recorded {} at {}/g ({}/tola)",
        metal,
        fmt_money(&rate.rate_per_gram),
        fmt_money(&rate.rate_per_tola)
    );
    Ok(())
}

fn latest(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut found = Vec::new();
    for metal in metals(sub)? {
        if let Some(r) = rates::latest(conn, metal)? {
            found.push(r);
        }
    }
    if !maybe_print_json(sub.get_flag("json"), &found)? {
        if found.is_empty() {
            println!("No market rates recorded yet. Try `hisaab rates fetch`.");
        } else {
            println!(
                "{}",
                pretty_table(&RATE_HEADERS, found.iter().map(rate_row).collect())
            );
        }
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let metal = opt_arg(sub, "metal").map(Metal::parse).transpose()?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(20);
    let data = rates::history(conn, metal, limit)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        println!(
            "{}",
            pretty_table(&RATE_HEADERS, data.iter().map(rate_row).collect())
        );
    }
    Ok(())
}

fn scraper(conn: &Connection, sub: &clap::ArgMatches) -> Result<HtmlRateScraper> {
    let url = match opt_arg(sub, "url") {
        Some(u) => u.to_string(),
        None => config::rate_source_url(conn)?,
    };
    Ok(HtmlRateScraper::new(url))
}

fn policy(conn: &Connection) -> Result<RetryPolicy> {
    Ok(RetryPolicy::new(
        config::rate_fetch_attempts(conn)?,
        Duration::from_secs(2),
    ))
}

fn fetch_once(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let source = scraper(conn, sub)?;
    let policy = policy(conn)?;
    for metal in metals(sub)? {
        let rate = fetch::fetch_and_append(conn, &source, metal, policy, Utc::now())?;
        println!(
            "{}: {}/tola ({}/g)",
            rate.metal,
            fmt_money(&rate.rate_per_tola),
            fmt_money(&rate.rate_per_gram)
        );
    }
    Ok(())
}

fn watch(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let source = scraper(conn, sub)?;
    let hours = config::rate_fetch_interval_hours(conn)?;
    println!(
        "Fetching rates from {} every {} hour(s). Ctrl-C to stop.",
        source.url, hours
    );
    fetch::watch(
        conn,
        &source,
        &Metal::all(),
        policy(conn)?,
        Duration::from_secs(hours * 3600),
    )
}
