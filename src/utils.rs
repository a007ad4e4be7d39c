// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, Local, NaiveDate, SecondsFormat, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::error::HisaabError;

const UA: &str = concat!(
    "hisaab/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/hisaab)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// Value of a required clap argument.
pub fn arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing --{}", id))
}

pub fn opt_arg<'a>(m: &'a clap::ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id).map(String::as_str)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().replace(',', "");
    cleaned
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Strictly positive amount from user input.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(HisaabError::NonPositiveAmount(d).into());
    }
    Ok(d)
}

/// Blank or unparseable input reads as zero.
pub fn parse_lenient(s: &str) -> Decimal {
    s.trim()
        .replace(',', "")
        .parse::<Decimal>()
        .unwrap_or(Decimal::ZERO)
}

/// Sum that reports overflow instead of panicking. `what` names the figure.
pub fn checked_sum<I>(items: I, what: &'static str) -> Result<Decimal, HisaabError>
where
    I: IntoIterator<Item = Decimal>,
{
    items.into_iter().try_fold(Decimal::ZERO, |acc, d| {
        acc.checked_add(d).ok_or(HisaabError::Overflow(what))
    })
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Stored instant form: RFC 3339 UTC, millisecond precision. Sorts lexically.
pub fn fmt_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, HisaabError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| HisaabError::InvalidInstant(s.to_string()))
}

/// Instant from user input: RFC 3339, or a bare date meaning local midnight.
pub fn parse_when(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    let date = parse_date(s)?;
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("No local instant for {}", date))
}

/// First and last instant (00:00:00.000 .. 23:59:59.999) of a month in the
/// local calendar, as UTC instants.
pub fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
    let last = next_first
        .pred_opt()
        .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;

    let start = first
        .and_hms_milli_opt(0, 0, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .ok_or_else(|| anyhow!("No local start instant for {}", first))?;
    let end = last
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(|dt| Local.from_local_datetime(&dt).latest())
        .ok_or_else(|| anyhow!("No local end instant for {}", last))?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Bounds of the local calendar month containing `now`.
pub fn current_month_bounds(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let local = now.with_timezone(&Local);
    month_bounds(local.year(), local.month())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
