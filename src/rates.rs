// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Append-only time series of gold and silver rates.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::HisaabError;
use crate::models::{MarketRate, Metal};
use crate::utils::{fmt_instant, parse_instant};

/// Store a new reading. Earlier rows are never touched. Non-positive readings
/// are refused so a bad scrape cannot pollute the history.
pub fn append(conn: &Connection, rate: &MarketRate) -> Result<i64> {
    if rate.rate_per_gram <= Decimal::ZERO {
        return Err(HisaabError::InvalidRate(rate.rate_per_gram).into());
    }
    if rate.rate_per_tola <= Decimal::ZERO {
        return Err(HisaabError::InvalidRate(rate.rate_per_tola).into());
    }
    conn.execute(
        "INSERT INTO market_rates(metal, rate_per_gram, rate_per_tola, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![
            rate.metal.as_str(),
            rate.rate_per_gram.to_string(),
            rate.rate_per_tola.to_string(),
            fmt_instant(&rate.timestamp)
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(metal = rate.metal.as_str(), per_gram = %rate.rate_per_gram.round_dp(2), "market rate appended");
    Ok(id)
}

type RateRow = (i64, String, String, String, String);

fn read_rate(r: &rusqlite::Row<'_>) -> rusqlite::Result<RateRow> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn into_rate((id, metal, per_gram, per_tola, ts): RateRow) -> Result<MarketRate> {
    Ok(MarketRate {
        id: Some(id),
        metal: Metal::parse(&metal)?,
        rate_per_gram: per_gram
            .parse::<Decimal>()
            .with_context(|| format!("Invalid rate per gram '{}'", per_gram))?,
        rate_per_tola: per_tola
            .parse::<Decimal>()
            .with_context(|| format!("Invalid rate per tola '{}'", per_tola))?,
        timestamp: parse_instant(&ts)?,
    })
}

/// The reading with the greatest timestamp for `metal`.
pub fn latest(conn: &Connection, metal: Metal) -> Result<Option<MarketRate>> {
    let row = conn
        .query_row(
            "SELECT id, metal, rate_per_gram, rate_per_tola, timestamp FROM market_rates
             WHERE metal=?1 ORDER BY timestamp DESC, id DESC LIMIT 1",
            params![metal.as_str()],
            read_rate,
        )
        .optional()?;
    row.map(into_rate).transpose()
}

/// Readings newest first, optionally for a single metal.
pub fn history(conn: &Connection, metal: Option<Metal>, limit: usize) -> Result<Vec<MarketRate>> {
    let mut stmt = conn.prepare(
        "SELECT id, metal, rate_per_gram, rate_per_tola, timestamp FROM market_rates
         WHERE (?1 IS NULL OR metal=?1) ORDER BY timestamp DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(
        params![metal.map(|m| m.as_str()), limit as i64],
        read_rate,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_rate(row?)?);
    }
    Ok(out)
}
