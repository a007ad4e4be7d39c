// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User settings persisted in the `settings` table.

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

use crate::models::Metal;

pub const DEFAULT_ACCOUNT: &str = "default_account";
pub const NISAB_STANDARD: &str = "nisab_standard";
pub const RATE_SOURCE_URL: &str = "rate_source_url";
pub const RATE_FETCH_ATTEMPTS: &str = "rate_fetch_attempts";
pub const RATE_FETCH_INTERVAL_HOURS: &str = "rate_fetch_interval_hours";

pub const KNOWN_KEYS: &[&str] = &[
    DEFAULT_ACCOUNT,
    NISAB_STANDARD,
    RATE_SOURCE_URL,
    RATE_FETCH_ATTEMPTS,
    RATE_FETCH_INTERVAL_HOURS,
];

pub const DEFAULT_RATE_SOURCE_URL: &str = "https://hamariweb.com/finance/gold_rate/";

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            KNOWN_KEYS.join(", ")
        ));
    }
    validate(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}

pub fn unset_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn list_settings(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        NISAB_STANDARD => {
            Metal::parse(value)?;
        }
        RATE_FETCH_ATTEMPTS | RATE_FETCH_INTERVAL_HOURS => {
            let n: u32 = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("'{}' must be a positive integer", key))?;
            if n == 0 {
                return Err(anyhow!("'{}' must be a positive integer", key));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn default_account(conn: &Connection) -> Result<Option<String>> {
    get_setting(conn, DEFAULT_ACCOUNT)
}

pub fn nisab_standard(conn: &Connection) -> Result<Metal> {
    match get_setting(conn, NISAB_STANDARD)? {
        Some(s) => Ok(Metal::parse(&s)?),
        None => Ok(Metal::Gold),
    }
}

pub fn rate_source_url(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, RATE_SOURCE_URL)?.unwrap_or_else(|| DEFAULT_RATE_SOURCE_URL.to_string()))
}

pub fn rate_fetch_attempts(conn: &Connection) -> Result<u32> {
    Ok(get_setting(conn, RATE_FETCH_ATTEMPTS)?
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(3))
}

pub fn rate_fetch_interval_hours(conn: &Connection) -> Result<u64> {
    Ok(get_setting(conn, RATE_FETCH_INTERVAL_HOURS)?
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(12))
}
