// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Hisaab", "hisaab"));

/// Environment override for the database file location.
pub const DB_ENV: &str = "HISAAB_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("hisaab.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    init_schema(&mut conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        account_type TEXT NOT NULL,
        initial_balance TEXT NOT NULL DEFAULT '0',
        current_balance TEXT NOT NULL DEFAULT '0',
        issuer TEXT,
        statement_day INTEGER CHECK(statement_day BETWEEN 1 AND 31),
        color TEXT,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        txn_type TEXT NOT NULL CHECK(txn_type IN ('DEBIT','CREDIT')),
        category TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        account_id INTEGER NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);

    CREATE TABLE IF NOT EXISTS budgets(
        category TEXT PRIMARY KEY,
        limit_amount TEXT NOT NULL,
        icon TEXT
    );

    CREATE TABLE IF NOT EXISTS goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        target_amount TEXT NOT NULL,
        saved_amount TEXT NOT NULL DEFAULT '0',
        deadline TEXT,
        icon TEXT,
        color TEXT
    );

    -- Append-only: rows are never updated or deleted.
    CREATE TABLE IF NOT EXISTS market_rates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        metal TEXT NOT NULL CHECK(metal IN ('GOLD','SILVER')),
        rate_per_gram TEXT NOT NULL,
        rate_per_tola TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_market_rates_latest ON market_rates(metal, timestamp);

    CREATE TABLE IF NOT EXISTS zakat_history(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        calculated_at TEXT NOT NULL,
        total_assets TEXT NOT NULL,
        total_debts TEXT NOT NULL,
        nisab_threshold TEXT NOT NULL,
        payable_amount TEXT NOT NULL
    );
    "#,
    )?;
    normalize_legacy_accounts(conn)?;
    Ok(())
}

/// Rewrites legacy `WALLET` rows to `BANK`. Never the reverse.
pub fn normalize_legacy_accounts(conn: &Connection) -> Result<usize> {
    let n = conn.execute(
        "UPDATE accounts SET account_type='BANK' WHERE account_type='WALLET'",
        [],
    )?;
    if n > 0 {
        info!(accounts = n, "normalized legacy wallet accounts to bank");
    }
    Ok(n)
}
