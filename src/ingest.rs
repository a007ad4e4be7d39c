// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Best-effort capture of notifications into the ledger.
//!
//! Nothing in here returns an error to the caller: unmatched text is ignored
//! and a failed posting is logged and dropped.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config;
use crate::ledger;
use crate::models::{NewAccount, NewTransaction};
use crate::parser::{self, ParsedTransaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestOutcome {
    Posted { transaction_id: i64, account_id: i64 },
    /// Unknown source or no template matched.
    Ignored,
    /// Parsed, but the ledger write failed.
    Dropped,
}

/// Account parsed notifications post to: the configured default when it still
/// exists, otherwise a Bank account named after the provider.
fn target_account(conn: &Connection, parsed: &ParsedTransaction) -> Result<i64> {
    if let Some(name) = config::default_account(conn)? {
        if let Some(account) = ledger::find_account(conn, &name)? {
            return Ok(account.id);
        }
        warn!(account = %name, "default account missing; using provider account");
    }
    if let Some(account) = ledger::find_account(conn, parsed.provider)? {
        return Ok(account.id);
    }
    let id = ledger::create_account(conn, &NewAccount::bank(parsed.provider, Decimal::ZERO))
        .with_context(|| format!("Create account for {}", parsed.provider))?;
    info!(account = parsed.provider, "created account for provider");
    Ok(id)
}

fn post(conn: &mut Connection, parsed: &ParsedTransaction, now: DateTime<Utc>) -> Result<(i64, i64)> {
    let account_id = target_account(conn, parsed)?;
    let id = ledger::insert_transaction(
        conn,
        &NewTransaction {
            amount: parsed.amount,
            txn_type: parsed.txn_type,
            category: parsed.category.clone(),
            timestamp: now,
            account_id,
        },
    )?;
    Ok((id, account_id))
}

/// Parse one notification and post it. The posting time is `now`, never a
/// date found in the text.
pub fn ingest_notification(
    conn: &mut Connection,
    source: &str,
    text: &str,
    now: DateTime<Utc>,
) -> IngestOutcome {
    let Some(parsed) = parser::parse(source, text) else {
        debug!(source, "notification ignored");
        return IngestOutcome::Ignored;
    };
    match post(conn, &parsed, now) {
        Ok((transaction_id, account_id)) => {
            info!(
                transaction_id,
                account_id,
                amount = %parsed.amount,
                kind = parsed.txn_type.as_str(),
                "notification posted"
            );
            IngestOutcome::Posted {
                transaction_id,
                account_id,
            }
        }
        Err(e) => {
            warn!(source, error = %format!("{:#}", e), "dropping parsed notification");
            IngestOutcome::Dropped
        }
    }
}

#[derive(Debug, Deserialize)]
struct NotificationRecord {
    source: String,
    text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub posted: usize,
    pub ignored: usize,
    pub dropped: usize,
    pub malformed: usize,
}

/// Ingest a CSV of `source,text` rows. Each row stands alone; a malformed row
/// is counted and skipped.
pub fn ingest_csv(conn: &mut Connection, path: &Path, now: DateTime<Utc>) -> Result<IngestSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .with_context(|| format!("Open {}", path.display()))?;
    let mut summary = IngestSummary::default();
    for (idx, rec) in rdr.deserialize::<NotificationRecord>().enumerate() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!(row = idx + 2, error = %e, "skipping malformed notification row");
                summary.malformed += 1;
                continue;
            }
        };
        match ingest_notification(conn, &rec.source, &rec.text, now) {
            IngestOutcome::Posted { .. } => summary.posted += 1,
            IngestOutcome::Ignored => summary.ignored += 1,
            IngestOutcome::Dropped => summary.dropped += 1,
        }
    }
    Ok(summary)
}
