// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ingest::{self, IngestOutcome};
use crate::utils::{arg, maybe_print_json};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("notification", sub)) => {
            let outcome =
                ingest::ingest_notification(conn, arg(sub, "source")?, arg(sub, "text")?, Utc::now());
            if !maybe_print_json(sub.get_flag("json"), &outcome)? {
                match outcome {
                    IngestOutcome::Posted {
                        transaction_id,
                        account_id,
                    } => println!(
                        "Posted transaction {} to account #{}",
                        transaction_id, account_id
                    ),
                    IngestOutcome::Ignored => println!("No transaction recognised"),
                    IngestOutcome::Dropped => println!("Recognised but not posted (see log)"),
                }
            }
        }
        Some(("file", sub)) => {
            let path = arg(sub, "path")?.trim();
            let summary = ingest::ingest_csv(conn, Path::new(path), Utc::now())?;
            println!(
                "Ingested {}: {} posted, {} ignored, {} dropped, {} malformed",
                path, summary.posted, summary.ignored, summary.dropped, summary.malformed
            );
        }
        _ => {}
    }
    Ok(())
}
