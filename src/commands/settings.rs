// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config;
use crate::utils::{arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?;
            config::set_setting(conn, key, value)?;
            println!("{} = {}", key, value.trim());
        }
        Some(("get", sub)) => {
            let key = arg(sub, "key")?;
            match config::get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("unset", sub)) => {
            let key = arg(sub, "key")?;
            config::unset_setting(conn, key)?;
            println!("Unset {}", key);
        }
        Some(("list", _)) => {
            let rows = config::list_settings(conn)?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
