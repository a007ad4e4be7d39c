// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod transactions;
pub mod budgets;
pub mod goals;
pub mod reports;
pub mod rates;
pub mod zakat;
pub mod ingest;
pub mod exporter;
pub mod settings;
pub mod doctor;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::utils::{current_month_bounds, month_bounds, opt_arg, parse_month};

/// Window for `--month YYYY-MM`, or the current local month.
pub(crate) fn month_window(sub: &clap::ArgMatches) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match opt_arg(sub, "month") {
        Some(m) => {
            let (year, month) = parse_month(m)?;
            month_bounds(year, month)
        }
        None => current_month_bounds(Utc::now()),
    }
}
