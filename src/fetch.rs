// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Periodic market-rate capture: scrape a per-tola price, append one reading.
//!
//! A failed attempt appends nothing. Retries and the fetch period live here,
//! outside the rate store and the calculator.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::{MarketRate, Metal};
use crate::rates;
use crate::utils::http_client;

/// Something that can produce the current per-tola price of a metal.
pub trait RateSource {
    fn fetch_per_tola(&self, metal: Metal) -> Result<Decimal>;
}

/// Reads a rates table from an HTML page: the first cell mentioning the
/// metal's label, followed by a cell holding the price.
pub struct HtmlRateScraper {
    pub url: String,
}

impl HtmlRateScraper {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl RateSource for HtmlRateScraper {
    fn fetch_per_tola(&self, metal: Metal) -> Result<Decimal> {
        let client = http_client()?;
        let body = client.get(&self.url).send()?.error_for_status()?.text()?;
        extract_rate(&body, metal_label(metal))
            .ok_or_else(|| anyhow!("No {} rate found at {}", metal_label(metal), self.url))
    }
}

pub fn metal_label(metal: Metal) -> &'static str {
    match metal {
        Metal::Gold => "24K",
        Metal::Silver => "Silver",
    }
}

static CELL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").ok());
static TAG_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").ok());

fn cell_text(raw: &str) -> String {
    let stripped = match TAG_RE.as_ref() {
        Some(re) => re.replace_all(raw, " ").into_owned(),
        None => raw.to_string(),
    };
    stripped.replace("&nbsp;", " ").trim().to_string()
}

fn parse_price(text: &str) -> Option<Decimal> {
    let upper = text.to_uppercase();
    let cleaned: String = upper
        .replace("PKR", "")
        .replace("RS.", "")
        .replace("RS", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    cleaned
        .parse::<Decimal>()
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

/// Price in the cell right after the first cell containing `label` that is
/// followed by a number.
pub fn extract_rate(html: &str, label: &str) -> Option<Decimal> {
    let re = CELL_RE.as_ref()?;
    let cells: Vec<String> = re
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| cell_text(m.as_str())))
        .collect();
    let needle = label.to_lowercase();
    cells.windows(2).find_map(|pair| {
        if pair[0].to_lowercase().contains(&needle) {
            parse_price(&pair[1])
        } else {
            None
        }
    })
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }
}

/// Fetch with retries and append exactly one reading on success. After the
/// last failed attempt the error is returned and nothing is stored.
pub fn fetch_and_append(
    conn: &Connection,
    source: &dyn RateSource,
    metal: Metal,
    policy: RetryPolicy,
    now: DateTime<Utc>,
) -> Result<MarketRate> {
    let mut delay = policy.backoff;
    let mut last_err = anyhow!("no fetch attempted");
    for attempt in 1..=policy.attempts {
        match source.fetch_per_tola(metal) {
            Ok(per_tola) if per_tola > Decimal::ZERO => {
                let mut rate = MarketRate::from_per_tola(metal, per_tola, now);
                rate.id = Some(rates::append(conn, &rate)?);
                info!(metal = metal.as_str(), attempt, per_tola = %per_tola, "rate fetched");
                return Ok(rate);
            }
            Ok(bad) => {
                warn!(metal = metal.as_str(), attempt, value = %bad, "discarding non-positive rate");
                last_err = anyhow!("Source returned non-positive rate {}", bad);
            }
            Err(e) => {
                warn!(metal = metal.as_str(), attempt, error = %e, "rate fetch failed");
                last_err = e;
            }
        }
        if attempt < policy.attempts && !delay.is_zero() {
            std::thread::sleep(delay);
            delay = delay.saturating_mul(2);
        }
    }
    Err(last_err.context(format!(
        "Fetching {} rate failed after {} attempt(s)",
        metal, policy.attempts
    )))
}

/// Run fetch-and-append for every metal each `period`, forever. A failed cycle
/// is logged and the loop carries on.
pub fn watch(
    conn: &Connection,
    source: &dyn RateSource,
    metals: &[Metal],
    policy: RetryPolicy,
    period: Duration,
) -> Result<()> {
    loop {
        for metal in metals {
            match fetch_and_append(conn, source, *metal, policy, Utc::now()) {
                Ok(rate) => println!(
                    "{} {}/tola ({}/g) at {}",
                    rate.metal,
                    rate.rate_per_tola.round_dp(2),
                    rate.rate_per_gram.round_dp(2),
                    rate.timestamp.to_rfc3339()
                ),
                Err(e) => warn!(metal = metal.as_str(), error = %e, "rate cycle failed"),
            }
        }
        std::thread::sleep(period);
    }
}
