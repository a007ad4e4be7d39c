// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Zakat eligibility and payable amount.
//!
//! A four-step wizard collects the nisab standard, assets and debts. The
//! calculation itself is a pure function of those inputs, the latest rate for
//! the chosen metal and the Bank balance total read once at calculation time.
//! Every assessed run appends one snapshot to history; history is never read
//! back into a calculation.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::error::HisaabError;
use crate::ledger;
use crate::models::{MarketRate, Metal, WeightUnit, ZakatSnapshot};
use crate::rates;
use crate::utils::{checked_sum, fmt_instant, parse_instant, parse_lenient};

/// Classical Hanafi nisab weights.
pub const GOLD_NISAB_GRAMS: Decimal = Decimal::from_parts(8748, 0, 0, false, 2);
pub const SILVER_NISAB_GRAMS: Decimal = Decimal::from_parts(61236, 0, 0, false, 2);

/// 2.5%
pub const ZAKAT_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 3);

pub fn nisab_grams(metal: Metal) -> Decimal {
    match metal {
        Metal::Gold => GOLD_NISAB_GRAMS,
        Metal::Silver => SILVER_NISAB_GRAMS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZakatStep {
    Nisab,
    Assets,
    Debts,
    Result,
}

impl ZakatStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nisab => "nisab",
            Self::Assets => "assets",
            Self::Debts => "debts",
            Self::Result => "result",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Nisab => Some(Self::Assets),
            Self::Assets => Some(Self::Debts),
            Self::Debts => Some(Self::Result),
            Self::Result => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            Self::Nisab => None,
            Self::Assets => Some(Self::Nisab),
            Self::Debts => Some(Self::Assets),
            Self::Result => Some(Self::Debts),
        }
    }
}

impl fmt::Display for ZakatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw user entries. Numbers stay as typed until calculation.
#[derive(Debug, Clone)]
pub struct ZakatInputs {
    pub metal: Metal,
    pub cash_in_hand: String,
    pub jewelry_weight: String,
    pub jewelry_unit: WeightUnit,
    pub other_assets: String,
    pub debts: String,
}

impl Default for ZakatInputs {
    fn default() -> Self {
        Self {
            metal: Metal::Gold,
            cash_in_hand: String::new(),
            jewelry_weight: String::new(),
            jewelry_unit: WeightUnit::Tola,
            other_assets: String::new(),
            debts: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZakatResult {
    pub metal: Metal,
    pub rate_per_gram: Decimal,
    pub bank_balance: Decimal,
    pub weight_in_grams: Decimal,
    pub jewelry_value: Decimal,
    pub total_assets: Decimal,
    pub total_debts: Decimal,
    pub net_wealth: Decimal,
    pub nisab_threshold: Decimal,
    pub is_wajib: bool,
    pub payable_amount: Decimal,
}

impl ZakatResult {
    pub fn snapshot(&self, calculated_at: DateTime<Utc>) -> ZakatSnapshot {
        ZakatSnapshot {
            id: None,
            calculated_at,
            total_assets: self.total_assets,
            total_debts: self.total_debts,
            nisab_threshold: self.nisab_threshold,
            payable_amount: self.payable_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZakatVerdict {
    Assessed(ZakatResult),
    /// No usable rate for the chosen metal; nothing can be judged.
    NoRateAvailable { metal: Metal },
    /// An entry is too large for the totals to be computed.
    OutOfRange { metal: Metal },
}

/// Evaluate `inputs` against `rate`. A missing or non-positive rate is
/// `NoRateAvailable`, never a zero nisab.
pub fn calculate(
    inputs: &ZakatInputs,
    rate: Option<&MarketRate>,
    bank_balance: Decimal,
) -> ZakatVerdict {
    let rate_per_gram = match rate {
        Some(r) if r.metal == inputs.metal && r.rate_per_gram > Decimal::ZERO => r.rate_per_gram,
        _ => return ZakatVerdict::NoRateAvailable { metal: inputs.metal },
    };

    match assess(inputs, rate_per_gram, bank_balance) {
        Some(result) => ZakatVerdict::Assessed(result),
        None => ZakatVerdict::OutOfRange { metal: inputs.metal },
    }
}

/// The arithmetic of `calculate`; `None` when any figure overflows.
fn assess(inputs: &ZakatInputs, rate_per_gram: Decimal, bank_balance: Decimal) -> Option<ZakatResult> {
    let nisab_threshold = nisab_grams(inputs.metal).checked_mul(rate_per_gram)?;
    let weight_in_grams = inputs
        .jewelry_unit
        .to_grams(parse_lenient(&inputs.jewelry_weight))?;
    let jewelry_value = weight_in_grams.checked_mul(rate_per_gram)?;
    let total_assets = parse_lenient(&inputs.cash_in_hand)
        .checked_add(bank_balance)?
        .checked_add(jewelry_value)?
        .checked_add(parse_lenient(&inputs.other_assets))?;
    let total_debts = parse_lenient(&inputs.debts);
    let net_wealth = total_assets.checked_sub(total_debts)?;
    let is_wajib = net_wealth >= nisab_threshold;
    let payable_amount = if is_wajib {
        net_wealth.checked_mul(ZAKAT_RATE)?
    } else {
        Decimal::ZERO
    };

    Some(ZakatResult {
        metal: inputs.metal,
        rate_per_gram,
        bank_balance,
        weight_in_grams,
        jewelry_value,
        total_assets,
        total_debts,
        net_wealth,
        nisab_threshold,
        is_wajib,
        payable_amount,
    })
}

/// Sum of all Bank (including legacy wallet) balances right now.
pub fn bank_balance_total(conn: &Connection) -> Result<Decimal> {
    let accounts = ledger::query_accounts(conn)?;
    Ok(checked_sum(
        accounts
            .iter()
            .filter(|a| a.account_type.is_bank())
            .map(|a| a.current_balance),
        "bank total",
    )?)
}

/// Read the latest rate and bank total once, calculate, and record a snapshot
/// when the result could be assessed.
pub fn run(conn: &Connection, inputs: &ZakatInputs, now: DateTime<Utc>) -> Result<ZakatVerdict> {
    let rate = rates::latest(conn, inputs.metal)?;
    let bank_balance = bank_balance_total(conn)?;
    let verdict = calculate(inputs, rate.as_ref(), bank_balance);
    match &verdict {
        ZakatVerdict::Assessed(result) => {
            let id = record_snapshot(conn, &result.snapshot(now))?;
            info!(
                snapshot = id,
                wajib = result.is_wajib,
                payable = %result.payable_amount.round_dp(2),
                "zakat assessed"
            );
        }
        ZakatVerdict::NoRateAvailable { metal } => {
            info!(metal = metal.as_str(), "zakat skipped: no market rate");
        }
        ZakatVerdict::OutOfRange { metal } => {
            warn!(metal = metal.as_str(), "zakat skipped: entries out of range");
        }
    }
    Ok(verdict)
}

pub fn record_snapshot(conn: &Connection, snap: &ZakatSnapshot) -> Result<i64> {
    conn.execute(
        "INSERT INTO zakat_history(calculated_at, total_assets, total_debts, nisab_threshold, payable_amount)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fmt_instant(&snap.calculated_at),
            snap.total_assets.to_string(),
            snap.total_debts.to_string(),
            snap.nisab_threshold.to_string(),
            snap.payable_amount.to_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All snapshots, newest first.
pub fn history(conn: &Connection) -> Result<Vec<ZakatSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, calculated_at, total_assets, total_debts, nisab_threshold, payable_amount
         FROM zakat_history ORDER BY calculated_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, at, assets, debts, nisab, payable) = row?;
        let num = |s: &str| {
            s.parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}' in zakat history", s))
        };
        out.push(ZakatSnapshot {
            id: Some(id),
            calculated_at: parse_instant(&at)?,
            total_assets: num(&assets)?,
            total_debts: num(&debts)?,
            nisab_threshold: num(&nisab)?,
            payable_amount: num(&payable)?,
        });
    }
    Ok(out)
}

/// Step-by-step Zakat entry. Moving back keeps every input; moving forward out
/// of `Debts` runs the calculation.
#[derive(Debug, Clone)]
pub struct ZakatWizard {
    step: ZakatStep,
    pub inputs: ZakatInputs,
    verdict: Option<ZakatVerdict>,
}

impl ZakatWizard {
    pub fn new(inputs: ZakatInputs) -> Self {
        Self {
            step: ZakatStep::Nisab,
            inputs,
            verdict: None,
        }
    }

    pub fn step(&self) -> ZakatStep {
        self.step
    }

    /// The verdict of the last calculation, present only on the result step.
    pub fn verdict(&self) -> Option<&ZakatVerdict> {
        self.verdict.as_ref()
    }

    pub fn advance(&mut self, conn: &Connection, now: DateTime<Utc>) -> Result<ZakatStep> {
        let next = self.step.next().ok_or(HisaabError::InvalidStep {
            from: self.step.name(),
            to: "beyond result",
        })?;
        if next == ZakatStep::Result {
            self.verdict = Some(run(conn, &self.inputs, now)?);
        }
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Result<ZakatStep, HisaabError> {
        let prev = self.step.prev().ok_or(HisaabError::InvalidStep {
            from: self.step.name(),
            to: "before nisab",
        })?;
        self.go_to(prev)?;
        Ok(prev)
    }

    /// Jump to any earlier step.
    pub fn go_to(&mut self, target: ZakatStep) -> Result<(), HisaabError> {
        if target >= self.step {
            return Err(HisaabError::InvalidStep {
                from: self.step.name(),
                to: target.name(),
            });
        }
        self.step = target;
        self.verdict = None;
        Ok(())
    }
}
