// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived figures over a ledger snapshot.
//!
//! Nothing here is cached. Each figure is recomputed from the `Snapshot` it is
//! given, so a caller that has seen a write reloads the snapshot and asks again.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::HisaabError;
use crate::ledger::{self, TxnFilter};
use crate::models::{Account, Budget, Goal, Transaction, TxnType};
use crate::utils::checked_sum;

/// A consistent read of everything the aggregates depend on.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub goals: Vec<Goal>,
}

impl Snapshot {
    /// Read all four tables inside one read transaction.
    pub fn load(conn: &Connection) -> Result<Self> {
        let tx = conn.unchecked_transaction()?;
        let snapshot = Snapshot {
            accounts: ledger::query_accounts(&tx)?,
            transactions: ledger::query_transactions(&tx, &TxnFilter::default())?,
            budgets: ledger::query_budgets(&tx)?,
            goals: ledger::query_goals(&tx)?,
        };
        tx.commit()?;
        Ok(snapshot)
    }

    fn in_window<'a>(
        &'a self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| t.timestamp >= start && t.timestamp <= end)
    }
}

/// Sum of every account's current balance. Credit cards contribute their
/// (non-positive) balance.
pub fn net_balance(snapshot: &Snapshot) -> Result<Decimal> {
    Ok(checked_sum(
        snapshot.accounts.iter().map(|a| a.current_balance),
        "net balance",
    )?)
}

fn add(acc: &mut Decimal, amount: Decimal, what: &'static str) -> Result<(), HisaabError> {
    *acc = acc.checked_add(amount).ok_or(HisaabError::Overflow(what))?;
    Ok(())
}

/// Debit totals per category for transactions in `[start, end]`.
pub fn category_spend(
    snapshot: &Snapshot,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<BTreeMap<String, Decimal>> {
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in snapshot
        .in_window(start, end)
        .filter(|t| t.txn_type == TxnType::Debit)
    {
        add(out.entry(t.category.clone()).or_insert(Decimal::ZERO), t.amount, "category spend")?;
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CashFlow {
    pub income: Decimal,
    pub expense: Decimal,
}

impl CashFlow {
    /// Both sides are sums of positive amounts, so the difference stays in range.
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

pub fn cash_flow(snapshot: &Snapshot, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<CashFlow> {
    let mut flow = CashFlow::default();
    for t in snapshot.in_window(start, end) {
        match t.txn_type {
            TxnType::Credit => add(&mut flow.income, t.amount, "income")?,
            TxnType::Debit => add(&mut flow.expense, t.amount, "expense")?,
        }
    }
    Ok(flow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetTier {
    Normal,
    Warning,
    Over,
}

impl BudgetTier {
    pub fn for_progress(progress: Decimal) -> Self {
        if progress < Decimal::new(5, 1) {
            Self::Normal
        } else if progress < Decimal::new(8, 1) {
            Self::Warning
        } else {
            Self::Over
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub progress: Decimal,
    pub tier: BudgetTier,
}

/// Fraction of `limit` consumed, clamped to `[0, 1]`. A non-positive limit is
/// fully consumed as soon as anything is spent.
pub fn progress(spent: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return if spent > Decimal::ZERO {
            Decimal::ONE
        } else {
            Decimal::ZERO
        };
    }
    // A quotient too large to represent is far past the limit.
    spent
        .checked_div(limit)
        .unwrap_or(Decimal::ONE)
        .clamp(Decimal::ZERO, Decimal::ONE)
}

/// Progress of every budget against debits in `[start, end]`, ordered by
/// category.
pub fn budget_progress(
    snapshot: &Snapshot,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<BudgetProgress>> {
    let spend = category_spend(snapshot, start, end)?;
    let out: Vec<BudgetProgress> = snapshot
        .budgets
        .iter()
        .map(|b| {
            let spent = spend.get(&b.category).copied().unwrap_or(Decimal::ZERO);
            let p = progress(spent, b.limit_amount);
            BudgetProgress {
                category: b.category.clone(),
                limit: b.limit_amount,
                spent,
                remaining: b.limit_amount - spent,
                progress: p,
                tier: BudgetTier::for_progress(p),
            }
        })
        .collect();
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeToSpend {
    pub bank_total: Decimal,
    pub budgeted: Decimal,
    pub card_outstanding: Decimal,
    pub goal_savings: Decimal,
    pub amount: Decimal,
}

/// Bank balances, less budget limits, card liabilities and goal savings.
pub fn safe_to_spend_breakdown(snapshot: &Snapshot) -> Result<SafeToSpend> {
    let bank_total = checked_sum(
        snapshot
            .accounts
            .iter()
            .filter(|a| a.account_type.is_bank())
            .map(|a| a.current_balance),
        "bank total",
    )?;
    let card_outstanding = checked_sum(
        snapshot
            .accounts
            .iter()
            .filter(|a| a.account_type.is_credit_card())
            .map(|a| a.current_balance.abs()),
        "card outstanding",
    )?;
    let budgeted = checked_sum(snapshot.budgets.iter().map(|b| b.limit_amount), "budgeted total")?;
    let goal_savings = checked_sum(snapshot.goals.iter().map(|g| g.saved_amount), "goal savings")?;
    let amount = bank_total
        .checked_sub(budgeted)
        .and_then(|d| d.checked_sub(card_outstanding))
        .and_then(|d| d.checked_sub(goal_savings))
        .ok_or(HisaabError::Overflow("safe-to-spend"))?;
    Ok(SafeToSpend {
        bank_total,
        budgeted,
        card_outstanding,
        goal_savings,
        amount,
    })
}

pub fn safe_to_spend(snapshot: &Snapshot) -> Result<Decimal> {
    Ok(safe_to_spend_breakdown(snapshot)?.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn progress_with_zero_limit_does_not_divide() {
        assert_eq!(progress(dec!(50), Decimal::ZERO), Decimal::ONE);
        assert_eq!(progress(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(progress(dec!(10), dec!(-5)), Decimal::ONE);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress(dec!(150), dec!(100)), Decimal::ONE);
        assert_eq!(progress(dec!(25), dec!(100)), dec!(0.25));
    }

    #[test]
    fn progress_survives_a_tiny_limit() {
        assert_eq!(progress(Decimal::MAX, dec!(0.0000001)), Decimal::ONE);
    }

    #[test]
    fn tiers_follow_thresholds() {
        assert_eq!(BudgetTier::for_progress(dec!(0.49)), BudgetTier::Normal);
        assert_eq!(BudgetTier::for_progress(dec!(0.5)), BudgetTier::Warning);
        assert_eq!(BudgetTier::for_progress(dec!(0.79)), BudgetTier::Warning);
        assert_eq!(BudgetTier::for_progress(dec!(0.8)), BudgetTier::Over);
        assert_eq!(BudgetTier::for_progress(Decimal::ONE), BudgetTier::Over);
    }
}
