// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed ledger of accounts, transactions, budgets and savings goals.
//!
//! Every write that moves a balance runs inside one IMMEDIATE transaction, so
//! concurrent postings from ingestion and manual entry serialize on the store
//! and never interleave a partial balance update.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::HisaabError;
use crate::models::{
    Account, AccountType, Budget, Goal, NewAccount, NewTransaction, Transaction, TxnType,
};
use crate::utils::{checked_sum, fmt_instant, parse_instant};

fn dec(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}'", what, s))
}

// ── Accounts ──────────────────────────────────────────────

const ACCOUNT_COLS: &str =
    "id, name, account_type, initial_balance, current_balance, issuer, statement_day, color";

struct AccountRow {
    id: i64,
    name: String,
    account_type: String,
    initial_balance: String,
    current_balance: String,
    issuer: Option<String>,
    statement_day: Option<u32>,
    color: Option<String>,
}

fn read_account(r: &rusqlite::Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: r.get(0)?,
        name: r.get(1)?,
        account_type: r.get(2)?,
        initial_balance: r.get(3)?,
        current_balance: r.get(4)?,
        issuer: r.get(5)?,
        statement_day: r.get(6)?,
        color: r.get(7)?,
    })
}

impl AccountRow {
    fn into_account(self) -> Result<Account> {
        Ok(Account {
            account_type: AccountType::from_stored(&self.account_type)?.normalized(),
            initial_balance: dec(&self.initial_balance, "initial balance")?,
            current_balance: dec(&self.current_balance, "current balance")?,
            id: self.id,
            name: self.name,
            issuer: self.issuer,
            statement_day: self.statement_day,
            color: self.color,
        })
    }
}

pub fn create_account(conn: &Connection, new: &NewAccount) -> Result<i64> {
    let name = new.name.trim();
    if name.is_empty() {
        anyhow::bail!("Account name must not be empty");
    }
    let account_type = new.account_type.normalized();
    let (initial, current) = match account_type {
        AccountType::CreditCard => (Decimal::ZERO, -new.amount.abs()),
        _ => (new.amount, new.amount),
    };
    conn.execute(
        "INSERT INTO accounts(name, account_type, initial_balance, current_balance, issuer, statement_day, color)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            name,
            account_type.as_str(),
            initial.to_string(),
            current.to_string(),
            new.issuer,
            new.statement_day,
            new.color
        ],
    )
    .with_context(|| format!("Create account '{}'", name))?;
    let id = conn.last_insert_rowid();
    info!(account = name, kind = account_type.as_str(), "account created");
    Ok(id)
}

pub fn query_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("SELECT {ACCOUNT_COLS} FROM accounts ORDER BY name"))?;
    let rows = stmt.query_map([], read_account)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_account()?);
    }
    Ok(out)
}

pub fn find_account(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE name=?1"),
            params![name.trim()],
            read_account,
        )
        .optional()?;
    row.map(AccountRow::into_account).transpose()
}

pub fn account_by_name(conn: &Connection, name: &str) -> Result<Account> {
    find_account(conn, name)?.ok_or_else(|| HisaabError::AccountNotFound(name.trim().to_string()).into())
}

pub fn account_by_id(conn: &Connection, id: i64) -> Result<Account> {
    let row = conn
        .query_row(
            &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE id=?1"),
            params![id],
            read_account,
        )
        .optional()?;
    row.map(AccountRow::into_account)
        .transpose()?
        .ok_or_else(|| HisaabError::AccountNotFound(format!("#{}", id)).into())
}

fn wrong_kind(account: &Account, operation: &'static str, expected: &'static str) -> HisaabError {
    HisaabError::WrongAccountKind {
        account: account.name.clone(),
        operation,
        expected,
        actual: account.account_type.label(),
    }
}

/// Change a Bank account's opening balance. The current balance moves by the
/// same delta so transaction history is preserved.
pub fn edit_initial_balance(conn: &mut Connection, name: &str, new_initial: Decimal) -> Result<Account> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let account = account_by_name(&tx, name)?;
    if !account.account_type.is_bank() {
        return Err(wrong_kind(&account, "editing the opening balance", "bank").into());
    }
    let current = new_initial
        .checked_sub(account.initial_balance)
        .and_then(|delta| account.current_balance.checked_add(delta))
        .ok_or(HisaabError::Overflow("account balance"))?;
    tx.execute(
        "UPDATE accounts SET account_type='BANK', initial_balance=?1, current_balance=?2 WHERE id=?3",
        params![new_initial.to_string(), current.to_string(), account.id],
    )?;
    tx.commit()?;
    info!(account = %account.name, initial = %new_initial, "opening balance edited");
    account_by_id(conn, account.id)
}

/// Record a credit card's current outstanding. Stored as a non-positive balance.
pub fn set_outstanding(conn: &Connection, name: &str, outstanding: Decimal) -> Result<Account> {
    let account = account_by_name(conn, name)?;
    if !account.account_type.is_credit_card() {
        return Err(wrong_kind(&account, "setting the outstanding", "credit card").into());
    }
    let balance = -outstanding.abs();
    conn.execute(
        "UPDATE accounts SET current_balance=?1 WHERE id=?2",
        params![balance.to_string(), account.id],
    )?;
    account_by_id(conn, account.id)
}

pub fn rename_account(conn: &Connection, name: &str, new_name: &str) -> Result<()> {
    let account = account_by_name(conn, name)?;
    let new_name = new_name.trim();
    if new_name.is_empty() {
        anyhow::bail!("Account name must not be empty");
    }
    conn.execute(
        "UPDATE accounts SET name=?1 WHERE id=?2",
        params![new_name, account.id],
    )
    .with_context(|| format!("Rename account '{}' to '{}'", account.name, new_name))?;
    Ok(())
}

/// Delete an account and, by cascade, its transactions. Returns the number of
/// transactions removed.
pub fn delete_account(conn: &mut Connection, name: &str) -> Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let account = account_by_name(&tx, name)?;
    let txns: i64 = tx.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1",
        params![account.id],
        |r| r.get(0),
    )?;
    tx.execute("DELETE FROM transactions WHERE account_id=?1", params![account.id])?;
    tx.execute("DELETE FROM accounts WHERE id=?1", params![account.id])?;
    tx.commit()?;
    info!(account = %account.name, transactions = txns, "account deleted");
    Ok(txns as usize)
}

// ── Transactions ──────────────────────────────────────────

/// Apply (or undo) a transaction's effect on its account. Credit card balances
/// are user-entered and never derived from postings.
fn apply_effect(
    tx: &rusqlite::Transaction<'_>,
    account_id: i64,
    txn_type: TxnType,
    amount: Decimal,
    undo: bool,
) -> Result<()> {
    let (kind, current): (String, String) = tx
        .query_row(
            "SELECT account_type, current_balance FROM accounts WHERE id=?1",
            params![account_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| HisaabError::AccountNotFound(format!("#{}", account_id)))?;
    if !AccountType::from_stored(&kind)?.is_bank() {
        return Ok(());
    }
    let mut delta = txn_type.signed(amount);
    if undo {
        delta = -delta;
    }
    let updated = dec(&current, "current balance")?
        .checked_add(delta)
        .ok_or(HisaabError::Overflow("account balance"))?;
    tx.execute(
        "UPDATE accounts SET current_balance=?1 WHERE id=?2",
        params![updated.to_string(), account_id],
    )?;
    Ok(())
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(HisaabError::NonPositiveAmount(amount).into());
    }
    Ok(())
}

pub fn insert_transaction(conn: &mut Connection, new: &NewTransaction) -> Result<i64> {
    check_amount(new.amount)?;
    let category = new.category.trim();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    apply_effect(&tx, new.account_id, new.txn_type, new.amount, false)?;
    tx.execute(
        "INSERT INTO transactions(amount, txn_type, category, timestamp, account_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.amount.to_string(),
            new.txn_type.as_str(),
            category,
            fmt_instant(&new.timestamp),
            new.account_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    debug!(id, account_id = new.account_id, amount = %new.amount, kind = new.txn_type.as_str(), category, "transaction posted");
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let row = conn
        .query_row(
            &format!("SELECT {TXN_COLS} FROM transactions WHERE id=?1"),
            params![id],
            read_txn,
        )
        .optional()?;
    row.map(TxnRow::into_txn)
        .transpose()?
        .ok_or_else(|| HisaabError::TransactionNotFound(id).into())
}

/// Replace a transaction in place: the old balance effect is undone and the new
/// one applied in the same commit.
pub fn update_transaction(conn: &mut Connection, id: i64, new: &NewTransaction) -> Result<()> {
    check_amount(new.amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_transaction(&tx, id)?;
    apply_effect(&tx, old.account_id, old.txn_type, old.amount, true)?;
    apply_effect(&tx, new.account_id, new.txn_type, new.amount, false)?;
    tx.execute(
        "UPDATE transactions SET amount=?1, txn_type=?2, category=?3, timestamp=?4, account_id=?5 WHERE id=?6",
        params![
            new.amount.to_string(),
            new.txn_type.as_str(),
            new.category.trim(),
            fmt_instant(&new.timestamp),
            new.account_id,
            id
        ],
    )?;
    tx.commit()?;
    debug!(id, "transaction updated");
    Ok(())
}

pub fn delete_transaction(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let old = get_transaction(&tx, id)?;
    apply_effect(&tx, old.account_id, old.txn_type, old.amount, true)?;
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    tx.commit()?;
    debug!(id, "transaction deleted");
    Ok(())
}

const TXN_COLS: &str = "id, amount, txn_type, category, timestamp, account_id";

struct TxnRow {
    id: i64,
    amount: String,
    txn_type: String,
    category: String,
    timestamp: String,
    account_id: i64,
}

fn read_txn(r: &rusqlite::Row<'_>) -> rusqlite::Result<TxnRow> {
    Ok(TxnRow {
        id: r.get(0)?,
        amount: r.get(1)?,
        txn_type: r.get(2)?,
        category: r.get(3)?,
        timestamp: r.get(4)?,
        account_id: r.get(5)?,
    })
}

impl TxnRow {
    fn into_txn(self) -> Result<Transaction> {
        Ok(Transaction {
            id: self.id,
            amount: dec(&self.amount, "amount")?,
            txn_type: TxnType::parse(&self.txn_type)?,
            category: self.category,
            timestamp: parse_instant(&self.timestamp)?,
            account_id: self.account_id,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TxnFilter {
    pub account_id: Option<i64>,
    pub category: Option<String>,
    pub txn_type: Option<TxnType>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Transactions matching `filter`, newest first. `start`/`end` are inclusive.
pub fn query_transactions(conn: &Connection, filter: &TxnFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {TXN_COLS} FROM transactions WHERE 1=1");
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(id) = filter.account_id {
        sql.push_str(" AND account_id=?");
        params_vec.push(id.to_string());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND category=?");
        params_vec.push(cat.trim().to_string());
    }
    if let Some(kind) = filter.txn_type {
        sql.push_str(" AND txn_type=?");
        params_vec.push(kind.as_str().to_string());
    }
    if let Some(start) = &filter.start {
        sql.push_str(" AND timestamp>=?");
        params_vec.push(fmt_instant(start));
    }
    if let Some(end) = &filter.end {
        sql.push_str(" AND timestamp<=?");
        params_vec.push(fmt_instant(end));
    }
    sql.push_str(" ORDER BY timestamp DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), read_txn)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_txn()?);
    }
    Ok(out)
}

// ── Budgets ───────────────────────────────────────────────

pub fn upsert_budget(conn: &Connection, budget: &Budget) -> Result<()> {
    let category = budget.category.trim();
    if category.is_empty() {
        anyhow::bail!("Budget category must not be empty");
    }
    if budget.limit_amount <= Decimal::ZERO {
        return Err(HisaabError::NonPositiveLimit(budget.limit_amount).into());
    }
    conn.execute(
        "INSERT INTO budgets(category, limit_amount, icon) VALUES (?1, ?2, ?3)
         ON CONFLICT(category) DO UPDATE SET limit_amount=excluded.limit_amount, icon=excluded.icon",
        params![category, budget.limit_amount.to_string(), budget.icon],
    )?;
    Ok(())
}

pub fn delete_budget(conn: &Connection, category: &str) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM budgets WHERE category=?1",
        params![category.trim()],
    )?;
    if n == 0 {
        return Err(HisaabError::BudgetNotFound(category.trim().to_string()).into());
    }
    Ok(())
}

pub fn query_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt =
        conn.prepare("SELECT category, limit_amount, icon FROM budgets ORDER BY category")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (category, limit, icon) = row?;
        out.push(Budget {
            limit_amount: dec(&limit, "budget limit")?,
            category,
            icon,
        });
    }
    Ok(out)
}

// ── Savings goals ─────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

pub fn add_goal(conn: &Connection, goal: &NewGoal) -> Result<i64> {
    let name = goal.name.trim();
    if name.is_empty() {
        anyhow::bail!("Goal name must not be empty");
    }
    check_amount(goal.target_amount)?;
    conn.execute(
        "INSERT INTO goals(name, target_amount, saved_amount, deadline, icon, color)
         VALUES (?1, ?2, '0', ?3, ?4, ?5)",
        params![
            name,
            goal.target_amount.to_string(),
            goal.deadline.map(|d| d.to_string()),
            goal.icon,
            goal.color
        ],
    )
    .with_context(|| format!("Create goal '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

const GOAL_COLS: &str = "id, name, target_amount, saved_amount, deadline, icon, color";

fn read_goal(r: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, String, Option<String>, Option<String>, Option<String>)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?, r.get(6)?))
}

fn into_goal(
    (id, name, target, saved, deadline, icon, color): (i64, String, String, String, Option<String>, Option<String>, Option<String>),
) -> Result<Goal> {
    let deadline = match deadline {
        Some(d) => Some(
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .with_context(|| format!("Invalid goal deadline '{}'", d))?,
        ),
        None => None,
    };
    Ok(Goal {
        id,
        name,
        target_amount: dec(&target, "goal target")?,
        saved_amount: dec(&saved, "goal saved amount")?,
        deadline,
        icon,
        color,
    })
}

pub fn goal_by_name(conn: &Connection, name: &str) -> Result<Goal> {
    let row = conn
        .query_row(
            &format!("SELECT {GOAL_COLS} FROM goals WHERE name=?1"),
            params![name.trim()],
            read_goal,
        )
        .optional()?;
    row.map(into_goal)
        .transpose()?
        .ok_or_else(|| HisaabError::GoalNotFound(name.trim().to_string()).into())
}

pub fn query_goals(conn: &Connection) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(&format!("SELECT {GOAL_COLS} FROM goals ORDER BY name"))?;
    let rows = stmt.query_map([], read_goal)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_goal(row?)?);
    }
    Ok(out)
}

/// Add to a goal's saved amount. The flag is true when this top-up is the one
/// that reached the target.
pub fn top_up_goal(conn: &mut Connection, name: &str, amount: Decimal) -> Result<(Goal, bool)> {
    check_amount(amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let goal = goal_by_name(&tx, name)?;
    let saved = goal
        .saved_amount
        .checked_add(amount)
        .ok_or(HisaabError::Overflow("goal savings"))?;
    tx.execute(
        "UPDATE goals SET saved_amount=?1 WHERE id=?2",
        params![saved.to_string(), goal.id],
    )?;
    tx.commit()?;
    let reached = saved >= goal.target_amount && goal.saved_amount < goal.target_amount;
    let updated = goal_by_name(conn, name)?;
    Ok((updated, reached))
}

/// Take money out of a goal. The saved amount never drops below zero.
pub fn withdraw_from_goal(conn: &mut Connection, name: &str, amount: Decimal) -> Result<Goal> {
    check_amount(amount)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let goal = goal_by_name(&tx, name)?;
    let saved = (goal.saved_amount - amount).max(Decimal::ZERO);
    tx.execute(
        "UPDATE goals SET saved_amount=?1 WHERE id=?2",
        params![saved.to_string(), goal.id],
    )?;
    tx.commit()?;
    goal_by_name(conn, name)
}

pub fn delete_goal(conn: &Connection, name: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM goals WHERE name=?1", params![name.trim()])?;
    if n == 0 {
        return Err(HisaabError::GoalNotFound(name.trim().to_string()).into());
    }
    Ok(())
}

pub fn total_saved(conn: &Connection) -> Result<Decimal> {
    Ok(checked_sum(
        query_goals(conn)?.iter().map(|g| g.saved_amount),
        "goal savings",
    )?)
}
