// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HisaabError {
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Transaction {0} not found")]
    TransactionNotFound(i64),

    #[error("Goal '{0}' not found")]
    GoalNotFound(String),

    #[error("Budget for '{0}' not found")]
    BudgetNotFound(String),

    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Budget limit must be greater than zero, got {0}")]
    NonPositiveLimit(Decimal),

    #[error("Market rate must be greater than zero, got {0}")]
    InvalidRate(Decimal),

    #[error("Account '{account}' is a {actual} account; {operation} needs a {expected} account")]
    WrongAccountKind {
        account: String,
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unknown account type '{0}' (use bank|credit-card)")]
    UnknownAccountType(String),

    #[error("Unknown transaction type '{0}' (use debit|credit)")]
    UnknownTxnType(String),

    #[error("Unknown metal '{0}' (use gold|silver)")]
    UnknownMetal(String),

    #[error("Unknown weight unit '{0}' (use tola|gram)")]
    UnknownUnit(String),

    #[error("Cannot move wizard from {from} to {to}")]
    InvalidStep {
        from: &'static str,
        to: &'static str,
    },

    #[error("{0} is too large to compute")]
    Overflow(&'static str),

    #[error("Invalid stored instant '{0}'")]
    InvalidInstant(String),
}
