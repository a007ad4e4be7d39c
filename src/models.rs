// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HisaabError;

/// 1 tola = 11.664 grams.
pub const TOLA_GRAMS: Decimal = Decimal::from_parts(11664, 0, 0, false, 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Bank,
    CreditCard,
    /// Merged into `Bank`. Only ever read from old rows.
    Wallet,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::CreditCard => "CREDIT_CARD",
            Self::Wallet => "WALLET",
        }
    }

    /// Parse a stored column value. Accepts the legacy `WALLET` tag.
    pub fn from_stored(s: &str) -> Result<Self, HisaabError> {
        match s.trim().to_uppercase().as_str() {
            "BANK" => Ok(Self::Bank),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "WALLET" => Ok(Self::Wallet),
            other => Err(HisaabError::UnknownAccountType(other.to_string())),
        }
    }

    /// Parse user input for a new account. Wallet is not offered.
    pub fn for_new(s: &str) -> Result<Self, HisaabError> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "bank" => Ok(Self::Bank),
            "credit-card" | "card" | "creditcard" => Ok(Self::CreditCard),
            other => Err(HisaabError::UnknownAccountType(other.to_string())),
        }
    }

    /// One-way mapping of legacy tags onto current ones.
    pub fn normalized(self) -> Self {
        match self {
            Self::Wallet => Self::Bank,
            other => other,
        }
    }

    pub fn is_bank(&self) -> bool {
        matches!(self.normalized(), Self::Bank)
    }

    pub fn is_credit_card(&self) -> bool {
        matches!(self, Self::CreditCard)
    }

    pub fn label(&self) -> &'static str {
        match self.normalized() {
            Self::CreditCard => "credit card",
            _ => "bank",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub issuer: Option<String>,
    pub statement_day: Option<u32>,
    pub color: Option<String>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    /// Opening balance for Bank accounts, current outstanding for credit cards.
    pub amount: Decimal,
    pub issuer: Option<String>,
    pub statement_day: Option<u32>,
    pub color: Option<String>,
}

impl NewAccount {
    pub fn bank(name: impl Into<String>, opening: Decimal) -> Self {
        Self {
            name: name.into(),
            account_type: AccountType::Bank,
            amount: opening,
            issuer: None,
            statement_day: None,
            color: None,
        }
    }

    pub fn credit_card(name: impl Into<String>, outstanding: Decimal) -> Self {
        Self {
            name: name.into(),
            account_type: AccountType::CreditCard,
            amount: outstanding,
            issuer: None,
            statement_day: None,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnType {
    Debit,
    Credit,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }

    pub fn parse(s: &str) -> Result<Self, HisaabError> {
        match s.trim().to_uppercase().as_str() {
            "DEBIT" => Ok(Self::Debit),
            "CREDIT" => Ok(Self::Credit),
            other => Err(HisaabError::UnknownTxnType(other.to_string())),
        }
    }

    /// Signed effect on a Bank balance for a positive `amount`.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => -amount,
            Self::Credit => amount,
        }
    }
}

impl fmt::Display for TxnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub account_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub account_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit_amount: Decimal,
    pub icon: Option<String>,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit_amount: Decimal) -> Self {
        Self {
            category: category.into(),
            limit_amount,
            icon: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub saved_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "GOLD",
            Self::Silver => "SILVER",
        }
    }

    pub fn parse(s: &str) -> Result<Self, HisaabError> {
        match s.trim().to_uppercase().as_str() {
            "GOLD" => Ok(Self::Gold),
            "SILVER" => Ok(Self::Silver),
            other => Err(HisaabError::UnknownMetal(other.to_string())),
        }
    }

    pub fn all() -> [Metal; 2] {
        [Self::Gold, Self::Silver]
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeightUnit {
    Tola,
    Gram,
}

impl WeightUnit {
    pub fn parse(s: &str) -> Result<Self, HisaabError> {
        match s.trim().to_uppercase().as_str() {
            "TOLA" => Ok(Self::Tola),
            "GRAM" | "G" => Ok(Self::Gram),
            other => Err(HisaabError::UnknownUnit(other.to_string())),
        }
    }

    /// `None` if the weight is too large to convert.
    pub fn to_grams(&self, weight: Decimal) -> Option<Decimal> {
        match self {
            Self::Tola => weight.checked_mul(TOLA_GRAMS),
            Self::Gram => Some(weight),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRate {
    pub id: Option<i64>,
    pub metal: Metal,
    pub rate_per_gram: Decimal,
    pub rate_per_tola: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl MarketRate {
    pub fn from_per_gram(
        metal: Metal,
        rate_per_gram: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, HisaabError> {
        let rate_per_tola = rate_per_gram
            .checked_mul(TOLA_GRAMS)
            .ok_or(HisaabError::Overflow("rate per tola"))?;
        Ok(Self {
            id: None,
            metal,
            rate_per_gram,
            rate_per_tola,
            timestamp,
        })
    }

    /// Dividing by the tola weight only shrinks the value, so this cannot fail.
    pub fn from_per_tola(metal: Metal, rate_per_tola: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            metal,
            rate_per_gram: rate_per_tola / TOLA_GRAMS,
            rate_per_tola,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZakatSnapshot {
    pub id: Option<i64>,
    pub calculated_at: DateTime<Utc>,
    pub total_assets: Decimal,
    pub total_debts: Decimal,
    pub nisab_threshold: Decimal,
    pub payable_amount: Decimal,
}
