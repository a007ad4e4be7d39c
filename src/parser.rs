// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Extracts transactions from payment-app notification text.
//!
//! Classification is table driven: each known source app maps to a display
//! name and an ordered list of templates. Adding a provider is adding a row.
//! Anything that does not match, or yields a non-positive amount, is `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TxnType;

pub const EASYPAISA_APP_ID: &str = "com.telenor.pakistan.easypaisa";
pub const JAZZCASH_APP_ID: &str = "com.techlogix.mobilinkcustomer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTransaction {
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub category: String,
    pub provider: &'static str,
}

#[derive(Debug, Clone, Copy)]
enum Template {
    /// "sent Rs. 1,500 to Ali via ..." -> Debit, category "<Provider> - <recipient>".
    OutboundTransfer,
    /// Any text mentioning "received" with a currency-marked amount -> Credit.
    Received,
}

pub struct Provider {
    pub app_id: &'static str,
    pub display_name: &'static str,
    templates: &'static [Template],
}

const WALLET_TEMPLATES: &[Template] = &[Template::OutboundTransfer, Template::Received];

static PROVIDERS: &[Provider] = &[
    Provider {
        app_id: EASYPAISA_APP_ID,
        display_name: "Easypaisa",
        templates: WALLET_TEMPLATES,
    },
    Provider {
        app_id: JAZZCASH_APP_ID,
        display_name: "JazzCash",
        templates: WALLET_TEMPLATES,
    },
];

// Compiled once. A template that fails to compile matches nothing.
static OUTBOUND_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)sent.*?(?:(?:rs\.?|pkr)\s*)?(\d[\d,]*(?:\.\d{2})?).*?to\s+([a-z\s]+)\s+via").ok()
});

static MARKED_AMOUNT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)(?:rs\.?|pkr)\s*(\d[\d,]*(?:\.\d{2})?)").ok());

pub fn providers() -> &'static [Provider] {
    PROVIDERS
}

pub fn provider_for(app_id: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.app_id == app_id.trim())
}

/// Strip thousands separators and parse. Zero, negative or garbage is `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    raw.replace(',', "")
        .parse::<Decimal>()
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

enum Attempt {
    /// Template does not apply; try the next one.
    Skip,
    /// Template applied but produced no usable amount; stop.
    Rejected,
    Parsed(ParsedTransaction),
}

/// Classify one notification. Unknown sources are rejected without looking at
/// the text.
pub fn parse(source_app_id: &str, raw_text: &str) -> Option<ParsedTransaction> {
    let provider = provider_for(source_app_id)?;
    for template in provider.templates {
        match apply(*template, provider, raw_text) {
            Attempt::Skip => continue,
            Attempt::Rejected => return None,
            Attempt::Parsed(parsed) => return Some(parsed),
        }
    }
    None
}

fn apply(template: Template, provider: &'static Provider, text: &str) -> Attempt {
    match template {
        Template::OutboundTransfer => {
            let Some(caps) = OUTBOUND_RE.as_ref().and_then(|re| re.captures(text)) else {
                return Attempt::Skip;
            };
            let Some(amount) = caps.get(1).and_then(|m| parse_amount(m.as_str())) else {
                return Attempt::Rejected;
            };
            let recipient = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let category = if recipient.is_empty() {
                provider.display_name.to_string()
            } else {
                format!("{} - {}", provider.display_name, recipient)
            };
            Attempt::Parsed(ParsedTransaction {
                amount,
                txn_type: TxnType::Debit,
                category,
                provider: provider.display_name,
            })
        }
        Template::Received => {
            if !text.to_lowercase().contains("received") {
                return Attempt::Skip;
            }
            let amount = MARKED_AMOUNT_RE
                .as_ref()
                .and_then(|re| re.captures(text))
                .and_then(|c| c.get(1))
                .and_then(|m| parse_amount(m.as_str()));
            match amount {
                Some(amount) => Attempt::Parsed(ParsedTransaction {
                    amount,
                    txn_type: TxnType::Credit,
                    category: provider.display_name.to_string(),
                    provider: provider.display_name,
                }),
                None => Attempt::Rejected,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_strips_separators() {
        assert_eq!(parse_amount("12,500.50"), Some(dec!(12500.50)));
        assert_eq!(parse_amount("1,000"), Some(dec!(1000)));
    }

    #[test]
    fn amount_rejects_zero_and_junk() {
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("0,000.00"), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn every_provider_has_templates() {
        for p in providers() {
            assert!(!p.templates.is_empty(), "{} has no templates", p.display_name);
        }
    }
}
