//! Account kinds and balances
//!
//! There are exactly three account buckets. Balances are a plain value type:
//! the reconciler derives a new one from the old one rather than mutating it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// One of the three fixed account buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Cash,
    Bank,
    Savings,
}

impl AccountKind {
    /// All account kinds in display order
    pub const ALL: [AccountKind; 3] = [AccountKind::Cash, AccountKind::Bank, AccountKind::Savings];

    /// Parse an account kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "savings" | "saving" => Some(Self::Savings),
            _ => None,
        }
    }

    /// Lowercase identifier, as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::Savings => "savings",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::Bank => write!(f, "Bank"),
            Self::Savings => write!(f, "Savings"),
        }
    }
}

/// Current balance of each account bucket
///
/// All three fields are always present and default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountBalances {
    #[serde(default)]
    pub cash: Money,
    #[serde(default)]
    pub bank: Money,
    #[serde(default)]
    pub savings: Money,
}

impl AccountBalances {
    pub fn new(cash: Money, bank: Money, savings: Money) -> Self {
        Self { cash, bank, savings }
    }

    /// Balance of a single account
    pub fn get(&self, kind: AccountKind) -> Money {
        match kind {
            AccountKind::Cash => self.cash,
            AccountKind::Bank => self.bank,
            AccountKind::Savings => self.savings,
        }
    }

    /// Copy of these balances with one account replaced
    #[must_use]
    pub fn with(mut self, kind: AccountKind, value: Money) -> Self {
        match kind {
            AccountKind::Cash => self.cash = value,
            AccountKind::Bank => self.bank = value,
            AccountKind::Savings => self.savings = value,
        }
        self
    }

    /// Sum across all three accounts
    pub fn total(&self) -> Money {
        self.cash + self.bank + self.savings
    }

    /// Iterate accounts with their balances in display order
    pub fn iter(&self) -> impl Iterator<Item = (AccountKind, Money)> + '_ {
        AccountKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}
