//! Transaction model
//!
//! A transaction is immutable once recorded. Its `flow` says which account
//! buckets it touches: one for income and expense, two for a transfer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::AccountKind;
use super::ids::{RecurringId, TransactionId};
use super::money::Money;

/// Category assigned to transfers when the caller gives none
pub const TRANSFER_CATEGORY: &str = "Transfer";

/// The kind of a transaction, without its accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    /// Parse a transaction kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

/// Which account buckets a transaction moves money in or out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionFlow {
    Income {
        account: AccountKind,
    },
    Expense {
        account: AccountKind,
    },
    Transfer {
        #[serde(rename = "transfer_from")]
        from: AccountKind,
        #[serde(rename = "transfer_to")]
        to: AccountKind,
    },
}

impl TransactionFlow {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }
}

impl fmt::Display for TransactionFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income { account } => write!(f, "Income to {}", account),
            Self::Expense { account } => write!(f, "Expense from {}", account),
            Self::Transfer { from, to } => write!(f, "Transfer {} -> {}", from, to),
        }
    }
}

/// A recorded financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Accounts touched and direction
    pub flow: TransactionFlow,

    /// Always positive; the flow decides the sign applied to balances
    pub amount: Money,

    /// Free-text category label
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Calendar date the transaction applies to
    pub date: NaiveDate,

    /// Set when the transaction was materialized from a recurring definition
    #[serde(default)]
    pub is_recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<RecurringId>,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        flow: TransactionFlow,
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            flow,
            amount,
            category: category.into(),
            description: None,
            date,
            is_recurring: false,
            recurring_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn income(
        account: AccountKind,
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(TransactionFlow::Income { account }, amount, category, date)
    }

    pub fn expense(
        account: AccountKind,
        amount: Money,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(TransactionFlow::Expense { account }, amount, category, date)
    }

    pub fn transfer(from: AccountKind, to: AccountKind, amount: Money, date: NaiveDate) -> Self {
        Self::new(
            TransactionFlow::Transfer { from, to },
            amount,
            TRANSFER_CATEGORY,
            date,
        )
    }

    /// Attach a description, ignoring blank input
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        let trimmed = description.trim();
        self.description = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn kind(&self) -> TransactionKind {
        self.flow.kind()
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.flow, TransactionFlow::Transfer { .. })
    }

    /// Description, or an empty string
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }

        if let TransactionFlow::Transfer { from, to } = self.flow {
            if from == to {
                return Err(TransactionValidationError::TransferToSameAccount(from));
            }
        }

        if self.is_recurring && self.recurring_id.is_none() {
            return Err(TransactionValidationError::RecurringWithoutSource);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.flow,
            self.category,
            self.amount
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyCategory,
    TransferToSameAccount(AccountKind),
    RecurringWithoutSource,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Transaction amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Transaction amount {} exceeds the maximum of {}",
                amount,
                Money::MAX_AMOUNT
            ),
            Self::EmptyCategory => write!(f, "Transaction category cannot be empty"),
            Self::TransferToSameAccount(account) => {
                write!(f, "Cannot transfer from {} to itself", account)
            }
            Self::RecurringWithoutSource => {
                write!(f, "Recurring transaction has no recurring definition id")
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_income_constructor() {
        let txn = Transaction::income(
            AccountKind::Bank,
            Money::from_cents(150000),
            "Salary",
            date(2024, 3, 1),
        );

        assert_eq!(txn.kind(), TransactionKind::Income);
        assert_eq!(txn.flow, TransactionFlow::Income { account: AccountKind::Bank });
        assert!(!txn.is_recurring);
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_transfer_requires_distinct_accounts() {
        let txn = Transaction::transfer(
            AccountKind::Cash,
            AccountKind::Cash,
            Money::from_cents(100),
            date(2024, 3, 1),
        );
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::TransferToSameAccount(
                AccountKind::Cash
            ))
        );

        let ok = Transaction::transfer(
            AccountKind::Cash,
            AccountKind::Savings,
            Money::from_cents(100),
            date(2024, 3, 1),
        );
        assert!(ok.validate().is_ok());
        assert_eq!(ok.category, TRANSFER_CATEGORY);
        assert_eq!(ok.kind(), TransactionKind::Transfer);
    }

    #[test]
    fn test_rejects_amount_above_ceiling() {
        let huge = Transaction::income(
            AccountKind::Cash,
            Money::from_cents(Money::MAX_AMOUNT.cents() + 1),
            "Lottery",
            date(2024, 1, 1),
        );
        assert!(matches!(
            huge.validate(),
            Err(TransactionValidationError::AmountTooLarge(_))
        ));

        let at_ceiling =
            Transaction::income(AccountKind::Cash, Money::MAX_AMOUNT, "Lottery", date(2024, 1, 1));
        assert!(at_ceiling.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_amount_and_blank_category() {
        let zero = Transaction::expense(AccountKind::Cash, Money::zero(), "Food", date(2024, 1, 1));
        assert!(matches!(
            zero.validate(),
            Err(TransactionValidationError::NonPositiveAmount(_))
        ));

        let blank = Transaction::expense(
            AccountKind::Cash,
            Money::from_cents(100),
            "   ",
            date(2024, 1, 1),
        );
        assert_eq!(
            blank.validate(),
            Err(TransactionValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_blank_description_is_dropped() {
        let txn = Transaction::expense(
            AccountKind::Cash,
            Money::from_cents(100),
            "Food",
            date(2024, 1, 1),
        )
        .with_description("  ");
        assert!(txn.description.is_none());
        assert_eq!(txn.description_or_empty(), "");
    }

    #[test]
    fn test_flow_serialization_shape() {
        let txn = Transaction::transfer(
            AccountKind::Bank,
            AccountKind::Savings,
            Money::from_cents(2500),
            date(2024, 3, 1),
        );
        let value = serde_json::to_value(&txn).unwrap();

        assert_eq!(value["flow"]["type"], "transfer");
        assert_eq!(value["flow"]["transfer_from"], "bank");
        assert_eq!(value["flow"]["transfer_to"], "savings");
        assert_eq!(value["amount"], 2500);

        let back: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(back, txn);
    }
}
