//! Core data models for fintrack
//!
//! Account balances, transactions and recurring transaction definitions.

pub mod account;
pub mod ids;
pub mod money;
pub mod recurring;
pub mod transaction;

pub use account::{AccountBalances, AccountKind};
pub use ids::{RecurringId, TransactionId};
pub use money::Money;
pub use recurring::{Frequency, RecurringDefinition, RecurringKind, RecurringValidationError};
pub use transaction::{
    Transaction, TransactionFlow, TransactionKind, TransactionValidationError, TRANSFER_CATEGORY,
};
