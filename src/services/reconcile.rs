//! Balance reconciler
//!
//! Pure functions deriving new account balances from old ones. Nothing here
//! reads or writes storage; the ledger service decides when to persist.

use crate::error::{FintrackError, FintrackResult};
use crate::models::{AccountBalances, AccountKind, Money, Transaction, TransactionFlow};

/// Balances after `txn` is applied
///
/// Income adds to its account, expense subtracts from its account (balances
/// may go negative), and a transfer moves the amount between two accounts.
/// No funds check happens here; see [`ensure_sufficient_funds`].
///
/// Fails with `Validation` only when an account would leave the
/// `±Money::MAX_BALANCE` range.
pub fn apply_transaction(
    balances: &AccountBalances,
    txn: &Transaction,
) -> FintrackResult<AccountBalances> {
    shift(balances, &txn.flow, txn.amount)
}

/// Balances with `txn` undone; the exact inverse of [`apply_transaction`]
pub fn reverse_transaction(
    balances: &AccountBalances,
    txn: &Transaction,
) -> FintrackResult<AccountBalances> {
    let delta = Money::zero().checked_sub(txn.amount).ok_or_else(|| {
        FintrackError::Validation(format!("Cannot reverse amount {}", txn.amount))
    })?;
    shift(balances, &txn.flow, delta)
}

/// Reject a transfer whose source account cannot cover the amount
///
/// Income and expense always pass.
pub fn ensure_sufficient_funds(balances: &AccountBalances, txn: &Transaction) -> FintrackResult<()> {
    if let TransactionFlow::Transfer { from, .. } = txn.flow {
        let available = balances.get(from);
        if txn.amount > available {
            return Err(FintrackError::InsufficientFunds {
                account: from.to_string(),
                needed: txn.amount.cents(),
                available: available.cents(),
            });
        }
    }
    Ok(())
}

fn shift(
    balances: &AccountBalances,
    flow: &TransactionFlow,
    delta: Money,
) -> FintrackResult<AccountBalances> {
    match *flow {
        TransactionFlow::Income { account } => {
            let value = bounded(account, balances.get(account).checked_add(delta))?;
            Ok(balances.with(account, value))
        }
        TransactionFlow::Expense { account } => {
            let value = bounded(account, balances.get(account).checked_sub(delta))?;
            Ok(balances.with(account, value))
        }
        TransactionFlow::Transfer { from, to } => {
            let from_value = bounded(from, balances.get(from).checked_sub(delta))?;
            let to_value = bounded(to, balances.get(to).checked_add(delta))?;
            Ok(balances.with(from, from_value).with(to, to_value))
        }
    }
}

fn bounded(account: AccountKind, value: Option<Money>) -> FintrackResult<Money> {
    value
        .filter(|v| *v <= Money::MAX_BALANCE && *v >= -Money::MAX_BALANCE)
        .ok_or_else(|| {
            FintrackError::Validation(format!(
                "{} balance would exceed the limit of {}",
                account,
                Money::MAX_BALANCE
            ))
        })
}
