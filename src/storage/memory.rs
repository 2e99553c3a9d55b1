//! In-memory ledger store
//!
//! Useful for tests and for embedding the ledger without a data directory.
//! Individual operations can be made to fail to exercise rollback paths.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::audit::AuditEntry;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{AccountBalances, RecurringDefinition, Transaction, TransactionId};

use super::LedgerStore;

/// A store operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    SaveBalances,
    AppendTransaction,
    RemoveTransaction,
    AppendRecurring,
    UpdateRecurring,
}

#[derive(Debug, Default)]
struct Inner {
    balances: AccountBalances,
    transactions: Vec<Transaction>,
    recurring: Vec<RecurringDefinition>,
    audit: Vec<AuditEntry>,
    failing: HashSet<FailPoint>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with existing data
    pub fn with_data(
        balances: AccountBalances,
        transactions: Vec<Transaction>,
        recurring: Vec<RecurringDefinition>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                balances,
                transactions,
                recurring,
                ..Inner::default()
            }),
        }
    }

    /// Make `point` fail until `heal` is called
    pub fn fail(&self, point: FailPoint) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(point);
        }
    }

    pub fn heal(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.clear();
        }
    }

    /// Audit entries recorded so far
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner
            .lock()
            .map(|inner| inner.audit.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> FintrackResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire lock: {}", e)))
    }

    /// Lock, failing if `point` has been armed
    fn lock_for(&self, point: FailPoint) -> FintrackResult<MutexGuard<'_, Inner>> {
        let inner = self.lock()?;
        if inner.failing.contains(&point) {
            return Err(FintrackError::Storage(format!("injected failure: {:?}", point)));
        }
        Ok(inner)
    }
}

impl LedgerStore for MemoryStore {
    fn load_balances(&self) -> FintrackResult<AccountBalances> {
        Ok(self.lock()?.balances)
    }

    fn save_balances(&self, balances: &AccountBalances) -> FintrackResult<()> {
        self.lock_for(FailPoint::SaveBalances)?.balances = *balances;
        Ok(())
    }

    fn load_transactions(&self) -> FintrackResult<Vec<Transaction>> {
        Ok(self.lock()?.transactions.clone())
    }

    fn append_transaction(&self, txn: &Transaction) -> FintrackResult<()> {
        self.lock_for(FailPoint::AppendTransaction)?
            .transactions
            .push(txn.clone());
        Ok(())
    }

    fn remove_transaction(&self, id: TransactionId) -> FintrackResult<bool> {
        let mut inner = self.lock_for(FailPoint::RemoveTransaction)?;
        let before = inner.transactions.len();
        inner.transactions.retain(|t| t.id != id);
        Ok(inner.transactions.len() != before)
    }

    fn load_recurring(&self) -> FintrackResult<Vec<RecurringDefinition>> {
        Ok(self.lock()?.recurring.clone())
    }

    fn append_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()> {
        self.lock_for(FailPoint::AppendRecurring)?
            .recurring
            .push(def.clone());
        Ok(())
    }

    fn update_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()> {
        let mut inner = self.lock_for(FailPoint::UpdateRecurring)?;
        let slot = inner
            .recurring
            .iter_mut()
            .find(|d| d.id == def.id)
            .ok_or_else(|| FintrackError::recurring_not_found(def.id.to_string()))?;
        *slot = def.clone();
        Ok(())
    }

    fn audit(&self, entry: &AuditEntry) -> FintrackResult<()> {
        self.lock()?.audit.push(entry.clone());
        Ok(())
    }
}
