//! Storage layer for fintrack
//!
//! `LedgerStore` is the persistence seam the ledger service commits through.
//! `Storage` implements it on JSON files with atomic writes; `MemoryStore`
//! keeps everything in memory and can be told to fail.

pub mod balances;
pub mod file_io;
pub mod init;
pub mod memory;
pub mod recurring;
pub mod transactions;

pub use balances::BalanceRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use memory::{FailPoint, MemoryStore};
pub use recurring::RecurringRepository;
pub use transactions::TransactionRepository;

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::FintrackPaths;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{AccountBalances, RecurringDefinition, Transaction, TransactionId};

/// Persistence collaborator for the ledger
///
/// Every call either succeeds or reports why it failed. Implementations do
/// not need to be transactional across calls; the ledger service compensates.
pub trait LedgerStore {
    fn load_balances(&self) -> FintrackResult<AccountBalances>;

    fn save_balances(&self, balances: &AccountBalances) -> FintrackResult<()>;

    fn load_transactions(&self) -> FintrackResult<Vec<Transaction>>;

    fn append_transaction(&self, txn: &Transaction) -> FintrackResult<()>;

    /// Remove a transaction; `Ok(false)` when it was not stored
    fn remove_transaction(&self, id: TransactionId) -> FintrackResult<bool>;

    fn load_recurring(&self) -> FintrackResult<Vec<RecurringDefinition>>;

    fn append_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()>;

    fn update_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()>;

    /// Record an audit entry; stores without an audit trail ignore it
    fn audit(&self, _entry: &AuditEntry) -> FintrackResult<()> {
        Ok(())
    }
}

/// JSON-file storage coordinator
pub struct Storage {
    paths: FintrackPaths,
    pub balances: BalanceRepository,
    pub transactions: TransactionRepository,
    pub recurring: RecurringRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a storage instance, creating the data directories if needed
    pub fn new(paths: FintrackPaths) -> Result<Self, FintrackError> {
        paths.ensure_directories()?;

        Ok(Self {
            balances: BalanceRepository::new(paths.balances_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            recurring: RecurringRepository::new(paths.recurring_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &FintrackPaths {
        &self.paths
    }

    pub fn audit_logger(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), FintrackError> {
        self.balances.load()?;
        self.transactions.load()?;
        self.recurring.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), FintrackError> {
        self.balances.save()?;
        self.transactions.save()?;
        self.recurring.save()?;
        Ok(())
    }

    /// Replace every stored record, e.g. from an import
    pub fn replace_all(
        &self,
        balances: AccountBalances,
        transactions: Vec<Transaction>,
        recurring: Vec<RecurringDefinition>,
    ) -> Result<(), FintrackError> {
        self.balances.set(balances)?;
        self.transactions.replace_all(transactions)?;
        self.recurring.replace_all(recurring)?;
        self.save_all()
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

impl LedgerStore for Storage {
    fn load_balances(&self) -> FintrackResult<AccountBalances> {
        self.balances.load()?;
        self.balances.get()
    }

    fn save_balances(&self, balances: &AccountBalances) -> FintrackResult<()> {
        let previous = self.balances.get()?;
        self.balances.set(*balances)?;
        if let Err(e) = self.balances.save() {
            self.balances.set(previous)?;
            return Err(e);
        }
        Ok(())
    }

    fn load_transactions(&self) -> FintrackResult<Vec<Transaction>> {
        self.transactions.load()?;
        self.transactions.get_all()
    }

    fn append_transaction(&self, txn: &Transaction) -> FintrackResult<()> {
        self.transactions.upsert(txn.clone())?;
        if let Err(e) = self.transactions.save() {
            self.transactions.delete(txn.id)?;
            return Err(e);
        }
        Ok(())
    }

    fn remove_transaction(&self, id: TransactionId) -> FintrackResult<bool> {
        let Some(previous) = self.transactions.get(id)? else {
            return Ok(false);
        };
        self.transactions.delete(id)?;
        if let Err(e) = self.transactions.save() {
            self.transactions.upsert(previous)?;
            return Err(e);
        }
        Ok(true)
    }

    fn load_recurring(&self) -> FintrackResult<Vec<RecurringDefinition>> {
        self.recurring.load()?;
        self.recurring.get_all()
    }

    fn append_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()> {
        self.recurring.upsert(def.clone())?;
        if let Err(e) = self.recurring.save() {
            self.recurring.delete(def.id)?;
            return Err(e);
        }
        Ok(())
    }

    fn update_recurring(&self, def: &RecurringDefinition) -> FintrackResult<()> {
        let previous = self
            .recurring
            .get(def.id)?
            .ok_or_else(|| FintrackError::recurring_not_found(def.id.to_string()))?;
        self.recurring.upsert(def.clone())?;
        if let Err(e) = self.recurring.save() {
            self.recurring.upsert(previous)?;
            return Err(e);
        }
        Ok(())
    }

    fn audit(&self, entry: &AuditEntry) -> FintrackResult<()> {
        self.audit.log(entry)
    }
}
