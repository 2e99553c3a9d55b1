//! Transaction repository, backed by transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FintrackError;
use crate::models::{Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transactions, keyed by id
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk, replacing what is in memory
    pub fn load(&self) -> Result<(), FintrackError> {
        let file_data: TransactionData = read_json(&self.path)?;
        self.replace_all(file_data.transactions)
    }

    /// Save transactions to disk, oldest first
    pub fn save(&self) -> Result<(), FintrackError> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.get(&id).cloned())
    }

    /// All transactions ordered by date, then creation time
    pub fn get_all(&self) -> Result<Vec<Transaction>, FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(transactions)
    }

    pub fn upsert(&self, txn: Transaction) -> Result<(), FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Remove a transaction; `false` when it was not present
    pub fn delete(&self, id: TransactionId) -> Result<bool, FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        Ok(data.remove(&id).is_some())
    }

    /// Replace every transaction in memory
    pub fn replace_all(&self, transactions: Vec<Transaction>) -> Result<(), FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = transactions.into_iter().map(|t| (t.id, t)).collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKind, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        (temp_dir, repo)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert!(repo.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload_keeps_date_order() {
        let (temp_dir, repo) = create_test_repo();
        let late = Transaction::expense(AccountKind::Cash, Money::from_cents(100), "Food", date(20));
        let early = Transaction::income(AccountKind::Bank, Money::from_cents(900), "Pay", date(1));

        repo.upsert(late.clone()).unwrap();
        repo.upsert(early.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        let all = reloaded.get_all().unwrap();
        assert_eq!(all, vec![early, late]);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = Transaction::expense(AccountKind::Bank, Money::from_cents(5000), "Rent", date(1));
        let id = txn.id;

        repo.upsert(txn).unwrap();
        assert!(repo.get(id).unwrap().is_some());

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert!(repo.get(id).unwrap().is_none());
    }
}
