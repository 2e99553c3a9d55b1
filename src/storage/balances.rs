//! Balance repository, backed by balances.json

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FintrackError;
use crate::models::AccountBalances;

use super::file_io::{read_json, write_json_atomic};

/// Holds the single balance record
pub struct BalanceRepository {
    path: PathBuf,
    data: RwLock<AccountBalances>,
}

impl BalanceRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(AccountBalances::default()),
        }
    }

    /// Load from disk; a missing file means all-zero balances
    pub fn load(&self) -> Result<(), FintrackError> {
        let balances: AccountBalances = read_json(&self.path)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = balances;
        Ok(())
    }

    pub fn save(&self) -> Result<(), FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        write_json_atomic(&self.path, &*data)
    }

    pub fn get(&self) -> Result<AccountBalances, FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(*data)
    }

    /// Replace the in-memory record; call `save` to persist
    pub fn set(&self, balances: AccountBalances) -> Result<(), FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = balances;
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
