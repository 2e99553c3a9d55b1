//! Recurring definition repository, backed by recurring.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::FintrackError;
use crate::models::{RecurringDefinition, RecurringId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct RecurringData {
    recurring: Vec<RecurringDefinition>,
}

/// Repository for recurring definitions
///
/// Definitions keep their insertion order, which is the tie-break order for
/// upcoming occurrences.
pub struct RecurringRepository {
    path: PathBuf,
    data: RwLock<HashMap<RecurringId, RecurringDefinition>>,
    order: RwLock<Vec<RecurringId>>,
}

impl RecurringRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
        }
    }

    pub fn load(&self) -> Result<(), FintrackError> {
        let file_data: RecurringData = read_json(&self.path)?;
        self.replace_all(file_data.recurring)
    }

    pub fn save(&self) -> Result<(), FintrackError> {
        let recurring = self.get_all()?;
        write_json_atomic(&self.path, &RecurringData { recurring })
    }

    pub fn get(&self, id: RecurringId) -> Result<Option<RecurringDefinition>, FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.get(&id).cloned())
    }

    /// All definitions in insertion order
    pub fn get_all(&self) -> Result<Vec<RecurringDefinition>, FintrackError> {
        let data = self
            .data
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let order = self
            .order
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(order.iter().filter_map(|id| data.get(id).cloned()).collect())
    }

    /// Insert a new definition at the end, or replace one in place
    pub fn upsert(&self, def: RecurringDefinition) -> Result<(), FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut order = self
            .order
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if !data.contains_key(&def.id) {
            order.push(def.id);
        }
        data.insert(def.id, def);
        Ok(())
    }

    pub fn delete(&self, id: RecurringId) -> Result<bool, FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut order = self
            .order
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        order.retain(|&existing| existing != id);
        Ok(data.remove(&id).is_some())
    }

    pub fn replace_all(&self, defs: Vec<RecurringDefinition>) -> Result<(), FintrackError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut order = self
            .order
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        order.clear();
        for def in defs {
            if data.insert(def.id, def.clone()).is_none() {
                order.push(def.id);
            }
        }
        Ok(())
    }
}
