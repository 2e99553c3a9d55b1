//! Full ledger snapshot in JSON
//!
//! `FullExport` is also the shape read back by import, in JSON or YAML.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FintrackError, FintrackResult};
use crate::models::{AccountBalances, RecurringDefinition, Transaction};
use crate::services::LedgerState;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Complete ledger snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Version of fintrack that wrote the export
    pub app_version: String,

    pub balances: AccountBalances,

    pub transactions: Vec<Transaction>,

    pub recurring: Vec<RecurringDefinition>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,

    pub recurring_count: usize,

    pub active_recurring_count: usize,

    /// Earliest transaction date, if any
    pub earliest_transaction: Option<String>,

    /// Latest transaction date, if any
    pub latest_transaction: Option<String>,
}

impl FullExport {
    /// Snapshot the given ledger state
    pub fn from_state(state: &LedgerState) -> Self {
        let transactions = state.transactions.clone();
        let recurring = state.recurring.clone();

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            recurring_count: recurring.len(),
            active_recurring_count: recurring.iter().filter(|d| d.is_active).count(),
            earliest_transaction: transactions.iter().map(|t| t.date).min().map(|d| d.to_string()),
            latest_transaction: transactions.iter().map(|t| t.date).max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            balances: state.balances,
            transactions,
            recurring,
            metadata,
        }
    }

    /// Check schema version, record validity and references
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let mut recurring_ids = HashSet::new();
        for def in &self.recurring {
            def.validate()
                .map_err(|e| format!("Recurring transaction {}: {}", def.id, e))?;
            if !recurring_ids.insert(def.id) {
                return Err(format!("Recurring transaction {} appears twice", def.id));
            }
        }

        let mut transaction_ids = HashSet::new();
        let mut materialized = HashSet::new();
        for txn in &self.transactions {
            txn.validate()
                .map_err(|e| format!("Transaction {}: {}", txn.id, e))?;
            if !transaction_ids.insert(txn.id) {
                return Err(format!("Transaction {} appears twice", txn.id));
            }
            if let Some(source) = txn.recurring_id {
                if !recurring_ids.contains(&source) {
                    return Err(format!(
                        "Transaction {} references unknown recurring transaction {}",
                        txn.id, source
                    ));
                }
                if !materialized.insert((source, txn.date)) {
                    return Err(format!(
                        "Recurring transaction {} materialized twice on {}",
                        source, txn.date
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn into_state(self) -> LedgerState {
        LedgerState {
            balances: self.balances,
            transactions: self.transactions,
            recurring: self.recurring,
        }
    }
}

/// Write the ledger as JSON
pub fn export_full_json<W: Write>(
    state: &LedgerState,
    writer: &mut W,
    pretty: bool,
) -> FintrackResult<()> {
    let export = FullExport::from_state(state);

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| FintrackError::Export(e.to_string()))
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> FintrackResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| FintrackError::Import(e.to_string()))?;

    export.validate().map_err(FintrackError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKind, Money, RecurringKind};
    use crate::services::materialize_due;
    use chrono::NaiveDate;

    fn sample_state() -> LedgerState {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let def = RecurringDefinition::monthly(
            RecurringKind::Expense,
            Money::from_cents(120000),
            "Rent",
            AccountKind::Bank,
            1,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let mut transactions = materialize_due(&[def.clone()], &[], today);
        transactions.push(Transaction::income(
            AccountKind::Bank,
            Money::from_cents(300000),
            "Salary",
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
        ));

        LedgerState {
            balances: AccountBalances::default().with(AccountKind::Bank, Money::from_cents(180000)),
            transactions,
            recurring: vec![def],
        }
    }

    #[test]
    fn test_full_export_metadata() {
        let export = FullExport::from_state(&sample_state());

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.transaction_count, 2);
        assert_eq!(export.metadata.active_recurring_count, 1);
        assert_eq!(export.metadata.earliest_transaction.as_deref(), Some("2024-02-28"));
        assert_eq!(export.metadata.latest_transaction.as_deref(), Some("2024-03-01"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_json_import_restores_state() {
        let state = sample_state();
        let mut output = Vec::new();
        export_full_json(&state, &mut output, true).unwrap();

        let imported = import_from_json(&String::from_utf8(output).unwrap()).unwrap();
        assert_eq!(imported.into_state(), state);
    }

    #[test]
    fn test_dangling_recurring_reference_is_rejected() {
        let mut export = FullExport::from_state(&sample_state());
        export.recurring.clear();

        let err = export.validate().unwrap_err();
        assert!(err.contains("unknown recurring transaction"));
    }

    #[test]
    fn test_schema_mismatch_is_import_error() {
        let mut export = FullExport::from_state(&sample_state());
        export.schema_version = "0.1.0".into();
        let json = serde_json::to_string(&export).unwrap();

        let err = import_from_json(&json).unwrap_err();
        assert!(matches!(err, FintrackError::Import(_)));
    }
}
