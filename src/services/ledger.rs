//! Ledger service
//!
//! Owns the in-memory ledger (balances, transaction log, recurring
//! definitions) and commits every change through a `LedgerStore`.
//!
//! Commits are optimistic: the in-memory state is updated first, then the
//! store is called. If any store call fails the in-memory state is restored,
//! any store write that already succeeded is undone on a best-effort basis,
//! and the caller gets `FintrackError::Persistence`. The store is not
//! locked across processes, so two processes writing the same data
//! directory race and the last writer wins.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{FintrackError, FintrackResult};
use crate::models::{
    AccountBalances, RecurringDefinition, RecurringId, Transaction, TransactionId,
};
use crate::storage::LedgerStore;

use super::duplicates::{find_duplicate_recurring, find_duplicate_transaction};
use super::materialize::materialize_due;
use super::reconcile::{apply_transaction, ensure_sufficient_funds, reverse_transaction};
use super::schedule::{self, UpcomingOccurrence};

const BALANCES_ENTITY_ID: &str = "balances";

/// Everything the ledger holds in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub balances: AccountBalances,
    /// Transaction log in recording order
    pub transactions: Vec<Transaction>,
    /// Recurring definitions in creation order
    pub recurring: Vec<RecurringDefinition>,
}

/// Single-owner controller over the ledger state
pub struct LedgerService<'a> {
    store: &'a dyn LedgerStore,
    state: LedgerState,
    detect_duplicates: bool,
}

impl<'a> LedgerService<'a> {
    /// Load the ledger from `store`
    pub fn load(store: &'a dyn LedgerStore) -> FintrackResult<Self> {
        let state = LedgerState {
            balances: store.load_balances()?,
            transactions: store.load_transactions()?,
            recurring: store.load_recurring()?,
        };

        debug!(
            transactions = state.transactions.len(),
            recurring = state.recurring.len(),
            "ledger loaded"
        );

        Ok(Self {
            store,
            state,
            detect_duplicates: true,
        })
    }

    /// Turn field-equality duplicate rejection on or off (on by default)
    #[must_use]
    pub fn with_duplicate_detection(mut self, enabled: bool) -> Self {
        self.detect_duplicates = enabled;
        self
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn balances(&self) -> AccountBalances {
        self.state.balances
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn recurring(&self) -> &[RecurringDefinition] {
        &self.state.recurring
    }

    /// Record a transaction and update balances
    ///
    /// Transfers are rejected when the source account cannot cover them.
    pub fn record_transaction(&mut self, txn: Transaction) -> FintrackResult<Transaction> {
        ensure_sufficient_funds(&self.state.balances, &txn)?;
        self.record_unchecked_funds(txn)
    }

    /// Record a transaction without the sufficient-funds check
    pub fn record_transaction_unchecked(&mut self, txn: Transaction) -> FintrackResult<Transaction> {
        self.record_unchecked_funds(txn)
    }

    fn record_unchecked_funds(&mut self, txn: Transaction) -> FintrackResult<Transaction> {
        txn.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        if self.state.transactions.iter().any(|t| t.id == txn.id) {
            return Err(FintrackError::Duplicate {
                entity_type: "Transaction",
                identifier: txn.id.to_string(),
            });
        }

        if let Some(source) = txn.recurring_id {
            if self.is_materialized(source, txn.date) {
                return Err(FintrackError::Duplicate {
                    entity_type: "Transaction",
                    identifier: format!("{} on {}", source, txn.date),
                });
            }
        } else if self.detect_duplicates {
            if let Some(existing) = find_duplicate_transaction(&self.state.transactions, &txn) {
                return Err(FintrackError::Duplicate {
                    entity_type: "Transaction",
                    identifier: existing.id.to_string(),
                });
            }
        }

        self.commit_transaction(txn)
    }

    fn commit_transaction(&mut self, txn: Transaction) -> FintrackResult<Transaction> {
        let previous = self.state.balances;
        let updated = apply_transaction(&previous, &txn)?;

        self.state.transactions.push(txn.clone());
        self.state.balances = updated;

        if let Err(e) = self.store.append_transaction(&txn) {
            self.state.transactions.pop();
            self.state.balances = previous;
            warn!(transaction = %txn.id, error = %e, "append failed, rolled back");
            return Err(persistence(e));
        }

        if let Err(e) = self.store.save_balances(&updated) {
            self.state.transactions.pop();
            self.state.balances = previous;
            if let Err(undo) = self.store.remove_transaction(txn.id) {
                warn!(transaction = %txn.id, error = %undo, "could not remove appended transaction");
            }
            warn!(transaction = %txn.id, error = %e, "balance save failed, rolled back");
            return Err(persistence(e));
        }

        info!(transaction = %txn.id, flow = %txn.flow, amount = %txn.amount, "recorded transaction");

        self.audit(AuditEntry::create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(label(&txn)),
            &txn,
        ));
        self.audit(AuditEntry::update(
            EntityType::Balances,
            BALANCES_ENTITY_ID,
            None,
            &previous,
            &updated,
        ));

        Ok(txn)
    }

    /// Delete a transaction and reverse its effect on balances
    pub fn delete_transaction(&mut self, id: TransactionId) -> FintrackResult<Transaction> {
        let position = self
            .state
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| FintrackError::transaction_not_found(id.to_string()))?;

        let previous = self.state.balances;
        let updated = reverse_transaction(&previous, &self.state.transactions[position])?;
        let removed = self.state.transactions.remove(position);
        self.state.balances = updated;

        match self.store.remove_transaction(id) {
            Ok(true) => {}
            Ok(false) => warn!(transaction = %id, "transaction was not in the store"),
            Err(e) => {
                self.state.transactions.insert(position, removed);
                self.state.balances = previous;
                warn!(transaction = %id, error = %e, "remove failed, rolled back");
                return Err(persistence(e));
            }
        }

        if let Err(e) = self.store.save_balances(&updated) {
            if let Err(undo) = self.store.append_transaction(&removed) {
                warn!(transaction = %id, error = %undo, "could not restore removed transaction");
            }
            self.state.transactions.insert(position, removed);
            self.state.balances = previous;
            warn!(transaction = %id, error = %e, "balance save failed, rolled back");
            return Err(persistence(e));
        }

        info!(transaction = %id, "deleted transaction");

        self.audit(AuditEntry::delete(
            EntityType::Transaction,
            id.to_string(),
            Some(label(&removed)),
            &removed,
        ));
        self.audit(AuditEntry::update(
            EntityType::Balances,
            BALANCES_ENTITY_ID,
            None,
            &previous,
            &updated,
        ));

        Ok(removed)
    }

    /// Add a recurring definition
    pub fn add_recurring(&mut self, def: RecurringDefinition) -> FintrackResult<RecurringDefinition> {
        def.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        if self.state.recurring.iter().any(|d| d.id == def.id) {
            return Err(FintrackError::Duplicate {
                entity_type: "Recurring transaction",
                identifier: def.id.to_string(),
            });
        }

        if self.detect_duplicates {
            if let Some(existing) = find_duplicate_recurring(&self.state.recurring, &def) {
                return Err(FintrackError::Duplicate {
                    entity_type: "Recurring transaction",
                    identifier: existing.id.to_string(),
                });
            }
        }

        self.state.recurring.push(def.clone());

        if let Err(e) = self.store.append_recurring(&def) {
            self.state.recurring.pop();
            warn!(recurring = %def.id, error = %e, "append failed, rolled back");
            return Err(persistence(e));
        }

        info!(recurring = %def.id, schedule = %def.schedule_label(), "added recurring definition");

        self.audit(AuditEntry::create(
            EntityType::RecurringDefinition,
            def.id.to_string(),
            Some(def.category.clone()),
            &def,
        ));

        Ok(def)
    }

    /// Replace an existing recurring definition
    pub fn update_recurring(
        &mut self,
        mut def: RecurringDefinition,
    ) -> FintrackResult<RecurringDefinition> {
        def.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        let position = self
            .state
            .recurring
            .iter()
            .position(|d| d.id == def.id)
            .ok_or_else(|| FintrackError::recurring_not_found(def.id.to_string()))?;

        def.updated_at = chrono::Utc::now();
        let previous = std::mem::replace(&mut self.state.recurring[position], def.clone());

        if let Err(e) = self.store.update_recurring(&def) {
            self.state.recurring[position] = previous;
            warn!(recurring = %def.id, error = %e, "update failed, rolled back");
            return Err(persistence(e));
        }

        info!(recurring = %def.id, active = def.is_active, "updated recurring definition");

        self.audit(AuditEntry::update(
            EntityType::RecurringDefinition,
            def.id.to_string(),
            Some(def.category.clone()),
            &previous,
            &def,
        ));

        Ok(def)
    }

    /// Pause or resume a recurring definition
    pub fn set_recurring_active(
        &mut self,
        id: RecurringId,
        active: bool,
    ) -> FintrackResult<RecurringDefinition> {
        let mut def = self
            .state
            .recurring
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| FintrackError::recurring_not_found(id.to_string()))?;

        def.set_active(active);
        self.update_recurring(def)
    }

    /// Look up a definition by full id, display id or id prefix
    pub fn find_recurring(&self, identifier: &str) -> FintrackResult<&RecurringDefinition> {
        let mut matches = self.state.recurring.iter().filter(|d| d.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(def), None) => Ok(def),
            (Some(_), Some(_)) => Err(FintrackError::Validation(format!(
                "'{}' matches more than one recurring transaction",
                identifier
            ))),
            (None, _) => Err(FintrackError::recurring_not_found(identifier)),
        }
    }

    /// Look up a transaction by full id, display id or id prefix
    pub fn find_transaction(&self, identifier: &str) -> FintrackResult<&Transaction> {
        let mut matches = self
            .state
            .transactions
            .iter()
            .filter(|t| t.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn),
            (Some(_), Some(_)) => Err(FintrackError::Validation(format!(
                "'{}' matches more than one transaction",
                identifier
            ))),
            (None, _) => Err(FintrackError::transaction_not_found(identifier)),
        }
    }

    /// Record every recurring transaction due on `today` that has not been
    /// recorded yet
    ///
    /// Each materialized transaction is committed on its own; on failure the
    /// ones already committed stay.
    pub fn run_due(&mut self, today: NaiveDate) -> FintrackResult<Vec<Transaction>> {
        let due = materialize_due(&self.state.recurring, &self.state.transactions, today);

        let mut recorded = Vec::with_capacity(due.len());
        for txn in due {
            recorded.push(self.commit_transaction(txn)?);
        }

        if !recorded.is_empty() {
            info!(count = recorded.len(), %today, "materialized recurring transactions");
        }
        Ok(recorded)
    }

    /// Upcoming occurrences of active definitions, nearest first
    pub fn upcoming(&self, today: NaiveDate) -> FintrackResult<Vec<UpcomingOccurrence<'_>>> {
        schedule::upcoming(&self.state.recurring, today)
    }

    fn is_materialized(&self, source: RecurringId, date: NaiveDate) -> bool {
        self.state
            .transactions
            .iter()
            .any(|t| t.recurring_id == Some(source) && t.date == date)
    }

    fn audit(&self, entry: AuditEntry) {
        if let Err(e) = self.store.audit(&entry) {
            warn!(entity = %entry.entity_id, error = %e, "failed to write audit entry");
        }
    }
}

fn persistence(err: FintrackError) -> FintrackError {
    FintrackError::Persistence {
        reason: err.to_string(),
    }
}

fn label(txn: &Transaction) -> String {
    format!("{} {}", txn.date, txn.category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::models::{AccountKind, Frequency, Money, RecurringKind};
    use crate::storage::{FailPoint, MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn funded_store() -> MemoryStore {
        MemoryStore::with_data(
            AccountBalances::new(
                Money::from_cents(10000),
                Money::from_cents(50000),
                Money::zero(),
            ),
            Vec::new(),
            Vec::new(),
        )
    }

    fn rent(day: u32) -> RecurringDefinition {
        RecurringDefinition::monthly(
            RecurringKind::Expense,
            Money::from_cents(120000),
            "Rent",
            AccountKind::Bank,
            day,
            date(2024, 1, 1),
        )
    }

    #[test]
    fn test_record_updates_state_and_store() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();

        let txn = Transaction::expense(
            AccountKind::Cash,
            Money::from_cents(2500),
            "Groceries",
            date(2024, 3, 4),
        );
        ledger.record_transaction(txn.clone()).unwrap();

        assert_eq!(ledger.balances().cash.cents(), 7500);
        assert_eq!(ledger.transactions(), &[txn.clone()]);
        assert_eq!(store.load_balances().unwrap().cash.cents(), 7500);
        assert_eq!(store.load_transactions().unwrap(), vec![txn]);

        let ops: Vec<_> = store
            .audit_entries()
            .iter()
            .map(|e| (e.operation, e.entity_type))
            .collect();
        assert_eq!(
            ops,
            vec![
                (Operation::Create, EntityType::Transaction),
                (Operation::Update, EntityType::Balances)
            ]
        );
    }

    #[test]
    fn test_transfer_needs_funds_unless_unchecked() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let transfer = Transaction::transfer(
            AccountKind::Savings,
            AccountKind::Cash,
            Money::from_cents(100),
            date(2024, 3, 4),
        );

        let err = ledger.record_transaction(transfer.clone()).unwrap_err();
        assert!(matches!(err, FintrackError::InsufficientFunds { .. }));
        assert!(ledger.transactions().is_empty());

        ledger.record_transaction_unchecked(transfer).unwrap();
        assert_eq!(ledger.balances().savings.cents(), -100);
        assert_eq!(ledger.balances().cash.cents(), 10100);
    }

    #[test]
    fn test_invalid_transaction_is_rejected() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let txn = Transaction::expense(AccountKind::Cash, Money::zero(), "Food", date(2024, 3, 4));

        assert!(ledger.record_transaction(txn).unwrap_err().is_validation());
    }

    #[test]
    fn test_failed_append_rolls_back() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let before = ledger.state().clone();

        store.fail(FailPoint::AppendTransaction);
        let txn = Transaction::income(AccountKind::Bank, Money::from_cents(100), "Pay", date(2024, 3, 1));
        let err = ledger.record_transaction(txn).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(ledger.state(), &before);
        assert!(store.audit_entries().is_empty());
    }

    #[test]
    fn test_failed_balance_save_removes_appended_transaction() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let before = ledger.state().clone();

        store.fail(FailPoint::SaveBalances);
        let txn = Transaction::income(AccountKind::Bank, Money::from_cents(100), "Pay", date(2024, 3, 1));
        let err = ledger.record_transaction(txn).unwrap_err();

        assert!(err.is_persistence());
        assert_eq!(ledger.state(), &before);
        assert!(store.load_transactions().unwrap().is_empty());
        assert_eq!(store.load_balances().unwrap(), before.balances);
    }

    #[test]
    fn test_delete_reverses_balances() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let original = ledger.balances();

        let txn = ledger
            .record_transaction(Transaction::transfer(
                AccountKind::Bank,
                AccountKind::Savings,
                Money::from_cents(20000),
                date(2024, 3, 2),
            ))
            .unwrap();

        let removed = ledger.delete_transaction(txn.id).unwrap();
        assert_eq!(removed.id, txn.id);
        assert_eq!(ledger.balances(), original);
        assert!(ledger.transactions().is_empty());
        assert!(store.load_transactions().unwrap().is_empty());

        assert!(ledger.delete_transaction(txn.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_delete_restores_transaction() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let txn = ledger
            .record_transaction(Transaction::expense(
                AccountKind::Cash,
                Money::from_cents(300),
                "Coffee",
                date(2024, 3, 2),
            ))
            .unwrap();
        let before = ledger.state().clone();

        store.fail(FailPoint::SaveBalances);
        assert!(ledger.delete_transaction(txn.id).unwrap_err().is_persistence());

        assert_eq!(ledger.state(), &before);
        assert_eq!(store.load_transactions().unwrap(), vec![txn]);
    }

    #[test]
    fn test_manual_duplicates_rejected_when_enabled() {
        let store = funded_store();
        let txn = || {
            Transaction::expense(AccountKind::Cash, Money::from_cents(450), "Lunch", date(2024, 3, 4))
        };

        let mut ledger = LedgerService::load(&store).unwrap();
        ledger.record_transaction(txn()).unwrap();
        let err = ledger.record_transaction(txn()).unwrap_err();
        assert!(matches!(err, FintrackError::Duplicate { .. }));

        let mut relaxed = LedgerService::load(&store)
            .unwrap()
            .with_duplicate_detection(false);
        relaxed.record_transaction(txn()).unwrap();
        assert_eq!(relaxed.transactions().len(), 2);
    }

    #[test]
    fn test_recurring_lifecycle() {
        let store = MemoryStore::new();
        let mut ledger = LedgerService::load(&store).unwrap();

        let def = ledger.add_recurring(rent(1)).unwrap();
        assert!(matches!(
            ledger.add_recurring(rent(1)).unwrap_err(),
            FintrackError::Duplicate { .. }
        ));

        let display = def.id.to_string();
        assert_eq!(ledger.find_recurring(&display).unwrap().id, def.id);

        let paused = ledger.set_recurring_active(def.id, false).unwrap();
        assert!(!paused.is_active);
        assert!(!store.load_recurring().unwrap()[0].is_active);

        let resumed = ledger.set_recurring_active(def.id, true).unwrap();
        assert!(resumed.is_active);

        let update = store
            .audit_entries()
            .into_iter()
            .find(|e| e.operation == Operation::Update)
            .unwrap();
        assert!(update.diff_summary.unwrap().contains("is_active: true -> false"));
    }

    #[test]
    fn test_invalid_recurring_rejected() {
        let store = MemoryStore::new();
        let mut ledger = LedgerService::load(&store).unwrap();
        let def = RecurringDefinition::new(
            RecurringKind::Income,
            Money::from_cents(100),
            "Pay",
            AccountKind::Bank,
            Frequency::Yearly,
            date(2024, 1, 1),
        );

        assert!(ledger.add_recurring(def).unwrap_err().is_validation());
        assert!(ledger.recurring().is_empty());
    }

    #[test]
    fn test_failed_recurring_update_rolls_back() {
        let store = MemoryStore::new();
        let mut ledger = LedgerService::load(&store).unwrap();
        let def = ledger.add_recurring(rent(1)).unwrap();

        store.fail(FailPoint::UpdateRecurring);
        assert!(ledger
            .set_recurring_active(def.id, false)
            .unwrap_err()
            .is_persistence());
        assert!(ledger.recurring()[0].is_active);
    }

    #[test]
    fn test_balance_overflow_leaves_state_untouched() {
        let store = MemoryStore::with_data(
            AccountBalances::new(Money::MAX_BALANCE, Money::zero(), Money::zero()),
            Vec::new(),
            Vec::new(),
        );
        let mut ledger = LedgerService::load(&store).unwrap();
        let before = ledger.state().clone();

        let txn = Transaction::income(AccountKind::Cash, Money::from_cents(1), "Pay", date(2024, 3, 1));
        assert!(ledger.record_transaction(txn).unwrap_err().is_validation());

        assert_eq!(ledger.state(), &before);
        assert!(store.load_transactions().unwrap().is_empty());
        assert!(store.audit_entries().is_empty());
    }

    #[test]
    fn test_run_due_skips_malformed_definition() {
        let mut broken = rent(15);
        broken.day_of_month = None;
        let store = MemoryStore::with_data(
            AccountBalances::default(),
            Vec::new(),
            vec![broken, rent(15)],
        );
        let mut ledger = LedgerService::load(&store).unwrap();

        let created = ledger.run_due(date(2024, 3, 15)).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(store.load_transactions().unwrap(), created);
    }

    #[test]
    fn test_run_due_materializes_once() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        ledger.add_recurring(rent(15)).unwrap();

        let today = date(2024, 3, 15);
        let first = ledger.run_due(today).unwrap();
        let second = ledger.run_due(today).unwrap();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(ledger.balances().bank.cents(), 50000 - 120000);

        // a fresh load sees the committed transaction and does not repeat it
        let mut reloaded = LedgerService::load(&store).unwrap();
        assert!(reloaded.run_due(today).unwrap().is_empty());
    }

    #[test]
    fn test_materialized_key_blocks_manual_replay() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        ledger.add_recurring(rent(15)).unwrap();
        let created = ledger.run_due(date(2024, 3, 15)).unwrap();

        let mut replay = created[0].clone();
        replay.id = TransactionId::new();
        assert!(matches!(
            ledger.record_transaction(replay).unwrap_err(),
            FintrackError::Duplicate { .. }
        ));
    }

    #[test]
    fn test_upcoming_uses_current_definitions() {
        let store = MemoryStore::new();
        let mut ledger = LedgerService::load(&store).unwrap();
        for day in [15, 5, 10] {
            let mut def = rent(day);
            def.category = format!("Bill {}", day);
            ledger.add_recurring(def).unwrap();
        }

        let upcoming = ledger.upcoming(date(2024, 3, 5)).unwrap();
        let days: Vec<i64> = upcoming.iter().map(|u| u.days_until).collect();
        assert_eq!(days, vec![0, 5, 10]);
    }

    #[test]
    fn test_find_transaction_by_prefix() {
        let store = funded_store();
        let mut ledger = LedgerService::load(&store).unwrap();
        let txn = ledger
            .record_transaction(Transaction::income(
                AccountKind::Cash,
                Money::from_cents(100),
                "Gift",
                date(2024, 3, 1),
            ))
            .unwrap();

        assert_eq!(ledger.find_transaction(&txn.id.to_string()).unwrap().id, txn.id);
        assert!(ledger.find_transaction("txn-zzzz").unwrap_err().is_not_found());
    }
}
