//! Materialization of due recurring definitions into transactions

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{RecurringDefinition, Transaction};

use super::schedule::is_due_today;

/// Suffix appended to the description of materialized transactions
pub const AUTOMATIC_SUFFIX: &str = " (automatic)";

/// Transactions to synthesize for `today`
///
/// A definition yields one transaction when it is due today, today lies in
/// its start/end window, and `log` holds no transaction with the same
/// recurring id dated today. Calling this twice against the same log
/// therefore never produces a second copy. Nothing is recorded; the caller
/// commits the result.
///
/// A definition missing the fields its frequency needs is skipped with a
/// warning; the others still materialize.
pub fn materialize_due(
    defs: &[RecurringDefinition],
    log: &[Transaction],
    today: NaiveDate,
) -> Vec<Transaction> {
    let mut created = Vec::new();

    for def in defs {
        match is_due_today(def, today) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!(recurring = %def.id, error = %e, "skipping malformed recurring definition");
                continue;
            }
        }
        if !def.is_in_effect(today) {
            continue;
        }

        if already_materialized(def, log, today) {
            debug!(recurring = %def.id, %today, "already materialized today");
            continue;
        }

        let txn = synthesize(def, today);
        debug!(recurring = %def.id, transaction = %txn.id, "materialized recurring transaction");
        created.push(txn);
    }

    created
}

fn already_materialized(def: &RecurringDefinition, log: &[Transaction], today: NaiveDate) -> bool {
    log.iter()
        .any(|t| t.recurring_id == Some(def.id) && t.date == today)
}

fn synthesize(def: &RecurringDefinition, today: NaiveDate) -> Transaction {
    let base = def.description.as_deref().unwrap_or(&def.category);

    let mut txn = Transaction::new(def.flow(), def.amount, def.category.clone(), today)
        .with_description(format!("{}{}", base, AUTOMATIC_SUFFIX));
    txn.is_recurring = true;
    txn.recurring_id = Some(def.id);
    txn
}
