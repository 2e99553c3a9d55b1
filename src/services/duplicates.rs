//! Duplicate detection by field equality
//!
//! Two manual transactions are duplicates when their flow, amount, category
//! and date match. Two recurring definitions are duplicates when everything
//! that shapes their schedule and effect matches. Ids, descriptions and
//! timestamps are ignored.

use crate::models::{RecurringDefinition, Transaction};

pub fn is_duplicate_transaction(a: &Transaction, b: &Transaction) -> bool {
    a.flow == b.flow && a.amount == b.amount && a.category == b.category && a.date == b.date
}

pub fn is_duplicate_recurring(a: &RecurringDefinition, b: &RecurringDefinition) -> bool {
    a.kind == b.kind
        && a.amount == b.amount
        && a.category == b.category
        && a.account == b.account
        && a.frequency == b.frequency
        && a.day_of_month == b.day_of_month
        && a.month_of_year == b.month_of_year
        && a.day_of_week == b.day_of_week
}

/// First transaction in `existing` that duplicates `candidate`
pub fn find_duplicate_transaction<'a>(
    existing: &'a [Transaction],
    candidate: &Transaction,
) -> Option<&'a Transaction> {
    existing
        .iter()
        .find(|t| t.id != candidate.id && is_duplicate_transaction(t, candidate))
}

/// First definition in `existing` that duplicates `candidate`
pub fn find_duplicate_recurring<'a>(
    existing: &'a [RecurringDefinition],
    candidate: &RecurringDefinition,
) -> Option<&'a RecurringDefinition> {
    existing
        .iter()
        .find(|d| d.id != candidate.id && is_duplicate_recurring(d, candidate))
}
