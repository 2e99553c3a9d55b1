//! CLI command handlers
//!
//! Bridges clap argument parsing with the ledger service.

pub mod balances;
pub mod export;
pub mod import;
pub mod recurring;
pub mod transaction;

pub use balances::handle_balances_command;
pub use export::{handle_export_command, ExportFormat};
pub use import::handle_import_command;
pub use recurring::{handle_recurring_command, RecurringCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{AccountKind, Money};
use crate::services::LedgerService;
use crate::storage::Storage;

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Load the ledger with the user's duplicate-detection preference
pub(crate) fn open_ledger<'a>(
    storage: &'a Storage,
    settings: &Settings,
) -> FintrackResult<LedgerService<'a>> {
    Ok(LedgerService::load(storage)?.with_duplicate_detection(settings.detect_duplicates))
}

/// Record any recurring transactions due today; returns how many were recorded
pub fn materialize_due_today(storage: &Storage, settings: &Settings) -> FintrackResult<usize> {
    let mut ledger = open_ledger(storage, settings)?;
    let created = ledger.run_due(today())?;

    for txn in &created {
        eprintln!(
            "Recorded recurring {} {} ({})",
            txn.kind().to_string().to_lowercase(),
            txn.amount.format_with_symbol(&settings.currency_symbol),
            txn.category
        );
    }

    Ok(created.len())
}

/// Parse an optional YYYY-MM-DD date, defaulting to today
pub(crate) fn parse_date_or_today(date: Option<&str>) -> FintrackResult<NaiveDate> {
    match date {
        Some(date_str) => parse_date(date_str),
        None => Ok(today()),
    }
}

pub(crate) fn parse_date(date_str: &str) -> FintrackResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
        FintrackError::Validation(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            date_str
        ))
    })
}

pub(crate) fn parse_amount(amount: &str) -> FintrackResult<Money> {
    Money::parse(amount).map_err(|e| {
        FintrackError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '50.00' or '100'. Error: {}",
            amount, e
        ))
    })
}

pub(crate) fn parse_account(account: &str) -> FintrackResult<AccountKind> {
    AccountKind::parse(account).ok_or_else(|| {
        FintrackError::Validation(format!(
            "Unknown account '{}'. Use cash, bank or savings",
            account
        ))
    })
}
