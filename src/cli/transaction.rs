//! Transaction CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_transaction_details, format_transaction_register};
use crate::error::{FintrackError, FintrackResult};
use crate::models::{Transaction, TransactionFlow, TransactionKind, TRANSFER_CATEGORY};
use crate::storage::Storage;

use super::{open_ledger, parse_account, parse_amount, parse_date_or_today};

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Record an income or expense
    Add {
        /// income or expense
        kind: String,
        /// Amount, e.g. "42.50"
        amount: String,
        /// Account: cash, bank or savings
        #[arg(short, long)]
        account: String,
        /// Category label
        #[arg(short, long)]
        category: String,
        /// Free-text description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Move money between two accounts
    Transfer {
        /// Source account
        from: String,
        /// Destination account
        to: String,
        /// Amount, e.g. "100"
        amount: String,
        /// Category label (default: Transfer)
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Transfer date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Allow the source account to go negative
        #[arg(short, long)]
        force: bool,
    },
    /// List recorded transactions, most recent last
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID or ID prefix
        id: String,
    },
    /// Delete a transaction and reverse its effect on balances
    Delete {
        /// Transaction ID or ID prefix
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> FintrackResult<()> {
    let mut ledger = open_ledger(storage, settings)?;
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            account,
            category,
            description,
            date,
        } => {
            let account = parse_account(&account)?;
            let flow = match TransactionKind::parse(&kind) {
                Some(TransactionKind::Income) => TransactionFlow::Income { account },
                Some(TransactionKind::Expense) => TransactionFlow::Expense { account },
                Some(TransactionKind::Transfer) => {
                    return Err(FintrackError::Validation(
                        "Use 'txn transfer' to record a transfer".into(),
                    ))
                }
                None => {
                    return Err(FintrackError::Validation(format!(
                        "Invalid transaction type: '{}'. Use income or expense",
                        kind
                    )))
                }
            };

            let mut txn = Transaction::new(
                flow,
                parse_amount(&amount)?,
                category.trim(),
                parse_date_or_today(date.as_deref())?,
            );
            if let Some(description) = description {
                txn = txn.with_description(description);
            }

            let txn = ledger.record_transaction(txn)?;

            println!("Recorded transaction:");
            print!("{}", format_transaction_details(&txn, symbol, date_format));
        }

        TransactionCommands::Transfer {
            from,
            to,
            amount,
            category,
            description,
            date,
            force,
        } => {
            let mut txn = Transaction::transfer(
                parse_account(&from)?,
                parse_account(&to)?,
                parse_amount(&amount)?,
                parse_date_or_today(date.as_deref())?,
            );
            txn.category = category.unwrap_or_else(|| TRANSFER_CATEGORY.to_string());
            if let Some(description) = description {
                txn = txn.with_description(description);
            }

            let txn = if force {
                ledger.record_transaction_unchecked(txn)?
            } else {
                ledger.record_transaction(txn)?
            };

            println!(
                "Transferred {} from {} to {}",
                txn.amount.format_with_symbol(symbol),
                from.to_lowercase(),
                to.to_lowercase()
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::List { limit } => {
            let transactions = ledger.transactions();
            let start = transactions.len().saturating_sub(limit);
            let shown = &transactions[start..];

            print!("{}", format_transaction_register(shown, symbol, date_format));
            println!(
                "\nShowing {} of {} transactions",
                shown.len(),
                transactions.len()
            );
        }

        TransactionCommands::Show { id } => {
            let txn = ledger.find_transaction(&id)?;
            print!("{}", format_transaction_details(txn, symbol, date_format));
        }

        TransactionCommands::Delete { id } => {
            let txn_id = ledger.find_transaction(&id)?.id;
            let removed = ledger.delete_transaction(txn_id)?;

            println!(
                "Deleted transaction {} ({} {})",
                removed.id,
                removed.category,
                removed.amount.format_with_symbol(symbol)
            );
        }
    }

    Ok(())
}
