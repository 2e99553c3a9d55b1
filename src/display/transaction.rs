//! Transaction display formatting

use crate::models::{Transaction, TransactionFlow};

use super::format_date;

/// Format a single transaction as a register row
pub fn format_transaction_row(txn: &Transaction, symbol: &str, date_format: &str) -> String {
    let marker = if txn.is_recurring { "↻" } else { " " };
    let signed = match txn.flow {
        TransactionFlow::Income { .. } => txn.amount,
        TransactionFlow::Expense { .. } => -txn.amount,
        TransactionFlow::Transfer { .. } => txn.amount,
    };

    format!(
        "{} {:12} {:10} {:22} {:16} {:>12}",
        marker,
        txn.id.to_string(),
        format_date(txn.date, date_format),
        truncate(&accounts(&txn.flow), 22),
        truncate(&txn.category, 16),
        signed.format_with_symbol(symbol)
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(
    transactions: &[Transaction],
    symbol: &str,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "  {:12} {:10} {:22} {:16} {:>12}\n",
        "ID", "Date", "Accounts", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(78));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, symbol, date_format));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, symbol: &str, date_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Type:        {}\n", txn.kind()));
    output.push_str(&format!("Accounts:    {}\n", accounts(&txn.flow)));
    output.push_str(&format!("Date:        {}\n", format_date(txn.date, date_format)));
    output.push_str(&format!(
        "Amount:      {}\n",
        txn.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Category:    {}\n", txn.category));

    if let Some(description) = &txn.description {
        output.push_str(&format!("Description: {}\n", description));
    }

    if let Some(source) = txn.recurring_id {
        output.push_str(&format!("Recurring:   {}\n", source));
    }

    output
}

fn accounts(flow: &TransactionFlow) -> String {
    match flow {
        TransactionFlow::Income { account } => format!("+ {}", account),
        TransactionFlow::Expense { account } => format!("- {}", account),
        TransactionFlow::Transfer { from, to } => format!("{} -> {}", from, to),
    }
}

/// Truncate a string to `max_len` characters, marking the cut with "..."
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
