//! CSV export of the transaction log

use std::io::Write;

use crate::error::{FintrackError, FintrackResult};
use crate::models::{Transaction, TransactionFlow};

const HEADER: [&str; 10] = [
    "ID",
    "Date",
    "Type",
    "Account",
    "From",
    "To",
    "Category",
    "Description",
    "Amount",
    "Recurring ID",
];

/// Write transactions as CSV, one row each, amounts in currency units
pub fn export_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: W,
) -> FintrackResult<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    let export_err = |e: ::csv::Error| FintrackError::Export(e.to_string());

    csv_writer.write_record(HEADER).map_err(export_err)?;

    for txn in transactions {
        let (account, from, to) = match txn.flow {
            TransactionFlow::Income { account } | TransactionFlow::Expense { account } => {
                (account.as_str(), "", "")
            }
            TransactionFlow::Transfer { from, to } => ("", from.as_str(), to.as_str()),
        };
        let amount = format!("{}.{:02}", txn.amount.dollars(), txn.amount.cents_part());
        let recurring_id = txn
            .recurring_id
            .map(|id| id.as_uuid().to_string())
            .unwrap_or_default();

        csv_writer
            .write_record([
                txn.id.as_uuid().to_string().as_str(),
                txn.date.to_string().as_str(),
                txn.kind().to_string().to_lowercase().as_str(),
                account,
                from,
                to,
                txn.category.as_str(),
                txn.description_or_empty(),
                amount.as_str(),
                recurring_id.as_str(),
            ])
            .map_err(export_err)?;
    }

    csv_writer
        .flush()
        .map_err(|e| FintrackError::Export(e.to_string()))
}
