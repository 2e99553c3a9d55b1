//! Import CLI command

use std::path::Path;

use tracing::info;

use crate::error::{FintrackError, FintrackResult};
use crate::export::{import_from_json, import_from_yaml, FullExport};
use crate::storage::Storage;

/// Replace the stored ledger with the contents of a JSON or YAML export
///
/// The format is picked from the file extension; anything other than
/// `.yaml`/`.yml` is read as JSON.
pub fn handle_import_command(storage: &Storage, file: &Path) -> FintrackResult<()> {
    let contents = std::fs::read_to_string(file).map_err(|e| {
        FintrackError::Import(format!("Failed to read {}: {}", file.display(), e))
    })?;

    let export = parse_export(file, &contents)?;
    let transaction_count = export.transactions.len();
    let recurring_count = export.recurring.len();

    let state = export.into_state();
    storage.replace_all(state.balances, state.transactions, state.recurring)?;

    info!(
        file = %file.display(),
        transactions = transaction_count,
        recurring = recurring_count,
        "ledger imported"
    );
    println!(
        "Imported {} transactions and {} recurring definitions from {}",
        transaction_count,
        recurring_count,
        file.display()
    );

    Ok(())
}

fn parse_export(file: &Path, contents: &str) -> FintrackResult<FullExport> {
    let is_yaml = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        import_from_yaml(contents)
    } else {
        import_from_json(contents)
    }
}
