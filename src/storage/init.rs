//! First-run storage setup

use crate::config::paths::FintrackPaths;
use crate::error::FintrackError;
use crate::models::AccountBalances;

use super::file_io::write_json_atomic;

/// Create the data directory and an all-zero balance file if missing
///
/// Existing data is never overwritten.
pub fn initialize_storage(paths: &FintrackPaths) -> Result<(), FintrackError> {
    paths.ensure_directories()?;

    if !paths.balances_file().exists() {
        write_json_atomic(paths.balances_file(), &AccountBalances::default())?;
    }

    Ok(())
}
