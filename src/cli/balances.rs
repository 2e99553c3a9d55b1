//! `fintrack balances`

use crate::config::settings::Settings;
use crate::display::format_balances;
use crate::error::FintrackResult;
use crate::storage::{LedgerStore, Storage};

pub fn handle_balances_command(storage: &Storage, settings: &Settings) -> FintrackResult<()> {
    let balances = storage.load_balances()?;
    print!("{}", format_balances(&balances, &settings.currency_symbol));
    Ok(())
}
