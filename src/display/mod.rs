//! Display formatting for terminal output

pub mod account;
pub mod recurring;
pub mod transaction;

pub use account::format_balances;
pub use recurring::{format_recurring_list, format_upcoming};
pub use transaction::{format_transaction_details, format_transaction_register, format_transaction_row};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;

/// Date format used when the configured one does not parse
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Render `date` with a strftime `date_format`, falling back to ISO dates
/// when the format string is invalid
pub fn format_date(date: NaiveDate, date_format: &str) -> String {
    let valid = !date_format.is_empty()
        && StrftimeItems::new(date_format).all(|item| !matches!(item, Item::Error));
    let date_format = if valid { date_format } else { FALLBACK_DATE_FORMAT };
    date.format(date_format).to_string()
}
