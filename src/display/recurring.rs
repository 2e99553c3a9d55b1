//! Recurring definition display formatting

use crate::models::RecurringDefinition;
use crate::services::UpcomingOccurrence;

use super::format_date;
use super::transaction::truncate;

/// Format recurring definitions as a table
pub fn format_recurring_list(defs: &[RecurringDefinition], symbol: &str) -> String {
    if defs.is_empty() {
        return "No recurring transactions.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:8} {:16} {:8} {:>12} {:22} {}\n",
        "ID", "Type", "Category", "Account", "Amount", "Schedule", "Status"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for def in defs {
        let status = if def.is_active { "Active" } else { "Paused" };
        output.push_str(&format!(
            "{:12} {:8} {:16} {:8} {:>12} {:22} {}\n",
            def.id.to_string(),
            def.kind.to_string(),
            truncate(&def.category, 16),
            def.account.to_string(),
            def.amount.format_with_symbol(symbol),
            def.schedule_label(),
            status
        ));
    }

    output
}

/// Format upcoming occurrences, nearest first
pub fn format_upcoming(
    upcoming: &[UpcomingOccurrence<'_>],
    symbol: &str,
    date_format: &str,
) -> String {
    if upcoming.is_empty() {
        return "No upcoming recurring transactions.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:10} {:>8} {:8} {:16} {:>12}\n",
        "Date", "In", "Type", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(58));
    output.push('\n');

    for item in upcoming {
        let when = match item.days_until {
            0 => "today".to_string(),
            1 => "1 day".to_string(),
            n => format!("{} days", n),
        };
        output.push_str(&format!(
            "{:10} {:>8} {:8} {:16} {:>12}\n",
            format_date(item.next_date, date_format),
            when,
            item.definition.kind.to_string(),
            truncate(&item.definition.category, 16),
            item.definition.amount.format_with_symbol(symbol)
        ));
    }

    output
}
