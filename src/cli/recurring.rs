//! Recurring transaction CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_recurring_list, format_upcoming, format_transaction_register};
use crate::error::{FintrackError, FintrackResult};
use crate::models::{Frequency, RecurringDefinition, RecurringKind};
use crate::storage::Storage;

use super::{open_ledger, parse_account, parse_amount, parse_date, parse_date_or_today};

/// Recurring transaction subcommands
#[derive(Subcommand, Debug)]
pub enum RecurringCommands {
    /// Define a new recurring income or expense
    Add {
        /// income or expense
        kind: String,
        /// Amount per occurrence, e.g. "1200"
        amount: String,
        /// Account: cash, bank or savings
        #[arg(short, long)]
        account: String,
        /// Category label
        #[arg(short, long)]
        category: String,
        /// monthly, yearly, weekly, daily or custom
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
        /// Day of month (1-31) for monthly and yearly schedules
        #[arg(long)]
        day: Option<u32>,
        /// Month (1-12) for yearly schedules
        #[arg(long)]
        month: Option<u32>,
        /// Day of week (0-6, Sunday = 0) for weekly schedules
        #[arg(long)]
        weekday: Option<u32>,
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// First date the schedule is in effect, defaults to today
        #[arg(long)]
        start: Option<String>,
        /// Last date the schedule is in effect
        #[arg(long)]
        end: Option<String>,
    },
    /// List recurring definitions
    List {
        /// Include paused definitions
        #[arg(short, long)]
        all: bool,
    },
    /// Stop a definition from producing transactions
    Pause {
        /// Recurring ID or ID prefix
        id: String,
    },
    /// Resume a paused definition
    Resume {
        /// Recurring ID or ID prefix
        id: String,
    },
    /// Show the next occurrence of each active definition
    Upcoming {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Record the transactions due on a date
    Run {
        /// Date to run (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
}

/// Handle a recurring command
pub fn handle_recurring_command(
    storage: &Storage,
    settings: &Settings,
    cmd: RecurringCommands,
) -> FintrackResult<()> {
    let mut ledger = open_ledger(storage, settings)?;
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        RecurringCommands::Add {
            kind,
            amount,
            account,
            category,
            frequency,
            day,
            month,
            weekday,
            description,
            start,
            end,
        } => {
            let kind = RecurringKind::parse(&kind).ok_or_else(|| {
                FintrackError::Validation(format!(
                    "Invalid recurring type: '{}'. Use income or expense",
                    kind
                ))
            })?;
            let frequency = Frequency::parse(&frequency).ok_or_else(|| {
                FintrackError::Validation(format!(
                    "Invalid frequency: '{}'. Use monthly, yearly, weekly, daily or custom",
                    frequency
                ))
            })?;

            let mut def = RecurringDefinition::new(
                kind,
                parse_amount(&amount)?,
                category.trim(),
                parse_account(&account)?,
                frequency,
                parse_date_or_today(start.as_deref())?,
            );
            def.day_of_month = day;
            def.month_of_year = month;
            def.day_of_week = weekday;
            if let Some(end) = end {
                def = def.with_end_date(parse_date(&end)?);
            }
            if let Some(description) = description {
                def = def.with_description(description);
            }

            let def = ledger.add_recurring(def)?;

            println!("Added recurring {}: {}", def.kind, def.id);
            println!("  Category: {}", def.category);
            println!("  Amount:   {}", def.amount.format_with_symbol(symbol));
            println!("  Account:  {}", def.account);
            println!("  Schedule: {}", def.schedule_label());
            if !def.frequency.is_scheduled() {
                println!("  Note: {} schedules are stored but never come due", def.frequency);
            }
        }

        RecurringCommands::List { all } => {
            let defs: Vec<RecurringDefinition> = ledger
                .recurring()
                .iter()
                .filter(|d| all || d.is_active)
                .cloned()
                .collect();
            print!("{}", format_recurring_list(&defs, symbol));
        }

        RecurringCommands::Pause { id } => {
            let rec_id = ledger.find_recurring(&id)?.id;
            let def = ledger.set_recurring_active(rec_id, false)?;
            println!("Paused {} ({})", def.id, def.category);
        }

        RecurringCommands::Resume { id } => {
            let rec_id = ledger.find_recurring(&id)?.id;
            let def = ledger.set_recurring_active(rec_id, true)?;
            println!("Resumed {} ({})", def.id, def.category);
        }

        RecurringCommands::Upcoming { date, limit } => {
            let today = parse_date_or_today(date.as_deref())?;
            let limit = limit.unwrap_or(settings.upcoming_limit);

            let upcoming = ledger.upcoming(today)?;
            let shown = &upcoming[..upcoming.len().min(limit)];
            print!("{}", format_upcoming(shown, symbol, date_format));
        }

        RecurringCommands::Run { date } => {
            let today = parse_date_or_today(date.as_deref())?;
            let created = ledger.run_due(today)?;

            if created.is_empty() {
                println!("Nothing due on {}.", today);
            } else {
                println!("Recorded {} recurring transaction(s):", created.len());
                print!("{}", format_transaction_register(&created, symbol, date_format));
            }
        }
    }

    Ok(())
}
