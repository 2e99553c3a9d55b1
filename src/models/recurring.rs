//! Recurring transaction definitions
//!
//! A definition is a user-authored template. The schedule evaluator only reads
//! it; materialization turns it into concrete transactions on its due date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::AccountKind;
use super::ids::RecurringId;
use super::money::Money;
use super::transaction::TransactionFlow;

/// Direction of a recurring transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringKind {
    Income,
    Expense,
}

impl RecurringKind {
    /// Parse from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for RecurringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// How often a definition recurs
///
/// Only `Monthly` and `Yearly` are scheduled. `Daily`, `Weekly` and `Custom`
/// can be stored and listed, but are never due and have no next occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Yearly,
    Daily,
    Weekly,
    Custom,
}

impl Frequency {
    /// Parse from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "yearly" | "annual" | "annually" => Some(Self::Yearly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Whether the schedule evaluator computes due dates for this frequency
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Monthly | Self::Yearly)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// A recurring transaction definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDefinition {
    pub id: RecurringId,

    #[serde(rename = "type")]
    pub kind: RecurringKind,

    pub amount: Money,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub account: AccountKind,

    pub frequency: Frequency,

    /// 1-31; required for monthly and yearly
    #[serde(default)]
    pub day_of_month: Option<u32>,

    /// 1-12; required for yearly
    #[serde(default)]
    pub month_of_year: Option<u32>,

    /// 0-6 with Sunday = 0; required for weekly
    #[serde(default)]
    pub day_of_week: Option<u32>,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl RecurringDefinition {
    /// Create an active definition with no schedule fields set
    pub fn new(
        kind: RecurringKind,
        amount: Money,
        category: impl Into<String>,
        account: AccountKind,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecurringId::new(),
            kind,
            amount,
            category: category.into(),
            description: None,
            account,
            frequency,
            day_of_month: None,
            month_of_year: None,
            day_of_week: None,
            start_date,
            end_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// A monthly definition due on `day_of_month`
    pub fn monthly(
        kind: RecurringKind,
        amount: Money,
        category: impl Into<String>,
        account: AccountKind,
        day_of_month: u32,
        start_date: NaiveDate,
    ) -> Self {
        let mut def = Self::new(kind, amount, category, account, Frequency::Monthly, start_date);
        def.day_of_month = Some(day_of_month);
        def
    }

    /// A yearly definition due on `month_of_year`/`day_of_month`
    pub fn yearly(
        kind: RecurringKind,
        amount: Money,
        category: impl Into<String>,
        account: AccountKind,
        month_of_year: u32,
        day_of_month: u32,
        start_date: NaiveDate,
    ) -> Self {
        let mut def = Self::new(kind, amount, category, account, Frequency::Yearly, start_date);
        def.month_of_year = Some(month_of_year);
        def.day_of_month = Some(day_of_month);
        def
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        let trimmed = description.trim();
        self.description = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    #[must_use]
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// The transaction flow a materialized occurrence will have
    pub fn flow(&self) -> TransactionFlow {
        match self.kind {
            RecurringKind::Income => TransactionFlow::Income {
                account: self.account,
            },
            RecurringKind::Expense => TransactionFlow::Expense {
                account: self.account,
            },
        }
    }

    /// Whether `date` falls inside the start/end window
    pub fn is_in_effect(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    /// Human-readable schedule, e.g. "Monthly on day 15"
    pub fn schedule_label(&self) -> String {
        match (self.frequency, self.month_of_year, self.day_of_month) {
            (Frequency::Monthly, _, Some(day)) => format!("Monthly on day {}", day),
            (Frequency::Yearly, Some(month), Some(day)) => {
                format!("Yearly on {:02}-{:02}", month, day)
            }
            (Frequency::Weekly, _, _) => match self.day_of_week {
                Some(weekday) => format!("Weekly on {}", weekday_name(weekday)),
                None => "Weekly".to_string(),
            },
            (frequency, _, _) => frequency.to_string(),
        }
    }

    /// Validate the definition
    pub fn validate(&self) -> Result<(), RecurringValidationError> {
        if !self.amount.is_positive() {
            return Err(RecurringValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(RecurringValidationError::AmountTooLarge(self.amount));
        }

        if self.category.trim().is_empty() {
            return Err(RecurringValidationError::EmptyCategory);
        }

        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(RecurringValidationError::DayOfMonthOutOfRange(day));
            }
        }
        if let Some(month) = self.month_of_year {
            if !(1..=12).contains(&month) {
                return Err(RecurringValidationError::MonthOutOfRange(month));
            }
        }
        if let Some(weekday) = self.day_of_week {
            if weekday > 6 {
                return Err(RecurringValidationError::DayOfWeekOutOfRange(weekday));
            }
        }

        match self.frequency {
            Frequency::Monthly | Frequency::Yearly if self.day_of_month.is_none() => {
                return Err(RecurringValidationError::MissingField {
                    frequency: self.frequency,
                    field: "day_of_month",
                });
            }
            Frequency::Yearly if self.month_of_year.is_none() => {
                return Err(RecurringValidationError::MissingField {
                    frequency: self.frequency,
                    field: "month_of_year",
                });
            }
            Frequency::Weekly if self.day_of_week.is_none() => {
                return Err(RecurringValidationError::MissingField {
                    frequency: self.frequency,
                    field: "day_of_week",
                });
            }
            _ => {}
        }

        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RecurringValidationError::EndBeforeStart {
                    start: self.start_date,
                    end,
                });
            }
        }

        Ok(())
    }
}

fn weekday_name(day: u32) -> &'static str {
    match day {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "?",
    }
}

/// Validation errors for recurring definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurringValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    EmptyCategory,
    DayOfMonthOutOfRange(u32),
    MonthOutOfRange(u32),
    DayOfWeekOutOfRange(u32),
    MissingField {
        frequency: Frequency,
        field: &'static str,
    },
    EndBeforeStart {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl fmt::Display for RecurringValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Recurring amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Recurring amount {} exceeds the maximum of {}",
                amount,
                Money::MAX_AMOUNT
            ),
            Self::EmptyCategory => write!(f, "Recurring category cannot be empty"),
            Self::DayOfMonthOutOfRange(day) => {
                write!(f, "Day of month must be between 1 and 31, got {}", day)
            }
            Self::MonthOutOfRange(month) => {
                write!(f, "Month must be between 1 and 12, got {}", month)
            }
            Self::DayOfWeekOutOfRange(day) => {
                write!(f, "Day of week must be between 0 and 6, got {}", day)
            }
            Self::MissingField { frequency, field } => {
                write!(f, "{} definitions require {}", frequency, field)
            }
            Self::EndBeforeStart { start, end } => {
                write!(f, "End date {} is before start date {}", end, start)
            }
        }
    }
}

impl std::error::Error for RecurringValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rent() -> RecurringDefinition {
        RecurringDefinition::monthly(
            RecurringKind::Expense,
            Money::from_cents(120000),
            "Rent",
            AccountKind::Bank,
            1,
            date(2024, 1, 1),
        )
    }

    #[test]
    fn test_monthly_constructor_validates() {
        let def = rent();
        assert!(def.is_active);
        assert!(def.validate().is_ok());
        assert_eq!(def.schedule_label(), "Monthly on day 1");
        assert_eq!(
            def.flow(),
            TransactionFlow::Expense {
                account: AccountKind::Bank
            }
        );
    }

    #[test]
    fn test_monthly_without_day_is_rejected() {
        let def = RecurringDefinition::new(
            RecurringKind::Expense,
            Money::from_cents(100),
            "Gym",
            AccountKind::Cash,
            Frequency::Monthly,
            date(2024, 1, 1),
        );
        assert_eq!(
            def.validate(),
            Err(RecurringValidationError::MissingField {
                frequency: Frequency::Monthly,
                field: "day_of_month"
            })
        );
    }

    #[test]
    fn test_yearly_requires_month() {
        let mut def = RecurringDefinition::yearly(
            RecurringKind::Expense,
            Money::from_cents(9900),
            "Insurance",
            AccountKind::Bank,
            3,
            15,
            date(2024, 1, 1),
        );
        assert!(def.validate().is_ok());
        assert_eq!(def.schedule_label(), "Yearly on 03-15");

        def.month_of_year = None;
        assert!(matches!(
            def.validate(),
            Err(RecurringValidationError::MissingField {
                field: "month_of_year",
                ..
            })
        ));

        def.month_of_year = Some(13);
        assert_eq!(
            def.validate(),
            Err(RecurringValidationError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_out_of_range_day_and_end_before_start() {
        let mut def = rent();
        def.day_of_month = Some(32);
        assert_eq!(
            def.validate(),
            Err(RecurringValidationError::DayOfMonthOutOfRange(32))
        );

        let def = rent().with_end_date(date(2023, 12, 31));
        assert!(matches!(
            def.validate(),
            Err(RecurringValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_amount_above_ceiling_is_rejected() {
        let mut def = rent();
        def.amount = Money::MAX_AMOUNT;
        assert!(def.validate().is_ok());

        def.amount = Money::from_cents(Money::MAX_AMOUNT.cents() + 1);
        assert!(matches!(
            def.validate(),
            Err(RecurringValidationError::AmountTooLarge(_))
        ));
    }

    #[test]
    fn test_unscheduled_frequencies_can_be_stored() {
        let mut def = RecurringDefinition::new(
            RecurringKind::Income,
            Money::from_cents(500),
            "Allowance",
            AccountKind::Cash,
            Frequency::Weekly,
            date(2024, 1, 1),
        );
        assert!(def.validate().is_err());
        def.day_of_week = Some(5);
        assert!(def.validate().is_ok());
        assert!(!def.frequency.is_scheduled());
        assert_eq!(def.schedule_label(), "Weekly on Friday");
    }

    #[test]
    fn test_in_effect_window() {
        let def = rent().with_end_date(date(2024, 6, 30));
        assert!(!def.is_in_effect(date(2023, 12, 31)));
        assert!(def.is_in_effect(date(2024, 1, 1)));
        assert!(def.is_in_effect(date(2024, 6, 30)));
        assert!(!def.is_in_effect(date(2024, 7, 1)));
    }

    #[test]
    fn test_serialization_uses_type_key() {
        let value = serde_json::to_value(rent()).unwrap();
        assert_eq!(value["type"], "expense");
        assert_eq!(value["frequency"], "monthly");
        assert_eq!(value["day_of_month"], 1);
    }
}
