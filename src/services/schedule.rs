//! Recurring schedule evaluator
//!
//! Decides whether a recurring definition is due on a given day and computes
//! its next occurrence. Every function here is pure: the definition is only
//! read and "today" is always passed in by the caller.
//!
//! Only monthly and yearly definitions are scheduled. Daily, weekly and custom
//! definitions are never due and have no next occurrence.
//!
//! A `day_of_month` larger than the target month rolls forward into the next
//! month (day 31 in April lands on May 1st, day 30 in February lands in early
//! March). The rolled date is what gets reported.

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

use crate::error::{FintrackError, FintrackResult};
use crate::models::{Frequency, RecurringDefinition};

/// The next date a definition fires and how far away it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub date: NaiveDate,
    /// Whole calendar days from today; 0 when due today
    pub days_until: i64,
}

/// A definition paired with its next occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpcomingOccurrence<'a> {
    pub definition: &'a RecurringDefinition,
    pub next_date: NaiveDate,
    pub days_until: i64,
}

/// Whether `def` fires on `today`
///
/// Inactive definitions and unscheduled frequencies are never due. The
/// start/end window is not consulted here; see `materialize_due`.
pub fn is_due_today(def: &RecurringDefinition, today: NaiveDate) -> FintrackResult<bool> {
    if !def.is_active {
        return Ok(false);
    }

    let due = match def.frequency {
        Frequency::Monthly => today.day() == required_day(def)?,
        Frequency::Yearly => {
            today.month() == required_month(def)? && today.day() == required_day(def)?
        }
        Frequency::Daily | Frequency::Weekly | Frequency::Custom => false,
    };

    debug!(recurring = %def.id, %today, due, "evaluated due date");
    Ok(due)
}

/// The next occurrence of `def` on or after `today`
///
/// Returns `Ok(None)` for frequencies the evaluator does not schedule. The
/// active flag is ignored so that paused definitions can still be previewed.
pub fn next_occurrence(
    def: &RecurringDefinition,
    today: NaiveDate,
) -> FintrackResult<Option<Occurrence>> {
    let date = match def.frequency {
        Frequency::Monthly => {
            let day = required_day(def)?;
            let month0 = today.month0() as i64;
            let month0 = if day >= today.day() { month0 } else { month0 + 1 };
            calendar_date(today.year(), month0, day)?
        }
        Frequency::Yearly => {
            let month = required_month(def)?;
            let day = required_day(def)?;
            let this_year =
                month > today.month() || (month == today.month() && day >= today.day());
            let year = if this_year {
                today.year()
            } else {
                today.year() + 1
            };
            calendar_date(year, month as i64 - 1, day)?
        }
        Frequency::Daily | Frequency::Weekly | Frequency::Custom => return Ok(None),
    };

    Ok(Some(Occurrence {
        date,
        days_until: (date - today).num_days(),
    }))
}

/// Next occurrences of all active, scheduled definitions, nearest first
///
/// Definitions with equal `days_until` keep their input order.
pub fn upcoming(
    defs: &[RecurringDefinition],
    today: NaiveDate,
) -> FintrackResult<Vec<UpcomingOccurrence<'_>>> {
    let mut result = Vec::new();

    for def in defs.iter().filter(|d| d.is_active) {
        match next_occurrence(def, today)? {
            Some(occurrence) => result.push(UpcomingOccurrence {
                definition: def,
                next_date: occurrence.date,
                days_until: occurrence.days_until,
            }),
            None => warn!(
                recurring = %def.id,
                frequency = %def.frequency,
                "skipping recurring definition with unscheduled frequency"
            ),
        }
    }

    // sort_by_key is stable
    result.sort_by_key(|u| u.days_until);
    Ok(result)
}

fn required_day(def: &RecurringDefinition) -> FintrackResult<u32> {
    match def.day_of_month {
        Some(day) if (1..=31).contains(&day) => Ok(day),
        Some(day) => Err(FintrackError::InvalidDefinition(format!(
            "{} has day_of_month {} outside 1-31",
            def.id, day
        ))),
        None => Err(FintrackError::InvalidDefinition(format!(
            "{} is {} but has no day_of_month",
            def.id,
            def.frequency.to_string().to_lowercase()
        ))),
    }
}

fn required_month(def: &RecurringDefinition) -> FintrackResult<u32> {
    match def.month_of_year {
        Some(month) if (1..=12).contains(&month) => Ok(month),
        Some(month) => Err(FintrackError::InvalidDefinition(format!(
            "{} has month_of_year {} outside 1-12",
            def.id, month
        ))),
        None => Err(FintrackError::InvalidDefinition(format!(
            "{} is yearly but has no month_of_year",
            def.id
        ))),
    }
}

/// Build a date from a zero-based month that may exceed 11 and a day that may
/// exceed the month length, carrying the excess forward.
fn calendar_date(year: i32, month0: i64, day: u32) -> FintrackResult<NaiveDate> {
    let year = year as i64 + month0.div_euclid(12);
    let month = month0.rem_euclid(12) as u32 + 1;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .and_then(|first| first.checked_add_days(Days::new(u64::from(day.saturating_sub(1)))))
        .ok_or_else(|| {
            FintrackError::InvalidDefinition(format!(
                "date out of range: year {}, month {}, day {}",
                year, month, day
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountKind, Money, RecurringKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(day: u32) -> RecurringDefinition {
        RecurringDefinition::monthly(
            RecurringKind::Expense,
            Money::from_cents(1000),
            "Bills",
            AccountKind::Bank,
            day,
            date(2020, 1, 1),
        )
    }

    fn yearly(month: u32, day: u32) -> RecurringDefinition {
        RecurringDefinition::yearly(
            RecurringKind::Expense,
            Money::from_cents(1000),
            "Insurance",
            AccountKind::Bank,
            month,
            day,
            date(2020, 1, 1),
        )
    }

    #[test]
    fn test_monthly_due_only_on_its_day() {
        let def = monthly(15);
        assert!(is_due_today(&def, date(2024, 3, 15)).unwrap());
        assert!(!is_due_today(&def, date(2024, 3, 16)).unwrap());
    }

    #[test]
    fn test_yearly_due_needs_month_and_day() {
        let def = yearly(6, 1);
        assert!(is_due_today(&def, date(2024, 6, 1)).unwrap());
        assert!(!is_due_today(&def, date(2024, 7, 1)).unwrap());
    }

    #[test]
    fn test_inactive_is_never_due() {
        let mut def = monthly(15);
        def.is_active = false;
        assert!(!is_due_today(&def, date(2024, 3, 15)).unwrap());
    }

    #[test]
    fn test_monthly_next_occurrence_same_month() {
        let next = next_occurrence(&monthly(20), date(2024, 3, 5))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 3, 20));
        assert_eq!(next.days_until, 15);
    }

    #[test]
    fn test_monthly_next_occurrence_due_today_is_zero_days() {
        let next = next_occurrence(&monthly(5), date(2024, 3, 5))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 3, 5));
        assert_eq!(next.days_until, 0);
    }

    #[test]
    fn test_monthly_rolls_into_next_year() {
        let next = next_occurrence(&monthly(1), date(2024, 12, 15))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2025, 1, 1));
        assert_eq!(next.days_until, 17);
    }

    #[test]
    fn test_yearly_rollover() {
        let next = next_occurrence(&yearly(1, 10), date(2024, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2025, 1, 10));
        assert_eq!(
            next.days_until,
            (date(2025, 1, 10) - date(2024, 6, 1)).num_days()
        );
        assert_eq!(next.days_until, 223);
    }

    #[test]
    fn test_yearly_later_this_year() {
        let next = next_occurrence(&yearly(6, 20), date(2024, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 6, 20));
        assert_eq!(next.days_until, 19);
    }

    #[test]
    fn test_day_overflow_rolls_into_following_month() {
        let next = next_occurrence(&monthly(31), date(2024, 4, 5))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 5, 1));
        assert_eq!(next.days_until, 26);

        // Feb 30 in a leap year is March 1st
        let next = next_occurrence(&yearly(2, 30), date(2024, 1, 1))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 3, 1));
    }

    #[test]
    fn test_day_31_after_month_end_lands_in_march() {
        // Due today on the 31st itself
        let next = next_occurrence(&monthly(31), date(2024, 1, 31))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 1, 31));
        assert_eq!(next.days_until, 0);

        // Feb 31 in a leap year carries to March 2nd
        let next = next_occurrence(&monthly(31), date(2024, 2, 1))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2024, 3, 2));
        assert_eq!(next.days_until, 30);
    }

    #[test]
    fn test_leap_day_in_common_year_is_march_first() {
        let next = next_occurrence(&yearly(2, 29), date(2025, 1, 1))
            .unwrap()
            .unwrap();
        assert_eq!(next.date, date(2025, 3, 1));
        assert_eq!(next.days_until, 59);
    }

    #[test]
    fn test_unscheduled_frequencies() {
        let mut def = monthly(1);
        def.frequency = Frequency::Weekly;
        def.day_of_week = Some(1);

        assert!(!is_due_today(&def, date(2024, 3, 1)).unwrap());
        assert_eq!(next_occurrence(&def, date(2024, 3, 1)).unwrap(), None);
    }

    #[test]
    fn test_missing_fields_are_invalid() {
        let mut def = monthly(1);
        def.day_of_month = None;
        let err = is_due_today(&def, date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, FintrackError::InvalidDefinition(_)));

        let mut def = yearly(3, 1);
        def.month_of_year = None;
        assert!(next_occurrence(&def, date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_upcoming_sorted_by_days_until() {
        let today = date(2024, 3, 5);
        let defs = vec![monthly(15), monthly(5), monthly(10)];

        let upcoming = upcoming(&defs, today).unwrap();
        let days: Vec<i64> = upcoming.iter().map(|u| u.days_until).collect();
        assert_eq!(days, vec![0, 5, 10]);
        assert_eq!(upcoming[0].definition.id, defs[1].id);
    }

    #[test]
    fn test_upcoming_ties_keep_input_order() {
        let today = date(2024, 3, 5);
        let defs = vec![monthly(9), monthly(9), monthly(9)];

        let upcoming = upcoming(&defs, today).unwrap();
        let ids: Vec<_> = upcoming.iter().map(|u| u.definition.id).collect();
        let expected: Vec<_> = defs.iter().map(|d| d.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_upcoming_skips_inactive_and_unscheduled() {
        let mut paused = monthly(7);
        paused.is_active = false;
        let mut weekly = monthly(1);
        weekly.frequency = Frequency::Weekly;
        let defs = vec![paused, weekly, monthly(8)];

        let upcoming = upcoming(&defs, date(2024, 3, 5)).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].next_date, date(2024, 3, 8));
    }

    #[test]
    fn test_evaluation_does_not_touch_definition() {
        let def = monthly(20);
        let before = def.clone();
        let _ = next_occurrence(&def, date(2024, 3, 5)).unwrap();
        let _ = is_due_today(&def, date(2024, 3, 20)).unwrap();
        assert_eq!(def, before);
    }
}
