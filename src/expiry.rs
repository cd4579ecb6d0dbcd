//! Expiry arithmetic.
//!
//! Two models coexist:
//! - [`compute_expiry`] is calendar-aware and used by the issuer. Months and
//!   years follow the calendar, clamping to the last day of shorter months.
//! - [`approx_valid_days`] maps a unit to a fixed day count (months = 30,
//!   years = 365) and is used by the key store.

use chrono::{DateTime, Days, Months, TimeZone};

use crate::error::{AppError, Result};
use crate::models::DurationUnit;

const MONTHS_PER_YEAR: u32 = 12;
const DAYS_PER_WEEK: u64 = 7;

/// Add `amount` calendar units to `now`.
///
/// Days and weeks are exact 24h multiples; months and years land on the same
/// day-of-month, or the last day of the month when that day does not exist.
pub fn compute_expiry<Tz: TimeZone>(
    now: DateTime<Tz>,
    unit: DurationUnit,
    amount: u32,
) -> Result<DateTime<Tz>> {
    if amount == 0 {
        return Err(AppError::invalid("amount must be a positive integer"));
    }

    let amount_u64 = u64::from(amount);
    let expires = match unit {
        DurationUnit::Days => now.checked_add_days(Days::new(amount_u64)),
        DurationUnit::Weeks => now.checked_add_days(Days::new(amount_u64 * DAYS_PER_WEEK)),
        DurationUnit::Months => now.checked_add_months(Months::new(amount)),
        DurationUnit::Years => amount
            .checked_mul(MONTHS_PER_YEAR)
            .and_then(|months| now.checked_add_months(Months::new(months))),
    };

    expires.ok_or_else(|| {
        AppError::invalid(format!("expiry of {} {} is out of range", amount, unit))
    })
}

/// Approximate validity in days: `duration` times the unit's fixed multiplier.
pub fn approx_valid_days(unit: DurationUnit, duration: u32) -> Result<i64> {
    if duration == 0 {
        return Err(AppError::invalid("duration must be a positive integer"));
    }
    Ok(i64::from(duration) * unit.approx_days())
}
