//! Calendar utilities mapping fractional game days onto real dates.
//!
//! Game time is a count of days since the start date; the integer part selects
//! the calendar day. Week boundaries follow Monday-based ISO weeks.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Calendar date reached after `days_elapsed` simulated days.
///
/// Non-finite inputs map to the start date.
pub fn game_date(start: NaiveDate, days_elapsed: f64) -> NaiveDate {
    if !days_elapsed.is_finite() {
        return start;
    }
    let whole = days_elapsed.floor();
    let shifted = if whole >= 0.0 {
        start.checked_add_days(Days::new(whole as u64))
    } else {
        start.checked_sub_days(Days::new((-whole) as u64))
    };
    shifted.unwrap_or(start)
}

/// Integer day number of a fractional game time.
pub fn day_number(days_elapsed: f64) -> i64 {
    days_elapsed.floor() as i64
}

/// True when `prev` and `next` fall into different ISO weeks.
pub fn is_new_week(start: NaiveDate, prev: f64, next: f64) -> bool {
    game_date(start, prev).iso_week() != game_date(start, next).iso_week()
}

/// True when `prev` and `next` fall into different calendar months (or years).
pub fn is_new_month(start: NaiveDate, prev: f64, next: f64) -> bool {
    let a = game_date(start, prev);
    let b = game_date(start, next);
    (a.year(), a.month()) != (b.year(), b.month())
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    match (
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
        NaiveDate::from_ymd_opt(y, m, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 30,
    }
}

/// Number of Monday-Friday days in the month containing `date`.
pub fn weekdays_in_month(date: NaiveDate) -> u32 {
    (1..=days_in_month(date))
        .filter_map(|d| NaiveDate::from_ymd_opt(date.year(), date.month(), d))
        .filter(|d| !is_weekend(*d))
        .count() as u32
}

/// Share of the month's days that are working days, in (0, 1].
pub fn weekday_fraction(date: NaiveDate) -> f64 {
    let total = days_in_month(date);
    if total == 0 {
        return 1.0;
    }
    weekdays_in_month(date) as f64 / total as f64
}

/// Period boundaries crossed when time moves from `prev` to `next`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub new_day: bool,
    pub new_week: bool,
    pub new_month: bool,
}

/// Classify a time step. `last_day` is the day number the caller last processed.
pub fn boundaries(start: NaiveDate, last_day: i64, prev: f64, next: f64) -> Boundaries {
    Boundaries {
        new_day: day_number(next) != last_day,
        new_week: is_new_week(start, prev, next),
        new_month: is_new_month(start, prev, next),
    }
}
