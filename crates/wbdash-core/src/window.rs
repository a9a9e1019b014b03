//! Trailing-window date math shared by the orders pull and the summary builder.
//!
//! All dates are UTC calendar days. The window is `[today - 29, today]`
//! inclusive, oldest first.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Duration, NaiveDate, Utc};

/// Number of days in the trailing window and length of every daily series.
pub const WINDOW_DAYS: usize = 30;

/// How far back the upstream order feed is queried.
pub const LOOKBACK_DAYS: i64 = 30;

/// The window's calendar days, oldest to newest, ending at `today`.
#[must_use]
pub fn trailing_window(today: NaiveDate) -> [NaiveDate; WINDOW_DAYS] {
    std::array::from_fn(|i| today - Days::new((WINDOW_DAYS - 1 - i) as u64))
}

/// Reads one bucket per window day from `daily`, filling gaps with 0.
///
/// Always yields exactly [`WINDOW_DAYS`] values regardless of which dates
/// are present in `daily`; dates outside the window are ignored.
#[must_use]
pub fn daily_series(daily: &BTreeMap<NaiveDate, u64>, today: NaiveDate) -> [u64; WINDOW_DAYS] {
    trailing_window(today).map(|day| daily.get(&day).copied().unwrap_or(0))
}

/// Start of the upstream order query, `now - LOOKBACK_DAYS`.
#[must_use]
pub fn lookback_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(LOOKBACK_DAYS)
}
