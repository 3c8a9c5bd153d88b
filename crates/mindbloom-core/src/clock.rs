//! Wall-clock helpers shared by the scheduler and the lifecycle manager.
//!
//! Pure functions only -- nothing here holds state or spawns timers.
//! Components take the instants they compare as values, so a single `now`
//! read at the top of an operation stays consistent across its guards.

use chrono::{DateTime, Duration, Local, Utc};

/// Current wall-clock instant.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// The instant `minutes` minutes before `instant`.
pub fn minutes_before(instant: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    instant - Duration::minutes(i64::from(minutes))
}

/// Whole minutes from `now` until `instant`. Negative once passed.
pub fn minutes_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (instant - now).num_minutes()
}

/// The instant `days` days before `instant`.
pub fn days_before(instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    instant - Duration::days(days)
}

/// Whether two instants fall on the same calendar day in the user's local
/// timezone. Day boundaries follow the device zone, not UTC.
pub fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.with_timezone(&Local).date_naive() == b.with_timezone(&Local).date_naive()
}
