//! Time utilities: the local "today" and whole-day distances.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar date of `now` in `tz`. Completion state is scoped to this day.
pub fn local_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Days from `now` until `deadline`, rounded up, never below 1.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds() as f64;
    ((millis / MILLIS_PER_DAY).ceil() as i64).max(1)
}
