//! Today's schedule as first fetched, kept in the key/value store.
//!
//! The scheduler re-plans from whatever is still pending, so asking it again
//! later in the day returns a different schedule and invalidates every
//! checkmark. The first fetch of a day is reused until the date changes or a
//! regeneration is requested.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::kv::KvStore;
use crate::schedule::Schedule;
use crate::session::SessionDescriptor;

pub const KEY_CACHED_SCHEDULE: &str = "cached_schedule";

#[derive(Debug, Serialize, Deserialize)]
struct CachedSchedule {
    date: NaiveDate,
    sessions: Vec<SessionDescriptor>,
}

/// The cached schedule if it was fetched on `today`. Unreadable entries count
/// as a miss.
pub fn load_cached<K: KvStore>(kv: &K, today: NaiveDate) -> Option<Schedule> {
    let raw = match kv.get(KEY_CACHED_SCHEDULE) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable schedule cache; fetching");
            return None;
        }
    };

    match serde_json::from_str::<CachedSchedule>(&raw) {
        Ok(cached) if cached.date == today => Some(Schedule::new(cached.date, cached.sessions)),
        Ok(cached) => {
            tracing::debug!(cached_date = %cached.date, %today, "schedule cache is stale");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "corrupt schedule cache; fetching");
            None
        }
    }
}

/// Failures are logged; the next run simply fetches again.
pub fn store_cached<K: KvStore>(kv: &mut K, schedule: &Schedule) {
    let cached = CachedSchedule {
        date: schedule.date(),
        sessions: schedule.sessions().to_vec(),
    };
    let res = serde_json::to_string(&cached)
        .map_err(anyhow::Error::from)
        .and_then(|json| kv.set(KEY_CACHED_SCHEDULE, &json));
    if let Err(e) = res {
        tracing::warn!(error = %e, "failed to cache schedule");
    }
}
