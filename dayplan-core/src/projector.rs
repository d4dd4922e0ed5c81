//! Long-term plan projector.
//!
//! Spreads one task's estimate over the days left before its deadline, for
//! the task detail view. Independent of the day schedule: nothing here is
//! reconciled against what the scheduler actually planned.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::reconcile::percent;
use crate::task::Task;
use crate::time::{days_until, local_today};

/// Tasks this short are done in one sitting.
pub const SINGLE_SITTING_MINUTES: i32 = 45;

/// Horizon assumed when a task has no deadline.
pub const DEFAULT_HORIZON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedSession {
    pub date: NaiveDate,
    /// Minutes.
    pub duration: i32,
    pub focus: String,
}

/// Split the task's estimate into per-day sessions starting today.
///
/// Durations differ by at most one minute and always sum to the estimate.
/// A far-off deadline never yields sessions shorter than a minute.
pub fn project(task: &Task, now: DateTime<Utc>, tz: Tz) -> Vec<PlannedSession> {
    let total = task.estimated_duration.max(0);
    let deadline = task
        .deadline
        .unwrap_or_else(|| now + Duration::days(DEFAULT_HORIZON_DAYS));
    let days = days_until(deadline, now);

    let num_sessions: i32 = if total <= SINGLE_SITTING_MINUTES {
        1
    } else {
        days.clamp(2, i64::from(total)) as i32
    };

    let base = total / num_sessions;
    let remainder = total % num_sessions;
    let today = local_today(now, tz);

    (0..num_sessions)
        .map(|i| {
            let duration = if i < remainder { base + 1 } else { base };
            let share = percent(duration as usize, total as usize).unwrap_or(0);
            PlannedSession {
                date: today + Duration::days(i.into()),
                duration,
                focus: format!("Part {}: {}% of task", i + 1, share),
            }
        })
        .collect()
}
