//! Task model shared by the day plan, the reconciler and the projector.
//!
//! Progress is only ever written by the reconciler; the `Completed` status is
//! only reached through the completion workflow's remote call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes assumed when a task carries no estimate at all.
pub const DEFAULT_ESTIMATE_MINUTES: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Case-insensitive; anything unrecognised is treated as `Medium`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "urgent" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "easy" => Complexity::Low,
            "high" | "hard" => Complexity::High,
            _ => Complexity::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: Priority,

    /// Hard deadline (UTC). The projector assumes a week out when absent.
    pub deadline: Option<DateTime<Utc>>,

    /// Minutes, see [`resolve_estimate`].
    pub estimated_duration: i32,

    pub complexity: Complexity,

    /// 0-100.
    pub progress: u8,

    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: "General".to_string(),
            priority: Priority::Medium,
            deadline: None,
            estimated_duration: DEFAULT_ESTIMATE_MINUTES,
            complexity: Complexity::Medium,
            progress: 0,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_duration(mut self, minutes: i32) -> Self {
        self.estimated_duration = minutes;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn set_progress(&mut self, percent: i64) {
        self.progress = percent.clamp(0, 100) as u8;
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Pick the effective estimate: manual entry, then the model prediction, then
/// the category default. Zero or negative values count as absent.
pub fn resolve_estimate(
    manual: Option<i32>,
    ml_predicted: Option<i32>,
    default_expected: Option<i32>,
) -> i32 {
    [manual, ml_predicted, default_expected]
        .into_iter()
        .flatten()
        .find(|m| *m > 0)
        .unwrap_or(DEFAULT_ESTIMATE_MINUTES)
}
