//! Session descriptors as produced by the external scheduler.
//!
//! Wire shape (one entry of the schedule array):
//! `{task_id, title, start: "09:00 AM", end: "09:45 AM", duration, session_info?}`
//! where `session_info = {session_num, total_sessions, is_multi_session}`.
//!
//! Clock strings are display-only. They never take part in identity or the
//! fingerprint, so one that can't be read is dropped instead of failing the
//! whole schedule.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Whether the scheduler split this task into numbered sessions.
///
/// A wire `session_info` object always maps to `Multi`, even for `1 of 1`:
/// the scheduler's total is authoritative whenever it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInfo {
    Single,
    Multi { session_num: u32, total_sessions: u32 },
}

impl SessionInfo {
    pub fn session_num(&self) -> Option<u32> {
        match self {
            SessionInfo::Single => None,
            SessionInfo::Multi { session_num, .. } => Some(*session_num),
        }
    }

    pub fn total_sessions(&self) -> Option<u32> {
        match self {
            SessionInfo::Single => None,
            SessionInfo::Multi { total_sessions, .. } => Some(*total_sessions),
        }
    }
}

/// Identity of a session within a day: its session number when known,
/// otherwise its position in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionIdentity {
    Numbered { task_id: String, session_num: u32 },
    Positional { task_id: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionWire", into = "SessionWire")]
pub struct SessionDescriptor {
    pub task_id: String,
    pub title: String,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    /// Minutes.
    pub duration: i32,
    pub info: SessionInfo,
}

impl SessionDescriptor {
    pub fn single(
        task_id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveTime,
        duration: i32,
    ) -> Self {
        let end = start + chrono::Duration::minutes(duration.into());
        Self {
            task_id: task_id.into(),
            title: title.into(),
            start: Some(start),
            end: Some(end),
            duration,
            info: SessionInfo::Single,
        }
    }

    pub fn multi(
        task_id: impl Into<String>,
        title: impl Into<String>,
        start: NaiveTime,
        duration: i32,
        session_num: u32,
        total_sessions: u32,
    ) -> Self {
        Self {
            info: SessionInfo::Multi {
                session_num,
                total_sessions,
            },
            ..Self::single(task_id, title, start, duration)
        }
    }

    /// `"09:00 AM-09:45 AM"`, or `"--:--"` when the scheduler sent no
    /// readable start.
    pub fn time_range(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!(
                "{}-{}",
                start.format(DISPLAY_CLOCK_FORMAT),
                end.format(DISPLAY_CLOCK_FORMAT)
            ),
            (Some(start), None) => start.format(DISPLAY_CLOCK_FORMAT).to_string(),
            (None, _) => "--:--".to_string(),
        }
    }

    pub fn identity(&self, position: usize) -> SessionIdentity {
        match self.info {
            SessionInfo::Multi { session_num, .. } => SessionIdentity::Numbered {
                task_id: self.task_id.clone(),
                session_num,
            },
            SessionInfo::Single => SessionIdentity::Positional {
                task_id: self.task_id.clone(),
                position,
            },
        }
    }
}

/// Task ids come from a SQL backend and may be serialized as numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionInfoWire {
    session_num: u32,
    total_sessions: u32,
    #[serde(default)]
    is_multi_session: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionWire {
    task_id: WireId,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    duration: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_info: Option<SessionInfoWire>,
}

/// The scheduler's format.
const DISPLAY_CLOCK_FORMAT: &str = "%I:%M %p";
const CLOCK_FORMATS: [&str; 2] = [DISPLAY_CLOCK_FORMAT, "%H:%M"];

/// Accepts `"09:00 AM"` and `"09:00"`. Anything else is logged and dropped.
fn parse_clock(raw: Option<&str>, field: &'static str, task_id: &str) -> Option<NaiveTime> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok());
    if parsed.is_none() {
        tracing::warn!(task_id, field, value = raw, "unreadable session clock; ignoring");
    }
    parsed
}

impl TryFrom<SessionWire> for SessionDescriptor {
    type Error = String;

    fn try_from(w: SessionWire) -> Result<Self, Self::Error> {
        let task_id = w.task_id.into_string();
        let start = parse_clock(w.start.as_deref(), "start", &task_id);
        let end = parse_clock(w.end.as_deref(), "end", &task_id);

        let info = match w.session_info {
            Some(si) => SessionInfo::Multi {
                session_num: si.session_num,
                total_sessions: si.total_sessions,
            },
            None => SessionInfo::Single,
        };

        Ok(Self {
            task_id,
            title: w.title,
            start,
            end,
            duration: w.duration,
            info,
        })
    }
}

impl From<SessionDescriptor> for SessionWire {
    fn from(s: SessionDescriptor) -> Self {
        let session_info = match s.info {
            SessionInfo::Single => None,
            SessionInfo::Multi {
                session_num,
                total_sessions,
            } => Some(SessionInfoWire {
                session_num,
                total_sessions,
                is_multi_session: total_sessions > 1,
            }),
        };
        Self {
            task_id: WireId::Text(s.task_id),
            title: s.title,
            start: s.start.map(|t| t.format(DISPLAY_CLOCK_FORMAT).to_string()),
            end: s.end.map(|t| t.format(DISPLAY_CLOCK_FORMAT).to_string()),
            duration: s.duration,
            session_info,
        }
    }
}
