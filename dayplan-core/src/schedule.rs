//! Today's ordered schedule paired with its date and fingerprint.

use chrono::NaiveDate;

use crate::fingerprint::fingerprint;
use crate::session::SessionDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    date: NaiveDate,
    sessions: Vec<SessionDescriptor>,
    fingerprint: String,
}

impl Schedule {
    pub fn new(date: NaiveDate, sessions: Vec<SessionDescriptor>) -> Self {
        let fingerprint = fingerprint(&sessions);
        Self {
            date,
            sessions,
            fingerprint,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn sessions(&self) -> &[SessionDescriptor] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SessionDescriptor> {
        self.sessions.get(index)
    }

    /// Every position holding a session of `task_id`, ascending.
    pub fn positions_of(&self, task_id: &str) -> Vec<usize> {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.task_id == task_id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct task ids in order of first appearance.
    pub fn task_ids(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in &self.sessions {
            if !out.contains(&s.task_id.as_str()) {
                out.push(&s.task_id);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn positions_and_task_order() {
        let at = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            vec![
                SessionDescriptor::single("b", "B", at, 30),
                SessionDescriptor::single("a", "A", at, 30),
                SessionDescriptor::single("b", "B", at, 30),
            ],
        );

        assert_eq!(schedule.positions_of("b"), vec![0, 2]);
        assert!(schedule.positions_of("zzz").is_empty());
        assert_eq!(schedule.task_ids(), vec!["b", "a"]);
        assert_eq!(schedule.fingerprint(), "b_0|a_0|b_0");
    }
}
