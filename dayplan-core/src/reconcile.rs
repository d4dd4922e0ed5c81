//! Progress reconciler: task-level completion derived from session checkmarks.

use std::collections::HashSet;

use crate::completion::{CompletionState, Toggle};
use crate::schedule::Schedule;
use crate::session::SessionInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub task_id: String,
    pub total_sessions: usize,
    pub completed_sessions: usize,
    /// `None` when the task has no sessions to count against; callers keep
    /// the previous progress in that case.
    pub progress: Option<u8>,
    /// This toggle finished the task and should open the completion workflow.
    pub completes_task: bool,
}

/// Recompute progress for the task owning `index` after `toggle` was applied
/// to `state`. Returns `None` if `index` is not in the schedule.
pub fn reconcile(
    schedule: &Schedule,
    state: &CompletionState,
    index: usize,
    toggle: Toggle,
) -> Option<Reconciliation> {
    let session = schedule.get(index)?;
    let task_id = session.task_id.as_str();
    let positions = schedule.positions_of(task_id);

    let total_sessions = match session.info {
        SessionInfo::Multi { total_sessions, .. } => total_sessions as usize,
        SessionInfo::Single => positions.len(),
    };

    let completed_sessions = match session.info {
        SessionInfo::Multi { .. } => {
            // The scheduler may list the same numbered session twice; count it once.
            let done: HashSet<_> = positions
                .iter()
                .filter(|p| state.contains(**p))
                .map(|p| schedule.sessions()[*p].identity(*p))
                .collect();
            done.len()
        }
        SessionInfo::Single => positions.iter().filter(|p| state.contains(**p)).count(),
    };

    let progress = percent(completed_sessions, total_sessions);

    let is_final_session = match session.info {
        SessionInfo::Single => true,
        SessionInfo::Multi {
            session_num,
            total_sessions,
        } => session_num == total_sessions,
    };
    let completes_task = toggle.is_check()
        && total_sessions > 0
        && completed_sessions == total_sessions
        && is_final_session;

    Some(Reconciliation {
        task_id: task_id.to_string(),
        total_sessions,
        completed_sessions,
        progress,
        completes_task,
    })
}

/// `round(100 * done / total)`, half-up, clamped to 0..=100.
pub fn percent(done: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let p = (100.0 * done as f64 / total as f64).round();
    Some(p.clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDescriptor;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn build(sessions: Vec<SessionDescriptor>) -> (Schedule, CompletionState) {
        let s = Schedule::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), sessions);
        let state = CompletionState::empty(s.date(), s.fingerprint());
        (s, state)
    }

    fn check(state: &mut CompletionState, i: usize) -> Toggle {
        if state.indices.remove(&i) {
            Toggle::Unchecked
        } else {
            state.indices.insert(i);
            Toggle::Checked
        }
    }

    #[test]
    fn single_session_task_counts_schedule_positions() {
        let (s, mut state) = build(vec![
            SessionDescriptor::single("a", "A", at(9), 30),
            SessionDescriptor::single("b", "B", at(10), 30),
            SessionDescriptor::single("a", "A", at(11), 30),
            SessionDescriptor::single("a", "A", at(13), 30),
        ]);

        let t = check(&mut state, 0);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!((r.completed_sessions, r.total_sessions), (1, 3));
        assert_eq!(r.progress, Some(33));
        assert!(!r.completes_task);

        let t = check(&mut state, 2);
        assert_eq!(reconcile(&s, &state, 2, t).unwrap().progress, Some(67));

        let t = check(&mut state, 3);
        let r = reconcile(&s, &state, 3, t).unwrap();
        assert_eq!(r.progress, Some(100));
        assert!(r.completes_task);
        assert_eq!(r.task_id, "a");
    }

    #[test]
    fn multi_session_completes_on_final_session() {
        let (s, mut state) = build(vec![
            SessionDescriptor::multi("A", "A 1/2", at(9), 30, 1, 2),
            SessionDescriptor::multi("A", "A 2/2", at(10), 30, 2, 2),
        ]);

        let t = check(&mut state, 0);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!(r.progress, Some(50));
        assert!(!r.completes_task);

        let t = check(&mut state, 1);
        let r = reconcile(&s, &state, 1, t).unwrap();
        assert_eq!(r.progress, Some(100));
        assert!(r.completes_task);
    }

    #[test]
    fn finishing_out_of_order_does_not_complete_on_a_middle_session() {
        let (s, mut state) = build(vec![
            SessionDescriptor::multi("A", "A 1/2", at(9), 30, 1, 2),
            SessionDescriptor::multi("A", "A 2/2", at(10), 30, 2, 2),
        ]);

        check(&mut state, 1);
        let t = check(&mut state, 0);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!(r.progress, Some(100));
        assert!(!r.completes_task);
    }

    #[test]
    fn duplicate_session_numbers_are_counted_once() {
        let (s, mut state) = build(vec![
            SessionDescriptor::multi("A", "A 1/3", at(9), 30, 1, 3),
            SessionDescriptor::multi("A", "A 1/3", at(10), 30, 1, 3),
        ]);

        check(&mut state, 0);
        let t = check(&mut state, 1);
        let r = reconcile(&s, &state, 1, t).unwrap();
        assert_eq!(r.completed_sessions, 1);
        assert_eq!(r.progress, Some(33));
    }

    #[test]
    fn external_total_governs_partial_days() {
        // Only session 2 of 4 is on today's plan.
        let (s, mut state) = build(vec![SessionDescriptor::multi("A", "A 2/4", at(9), 30, 2, 4)]);
        let t = check(&mut state, 0);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!(r.progress, Some(25));
        assert!(!r.completes_task);
    }

    #[test]
    fn unchecking_never_completes() {
        let (s, mut state) = build(vec![SessionDescriptor::single("a", "A", at(9), 30)]);
        check(&mut state, 0);
        let t = check(&mut state, 0);
        assert_eq!(t, Toggle::Unchecked);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!(r.progress, Some(0));
        assert!(!r.completes_task);
    }

    #[test]
    fn zero_total_leaves_progress_unset() {
        let (s, mut state) = build(vec![SessionDescriptor::multi("A", "A", at(9), 30, 0, 0)]);
        let t = check(&mut state, 0);
        let r = reconcile(&s, &state, 0, t).unwrap();
        assert_eq!(r.progress, None);
        assert!(!r.completes_task);
    }

    #[test]
    fn unknown_index_yields_none() {
        let (s, state) = build(vec![]);
        assert!(reconcile(&s, &state, 0, Toggle::Checked).is_none());
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 8), Some(13));
        assert_eq!(percent(1, 3), Some(33));
        assert_eq!(percent(5, 3), Some(100));
    }
}
