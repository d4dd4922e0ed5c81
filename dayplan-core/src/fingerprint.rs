//! Schedule identity fingerprint.
//!
//! Order-sensitive summary of a day's composition, used to notice that the
//! schedule was regenerated since completion state was saved. Not a
//! cryptographic digest.

use crate::session::SessionDescriptor;

const ENTRY_DELIMITER: &str = "|";

/// `task_id + "_" + session_num` for every entry (0 when the scheduler sent
/// no session info), joined in schedule order.
pub fn fingerprint(sessions: &[SessionDescriptor]) -> String {
    sessions
        .iter()
        .map(|s| format!("{}_{}", s.task_id, s.info.session_num().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(ENTRY_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn sample() -> Vec<SessionDescriptor> {
        vec![
            SessionDescriptor::multi("a", "A 1/2", at(9), 30, 1, 2),
            SessionDescriptor::single("b", "B", at(10), 45),
            SessionDescriptor::multi("a", "A 2/2", at(11), 30, 2, 2),
        ]
    }

    #[test]
    fn is_deterministic_and_readable() {
        assert_eq!(fingerprint(&sample()), "a_1|b_0|a_2");
        assert_eq!(fingerprint(&sample()), fingerprint(&sample()));
        assert_eq!(fingerprint(&[]), "");
    }

    #[test]
    fn swapping_distinct_entries_changes_it() {
        let base = sample();
        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let mut swapped = base.clone();
            swapped.swap(i, j);
            assert_ne!(fingerprint(&base), fingerprint(&swapped), "swap {i}<->{j}");
        }
    }

    #[test]
    fn insertion_and_removal_change_it() {
        let base = sample();

        let mut removed = base.clone();
        removed.pop();
        assert_ne!(fingerprint(&base), fingerprint(&removed));

        let mut inserted = base.clone();
        inserted.push(SessionDescriptor::single("c", "C", at(14), 20));
        assert_ne!(fingerprint(&base), fingerprint(&inserted));
    }

    #[test]
    fn ignores_times_and_titles() {
        let mut moved = sample();
        moved[1].start = Some(at(15));
        moved[1].title = "B (rescheduled)".into();
        assert_eq!(fingerprint(&sample()), fingerprint(&moved));
    }
}
