//! Completion state store.
//!
//! Holds the set of schedule positions marked done today, plus the tasks whose
//! completion prompt was dismissed. Persisted state is
//! only trusted when both its date and its schedule fingerprint match the
//! current schedule; anything else (stale day, regenerated schedule,
//! unreadable storage) is replaced by an empty state for today.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::kv::KvStore;
use crate::schedule::Schedule;

pub const KEY_COMPLETED_ITEMS: &str = "completed_schedule_items";
pub const KEY_SCHEDULE_DATE: &str = "schedule_date";
pub const KEY_SCHEDULE_HASH: &str = "schedule_hash";
pub const KEY_AWAITING_CONFIRMATION: &str = "awaiting_confirmation";

const PERSISTED_KEYS: [&str; 4] = [
    KEY_COMPLETED_ITEMS,
    KEY_SCHEDULE_DATE,
    KEY_SCHEDULE_HASH,
    KEY_AWAITING_CONFIRMATION,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionState {
    pub indices: BTreeSet<usize>,
    pub date: NaiveDate,
    pub fingerprint: String,
    /// Task ids whose sessions are all done but whose completion prompt was
    /// dismissed.
    #[serde(default)]
    pub awaiting: BTreeSet<String>,
}

impl CompletionState {
    pub fn empty(date: NaiveDate, fingerprint: impl Into<String>) -> Self {
        Self {
            indices: BTreeSet::new(),
            date,
            fingerprint: fingerprint.into(),
            awaiting: BTreeSet::new(),
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn matches(&self, today: NaiveDate, fingerprint: &str) -> bool {
        self.date == today && self.fingerprint == fingerprint
    }
}

/// Direction of a toggle. Only a check can hand a task to the completion
/// workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Checked,
    Unchecked,
}

impl Toggle {
    pub fn is_check(self) -> bool {
        self == Toggle::Checked
    }
}

#[derive(Debug)]
pub struct CompletionStore<K: KvStore> {
    kv: K,
    state: CompletionState,
    schedule_len: usize,
}

impl<K: KvStore> CompletionStore<K> {
    /// Open the store against `schedule` and load whatever prior state is
    /// still valid for it.
    pub fn open(kv: K, schedule: &Schedule, today: NaiveDate) -> Self {
        let mut store = Self {
            kv,
            state: CompletionState::empty(today, schedule.fingerprint()),
            schedule_len: schedule.len(),
        };
        store.load(schedule, today);
        store
    }

    /// Re-validate persisted state against `schedule` and `today`.
    ///
    /// Never fails: read errors behave exactly like "no prior state".
    pub fn load(&mut self, schedule: &Schedule, today: NaiveDate) -> &CompletionState {
        self.schedule_len = schedule.len();
        let fingerprint = schedule.fingerprint();

        match self.read_persisted() {
            Ok(Some(mut prior)) if prior.matches(today, fingerprint) => {
                let before = prior.indices.len();
                prior.indices.retain(|i| *i < schedule.len());
                let trimmed = prior.indices.len() != before;
                self.state = prior;
                if trimmed {
                    tracing::debug!("dropped completion indices outside today's schedule");
                    self.persist();
                }
            }
            Ok(Some(prior)) => {
                tracing::info!(
                    stored_date = %prior.date,
                    today = %today,
                    fingerprint_changed = prior.fingerprint != fingerprint,
                    "schedule drift; discarding saved completion state"
                );
                self.state = CompletionState::empty(today, fingerprint);
                self.persist();
            }
            Ok(None) => {
                self.state = CompletionState::empty(today, fingerprint);
                self.persist();
            }
            Err(e) => {
                tracing::warn!(error = %e, "unreadable completion state; starting empty");
                self.state = CompletionState::empty(today, fingerprint);
                self.persist();
            }
        }

        &self.state
    }

    /// Flip membership of `index` and persist the result immediately.
    pub fn toggle(&mut self, index: usize) -> Result<Toggle> {
        if index >= self.schedule_len {
            bail!(
                "session index {index} out of range (schedule has {} entries)",
                self.schedule_len
            );
        }

        let toggle = if self.state.indices.remove(&index) {
            Toggle::Unchecked
        } else {
            self.state.indices.insert(index);
            Toggle::Checked
        };
        self.persist();
        Ok(toggle)
    }

    /// Forget everything; used when the schedule is regenerated on request.
    pub fn reset(&mut self) {
        self.state.indices.clear();
        self.state.awaiting.clear();
        clear_persisted(&mut self.kv);
    }

    /// Record or clear a dismissed completion prompt for `task_id`.
    pub fn set_awaiting(&mut self, task_id: &str, awaiting: bool) {
        let changed = if awaiting {
            self.state.awaiting.insert(task_id.to_string())
        } else {
            self.state.awaiting.remove(task_id)
        };
        if changed {
            self.persist();
        }
    }

    pub fn awaiting(&self) -> impl Iterator<Item = &str> {
        self.state.awaiting.iter().map(String::as_str)
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.state.contains(index)
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn into_kv(self) -> K {
        self.kv
    }

    fn read_persisted(&self) -> Result<Option<CompletionState>> {
        let Some(date) = self.kv.get(KEY_SCHEDULE_DATE)? else {
            return Ok(None);
        };
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("invalid {KEY_SCHEDULE_DATE} '{date}'"))?;

        let fingerprint = self.kv.get(KEY_SCHEDULE_HASH)?.unwrap_or_default();

        let indices = match self.kv.get(KEY_COMPLETED_ITEMS)? {
            Some(raw) => serde_json::from_str::<BTreeSet<usize>>(&raw)
                .with_context(|| format!("invalid {KEY_COMPLETED_ITEMS}"))?,
            None => BTreeSet::new(),
        };

        let awaiting = match self.kv.get(KEY_AWAITING_CONFIRMATION)? {
            Some(raw) => serde_json::from_str::<BTreeSet<String>>(&raw)
                .with_context(|| format!("invalid {KEY_AWAITING_CONFIRMATION}"))?,
            None => BTreeSet::new(),
        };

        Ok(Some(CompletionState {
            indices,
            date,
            fingerprint,
            awaiting,
        }))
    }

    /// Storage write failures are logged; the in-memory state stays usable.
    fn persist(&mut self) {
        if let Err(e) = self.write_state() {
            tracing::warn!(error = %e, "failed to persist completion state");
        }
    }

    fn write_state(&mut self) -> Result<()> {
        let items = serde_json::to_string(&self.state.indices)?;
        let awaiting = serde_json::to_string(&self.state.awaiting)?;
        let date = self.state.date.format(DATE_FORMAT).to_string();
        self.kv.set(KEY_COMPLETED_ITEMS, &items)?;
        self.kv.set(KEY_SCHEDULE_DATE, &date)?;
        self.kv.set(KEY_SCHEDULE_HASH, &self.state.fingerprint)?;
        self.kv.set(KEY_AWAITING_CONFIRMATION, &awaiting)?;
        Ok(())
    }
}

/// Remove every persisted completion key. Failures are logged.
pub fn clear_persisted<K: KvStore>(kv: &mut K) {
    for key in PERSISTED_KEYS {
        if let Err(e) = kv.remove(key) {
            tracing::warn!(error = %e, key, "failed to clear completion state");
        }
    }
}
