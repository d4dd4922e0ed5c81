//! One user's day: the fetched schedule, its completion state and the
//! task board, kept consistent as sessions are checked off.
//!
//! All mutation happens through `&mut self` on the caller's thread. Remote
//! writes are queued on a [`SyncQueue`] and never block or roll back local
//! state. The scheduler runs once per day (see [`crate::cache`]) unless a
//! refresh or regeneration asks for it.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::backend::PlannerBackend;
use crate::board::TaskBoard;
use crate::cache::{load_cached, store_cached};
use crate::completion::{clear_persisted, CompletionStore, Toggle};
use crate::kv::KvStore;
use crate::reconcile::{reconcile, Reconciliation};
use crate::schedule::Schedule;
use crate::sync::SyncQueue;
use crate::task::Task;
use crate::workflow::{ActualTimePrompt, CompletionOutcome, CompletionWorkflow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleReport {
    pub index: usize,
    pub toggle: Toggle,
    pub reconciliation: Option<Reconciliation>,
    pub completion: Option<CompletionOutcome>,
}

pub struct DayPlan<K: KvStore> {
    user_id: String,
    backend: Arc<dyn PlannerBackend>,
    schedule: Schedule,
    store: CompletionStore<K>,
    board: TaskBoard,
    workflow: CompletionWorkflow,
    sync: SyncQueue,
}

impl<K: KvStore> DayPlan<K> {
    /// Load today's schedule (cached, or fetched on the day's first open)
    /// and open tasks, then load completion state.
    ///
    /// A failed schedule fetch is an error: there is nothing to reconcile.
    pub async fn open(
        backend: Arc<dyn PlannerBackend>,
        kv: K,
        user_id: impl Into<String>,
        today: NaiveDate,
    ) -> Result<Self> {
        Self::build(backend, kv, user_id.into(), today, false).await
    }

    /// Manual regeneration from a cold start: today's checkmarks are dropped
    /// and the scheduler runs exactly once.
    pub async fn open_regenerated(
        backend: Arc<dyn PlannerBackend>,
        mut kv: K,
        user_id: impl Into<String>,
        today: NaiveDate,
    ) -> Result<Self> {
        clear_persisted(&mut kv);
        Self::build(backend, kv, user_id.into(), today, true).await
    }

    async fn build(
        backend: Arc<dyn PlannerBackend>,
        mut kv: K,
        user_id: String,
        today: NaiveDate,
        force_fetch: bool,
    ) -> Result<Self> {
        let cached = if force_fetch {
            None
        } else {
            load_cached(&kv, today)
        };
        let schedule = match cached {
            Some(schedule) => schedule,
            None => {
                let schedule = fetch_schedule(backend.as_ref(), &user_id, today).await?;
                store_cached(&mut kv, &schedule);
                schedule
            }
        };
        let board = fetch_board(backend.as_ref(), &user_id).await;
        let store = CompletionStore::open(kv, &schedule, today);

        tracing::debug!(
            user_id = %user_id,
            sessions = schedule.len(),
            fingerprint = %schedule.fingerprint(),
            completed = store.state().indices.len(),
            "day plan opened"
        );

        Ok(Self {
            user_id,
            workflow: CompletionWorkflow::new(backend.clone()),
            backend,
            schedule,
            store,
            board,
            sync: SyncQueue::new(),
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn store(&self) -> &CompletionStore<K> {
        &self.store
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.store.is_completed(index)
    }

    /// Progress for rendering. The board's value wins; tasks that only exist
    /// on the schedule fall back to the checkmark-derived figure.
    pub fn progress(&self, task_id: &str) -> Option<u8> {
        if let Some(task) = self.board.get(task_id) {
            return Some(task.progress);
        }
        let first = *self.schedule.positions_of(task_id).first()?;
        reconcile(&self.schedule, self.store.state(), first, Toggle::Unchecked)?.progress
    }

    /// Tasks whose prompt was dismissed; they stay open at 100% until
    /// [`DayPlan::complete`] confirms them.
    pub fn awaiting_confirmation(&self) -> impl Iterator<Item = &str> {
        self.store.awaiting()
    }

    /// Flip session `index`, reconcile its task's progress, and open the
    /// completion workflow when this check finished the task.
    pub fn toggle(
        &mut self,
        index: usize,
        prompt: &mut dyn ActualTimePrompt,
    ) -> Result<ToggleReport> {
        let toggle = self.store.toggle(index)?;
        let reconciliation = reconcile(&self.schedule, self.store.state(), index, toggle);

        let mut completion = None;
        if let Some(rec) = &reconciliation {
            if let Some(percent) = rec.progress {
                self.board.set_progress(&rec.task_id, percent);
                let backend = self.backend.clone();
                let task_id = rec.task_id.clone();
                self.sync.spawn("update_progress", rec.task_id.clone(), async move {
                    backend.update_progress(&task_id, percent).await
                });
            }

            if !toggle.is_check() {
                self.store.set_awaiting(&rec.task_id, false);
            }

            if rec.completes_task {
                completion = Some(self.run_completion(&rec.task_id, prompt)?);
            }
        }

        Ok(ToggleReport {
            index,
            toggle,
            reconciliation,
            completion,
        })
    }

    /// Re-open the completion workflow for a task, e.g. after its prompt was
    /// dismissed.
    pub fn complete(
        &mut self,
        task_id: &str,
        prompt: &mut dyn ActualTimePrompt,
    ) -> Result<CompletionOutcome> {
        self.run_completion(task_id, prompt)
    }

    /// Run the scheduler again, bypassing the day's cache. Saved checkmarks
    /// survive only if the schedule is unchanged.
    pub async fn refresh(&mut self, today: NaiveDate) -> Result<()> {
        self.schedule = fetch_schedule(self.backend.as_ref(), &self.user_id, today).await?;
        store_cached(self.store.kv_mut(), &self.schedule);
        self.board = fetch_board(self.backend.as_ref(), &self.user_id).await;
        self.store.load(&self.schedule, today);
        Ok(())
    }

    /// Manual regeneration: forget today's checkmarks, then fetch.
    pub async fn regenerate(&mut self, today: NaiveDate) -> Result<()> {
        self.store.reset();
        self.refresh(today).await
    }

    /// Wait for queued remote writes.
    pub async fn settle(&mut self) {
        self.sync.settle().await;
    }

    fn run_completion(
        &mut self,
        task_id: &str,
        prompt: &mut dyn ActualTimePrompt,
    ) -> Result<CompletionOutcome> {
        let task = match self.board.get(task_id) {
            Some(t) => t.clone(),
            None => self.task_from_schedule(task_id)?,
        };

        let outcome = self
            .workflow
            .trigger(&task, prompt, &mut self.board, &mut self.sync);

        match &outcome {
            CompletionOutcome::Confirmed { .. } => self.store.set_awaiting(task_id, false),
            CompletionOutcome::Dismissed { .. } => self.store.set_awaiting(task_id, true),
        }
        Ok(outcome)
    }

    /// Stand-in when the task list couldn't be fetched: title from the first
    /// session, estimate from today's scheduled minutes.
    fn task_from_schedule(&self, task_id: &str) -> Result<Task> {
        let positions = self.schedule.positions_of(task_id);
        let Some(first) = positions.first().and_then(|p| self.schedule.get(*p)) else {
            bail!("unknown task {task_id}: not on the board or today's schedule");
        };
        let minutes: i32 = positions
            .iter()
            .filter_map(|p| self.schedule.get(*p))
            .map(|s| s.duration)
            .sum();
        tracing::debug!(task_id, "task not on board; using schedule details");
        Ok(Task::new(task_id, first.title.clone()).with_duration(minutes))
    }
}

async fn fetch_schedule(
    backend: &dyn PlannerBackend,
    user_id: &str,
    today: NaiveDate,
) -> Result<Schedule> {
    let sessions = backend
        .fetch_schedule(user_id)
        .await
        .with_context(|| format!("fetch schedule for user {user_id}"))?;
    Ok(Schedule::new(today, sessions))
}

async fn fetch_board(backend: &dyn PlannerBackend, user_id: &str) -> TaskBoard {
    match backend.fetch_tasks(user_id).await {
        Ok(tasks) => TaskBoard::new(tasks),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "failed to fetch tasks; board is empty");
            TaskBoard::default()
        }
    }
}
