//! In-memory doubles for the backend port and the completion prompt.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::PlannerBackend;
use crate::session::SessionDescriptor;
use crate::task::Task;
use crate::workflow::ActualTimePrompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Progress(String, u8),
    Completed(String, i32),
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    schedule: Mutex<Vec<SessionDescriptor>>,
    tasks: Vec<Task>,
    calls: Mutex<Vec<Call>>,
    schedule_fetches: AtomicUsize,
    fail_writes: bool,
    fail_task_fetch: bool,
    fail_schedule_fetch: bool,
}

impl FakeBackend {
    pub fn new(schedule: Vec<SessionDescriptor>, tasks: Vec<Task>) -> Self {
        Self {
            schedule: Mutex::new(schedule),
            tasks,
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_task_fetch(mut self) -> Self {
        self.fail_task_fetch = true;
        self
    }

    pub fn failing_schedule_fetch(mut self) -> Self {
        self.fail_schedule_fetch = true;
        self
    }

    pub fn set_schedule(&self, sessions: Vec<SessionDescriptor>) {
        *self.schedule.lock().unwrap() = sessions;
    }

    /// How many times the scheduler was asked for a plan.
    pub fn schedule_fetches(&self) -> usize {
        self.schedule_fetches.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes {
            bail!("backend unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl PlannerBackend for FakeBackend {
    async fn fetch_schedule(&self, _user_id: &str) -> Result<Vec<SessionDescriptor>> {
        self.schedule_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_schedule_fetch {
            bail!("scheduler timed out");
        }
        Ok(self.schedule.lock().unwrap().clone())
    }

    async fn fetch_tasks(&self, _user_id: &str) -> Result<Vec<Task>> {
        if self.fail_task_fetch {
            bail!("tasks endpoint down");
        }
        Ok(self.tasks.clone())
    }

    async fn fetch_task(&self, task_id: &str) -> Result<Task> {
        match self.tasks.iter().find(|t| t.id == task_id) {
            Some(t) => Ok(t.clone()),
            None => bail!("task {task_id} not found"),
        }
    }

    async fn update_progress(&self, task_id: &str, percent: u8) -> Result<()> {
        self.record(Call::Progress(task_id.to_string(), percent))
    }

    async fn mark_completed(&self, task_id: &str, actual_minutes: i32) -> Result<()> {
        self.record(Call::Completed(task_id.to_string(), actual_minutes))
    }
}

/// Replays canned answers; an exhausted script behaves like a dismissal.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<i32>>,
    defaults: Vec<i32>,
}

impl ScriptedPrompt {
    pub fn answers<const N: usize>(answers: [Option<i32>; N]) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            defaults: Vec::new(),
        }
    }

    pub fn asked(&self) -> usize {
        self.defaults.len()
    }

    /// Default minutes offered on each prompt, in order.
    pub fn defaults(&self) -> Vec<i32> {
        self.defaults.clone()
    }
}

impl ActualTimePrompt for ScriptedPrompt {
    fn actual_minutes(&mut self, _task: &Task, default_minutes: i32) -> Option<i32> {
        self.defaults.push(default_minutes);
        self.answers.pop_front().flatten()
    }
}
