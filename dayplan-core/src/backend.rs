//! Remote planner backend port.
//!
//! The day's session list comes from an external scheduler; progress and
//! completion are replicated back best-effort. What the backend does on
//! completion (points, history, model retraining) is its own business.

use anyhow::Result;
use async_trait::async_trait;

use crate::session::SessionDescriptor;
use crate::task::Task;

#[async_trait]
pub trait PlannerBackend: Send + Sync {
    /// Today's ordered sessions for `user_id`. May be empty.
    async fn fetch_schedule(&self, user_id: &str) -> Result<Vec<SessionDescriptor>>;

    /// Tasks still open for `user_id`.
    async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>>;

    async fn fetch_task(&self, task_id: &str) -> Result<Task>;

    async fn update_progress(&self, task_id: &str, percent: u8) -> Result<()>;

    async fn mark_completed(&self, task_id: &str, actual_minutes: i32) -> Result<()>;
}
