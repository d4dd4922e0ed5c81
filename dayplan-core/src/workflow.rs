//! Completion workflow: ask how long the task really took, then hand the
//! task to the backend as completed.

use std::sync::Arc;

use crate::backend::PlannerBackend;
use crate::board::TaskBoard;
use crate::sync::SyncQueue;
use crate::task::Task;

/// Fallback for the prompt's default when a task has no usable estimate.
pub const FALLBACK_ACTUAL_MINUTES: i32 = 30;

/// Interactive question "how many minutes did this take?".
///
/// `None` means the user dismissed the prompt.
pub trait ActualTimePrompt {
    fn actual_minutes(&mut self, task: &Task, default_minutes: i32) -> Option<i32>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Confirmed { task_id: String, actual_minutes: i32 },
    Dismissed { task_id: String },
}

#[derive(Clone)]
pub struct CompletionWorkflow {
    backend: Arc<dyn PlannerBackend>,
}

impl CompletionWorkflow {
    pub fn new(backend: Arc<dyn PlannerBackend>) -> Self {
        Self { backend }
    }

    /// Run the workflow for `task`.
    ///
    /// On confirm the task leaves the board immediately and the remote
    /// completion call is queued. On dismiss nothing changes.
    pub fn trigger(
        &self,
        task: &Task,
        prompt: &mut dyn ActualTimePrompt,
        board: &mut TaskBoard,
        sync: &mut SyncQueue,
    ) -> CompletionOutcome {
        let default_minutes = if task.estimated_duration > 0 {
            task.estimated_duration
        } else {
            FALLBACK_ACTUAL_MINUTES
        };

        let Some(answer) = prompt.actual_minutes(task, default_minutes) else {
            tracing::info!(task_id = %task.id, "completion prompt dismissed");
            return CompletionOutcome::Dismissed {
                task_id: task.id.clone(),
            };
        };
        let actual_minutes = if answer > 0 { answer } else { default_minutes };

        board.remove(&task.id);

        let backend = self.backend.clone();
        let task_id = task.id.clone();
        sync.spawn("mark_completed", task.id.clone(), async move {
            backend.mark_completed(&task_id, actual_minutes).await
        });

        tracing::info!(task_id = %task.id, actual_minutes, "task handed to completion");
        CompletionOutcome::Confirmed {
            task_id: task.id.clone(),
            actual_minutes,
        }
    }
}
