//! Fire-and-forget replication of local changes to the backend.
//!
//! Local state is the source of truth. Each remote call runs as a detached
//! task; failures are logged inside the task and never reach the caller.

use std::future::Future;

use tokio::task::JoinSet;

#[derive(Debug, Default)]
pub struct SyncQueue {
    in_flight: JoinSet<()>,
}

impl SyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `call` on the current tokio runtime. `what` names the call in logs.
    pub fn spawn<F>(&mut self, what: &'static str, task_id: String, call: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.in_flight.spawn(async move {
            match call.await {
                Ok(()) => tracing::debug!(call = what, task_id = %task_id, "remote sync ok"),
                Err(e) => tracing::warn!(
                    call = what,
                    task_id = %task_id,
                    error = %e,
                    "remote sync failed; keeping local state"
                ),
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for every outstanding call. Used before process exit.
    pub async fn settle(&mut self) {
        while let Some(res) = self.in_flight.join_next().await {
            if let Err(e) = res {
                tracing::warn!(error = %e, "remote sync task aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn failures_are_absorbed_and_settle_drains() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut q = SyncQueue::new();

        let h = hits.clone();
        q.spawn("update_progress", "t1".into(), async move {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let h = hits.clone();
        q.spawn("mark_completed", "t2".into(), async move {
            h.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("503 from backend")
        });

        q.settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(q.pending(), 0);
    }
}
