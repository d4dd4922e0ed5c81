//! dayplan-core: schedule reconciliation and session progress for a daily plan.
//!
//! Pipeline: the external scheduler's sessions are fingerprinted into a
//! [`Schedule`] (cached for the rest of the day), prior checkmarks are loaded from the [`CompletionStore`] only
//! if still valid for that fingerprint and day, toggles are reconciled into
//! task progress, and a finished task is handed to the
//! [`CompletionWorkflow`]. The [`projector`] runs independently of all that.

pub mod backend;
pub mod board;
pub mod cache;
pub mod completion;
pub mod dayplan;
pub mod fingerprint;
pub mod kv;
pub mod projector;
pub mod reconcile;
pub mod schedule;
pub mod session;
pub mod sync;
pub mod task;
pub mod time;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use backend::PlannerBackend;
pub use board::TaskBoard;
pub use completion::{CompletionState, CompletionStore, Toggle};
pub use dayplan::{DayPlan, ToggleReport};
pub use fingerprint::fingerprint;
pub use kv::{FileKv, KvStore, MemoryKv};
pub use projector::{project, PlannedSession};
pub use reconcile::{reconcile, Reconciliation};
pub use schedule::Schedule;
pub use session::{SessionDescriptor, SessionIdentity, SessionInfo, WireId};
pub use sync::SyncQueue;
pub use task::{resolve_estimate, Complexity, Priority, Task, TaskStatus};
pub use workflow::{ActualTimePrompt, CompletionOutcome, CompletionWorkflow};
