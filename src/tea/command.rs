//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function. Each one is a mutation
//! intent that has already passed local validation; the runtime forwards it
//! to the task service and feeds the service's answer back as a `Message`.

use crate::core::task::TaskId;

/// Output commands from the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Persist "`task` depends on `depends_on`".
    SubmitDependency { task: TaskId, depends_on: TaskId },
    /// Delete the persisted dependency between the two tasks.
    DeleteDependency { task: TaskId, depends_on: TaskId },
}
