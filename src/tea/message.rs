//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function: task-service acknowledgments,
//! user requests and pointer events from the canvas.

use crate::core::records::{DependencyRecord, DependencyRejection, TaskRecord};
use crate::core::task::TaskId;
use crate::layout::Point;

/// Input messages to the update function.
#[derive(Debug, Clone)]
pub enum Message {
    // Task service acknowledgments
    /// A full task listing; replaces the graph.
    TasksLoaded(Vec<TaskRecord>),
    TaskCreated(TaskRecord),
    TaskUpdated(TaskRecord),
    TaskDeleted(TaskId),

    // Dependency requests and their outcomes
    /// The user asks for `dependent` to depend on `prerequisite`.
    RequestDependency {
        dependent: TaskId,
        prerequisite: TaskId,
    },
    DependencyConfirmed(DependencyRecord),
    DependencyRejected {
        dependent: TaskId,
        prerequisite: TaskId,
        rejection: DependencyRejection,
    },
    /// The user asks to drop a dependency.
    RequestRemoveDependency {
        dependent: TaskId,
        prerequisite: TaskId,
    },
    /// A dependency no longer exists on the service.
    DependencyRemoved {
        dependent: TaskId,
        prerequisite: TaskId,
    },
    /// The service refused to delete a dependency we already dropped locally.
    DependencyRemoveRejected {
        dependent: TaskId,
        prerequisite: TaskId,
        rejection: DependencyRejection,
    },

    // Canvas interaction
    PointerMoved(Point),
    PointerPressed(Point),
    PointerReleased,
    /// Return a node to its computed position.
    ResetPosition(TaskId),
}
