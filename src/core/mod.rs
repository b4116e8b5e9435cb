//! Core graph model for task dependencies.
//!
//! This module contains the task data model, the dependency graph with its
//! invariants, the cycle guard, and the traversal utility they share.

pub mod cycle;
pub mod dag;
pub mod records;
pub mod task;
pub mod traverse;

pub use cycle::{cycle_path, would_create_cycle};
pub use dag::{DependencyView, EdgeState, GraphModel, GraphSnapshot};
pub use records::{DependencyRecord, DependencyRejection, TaskRecord};
pub use task::{Task, TaskId, TaskStatus};
