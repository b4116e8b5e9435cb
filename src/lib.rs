//! Task dependency graph engine.
//!
//! Keeps a network of tasks joined by "must finish before" edges, refuses
//! any change that would make it circular, and provides the geometry a
//! renderer needs to draw and interact with it.
//!
//! - [`core`]: tasks, the dependency graph and its cycle guard
//! - [`layout`]: default circular placement, user overrides, hit-testing
//! - [`tea`]: the controller that owns a graph and folds in service
//!   acknowledgments and pointer events
//! - [`render`]: the owned view handed to a renderer

pub mod config;
pub mod core;
pub mod error;
pub mod layout;
pub mod log;
pub mod render;
pub mod tea;

pub use crate::core::{GraphModel, GraphSnapshot, Task, TaskId, TaskRecord, TaskStatus};
pub use error::{Error, Result};
pub use layout::{LayoutEngine, Point, Positions};
