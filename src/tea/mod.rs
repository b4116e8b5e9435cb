//! The Elm Architecture (TEA) controller for the graph editor.
//!
//! This module keeps every piece of mutable editor state in one place:
//! - `Model`: the graph, its layout and the interaction state
//! - `Message`: service acknowledgments, user requests and pointer events
//! - `Command`: mutation intents for the task service to carry out
//! - `update`: the only function that changes a `Model`

pub mod command;
pub mod message;
pub mod model;
pub mod update;

pub use command::Command;
pub use message::Message;
pub use model::{Drag, Model, Notification, NotificationLevel};
pub use update::update;
