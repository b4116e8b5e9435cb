use thiserror::Error;

use crate::core::task::TaskId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task {0} cannot depend on itself")]
    SelfReference(TaskId),

    #[error("Task {0} not found in graph")]
    UnknownNode(TaskId),

    #[error("Task {dependent} already depends on {prerequisite}")]
    DuplicateEdge {
        dependent: TaskId,
        prerequisite: TaskId,
    },

    #[error("Circular dependency detected: {}", format_path(.path))]
    Cycle {
        dependent: TaskId,
        prerequisite: TaskId,
        /// The cycle the edge would close, starting and ending at `dependent`.
        path: Vec<TaskId>,
    },
}

impl Error {
    /// True for the rejections a user can cause by requesting a dependency.
    pub fn is_edge_rejection(&self) -> bool {
        matches!(
            self,
            Error::SelfReference(_)
                | Error::UnknownNode(_)
                | Error::DuplicateEdge { .. }
                | Error::Cycle { .. }
        )
    }
}

fn format_path(path: &[TaskId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, Error>;
