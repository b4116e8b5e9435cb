//! Records exchanged with the task-management service.
//!
//! These mirror the service's JSON payloads. The engine reads them to
//! populate a [`GraphModel`](crate::core::dag::GraphModel) and writes them
//! back out for export; it never performs the transport itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::task::{Task, TaskId, TaskStatus};
use crate::{tdlog_debug, Result};

/// A task as listed by the service, including both dependency directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tasks this task depends on.
    #[serde(default)]
    pub depends_on: Vec<TaskId>,
    /// Tasks that depend on this task. Informational only: the graph derives
    /// this list from `depends_on` across all records.
    #[serde(default)]
    pub dependents: Vec<TaskId>,
}

impl TaskRecord {
    /// The node attributes carried by this record.
    pub fn task(&self) -> Task {
        Task {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_task(task: &Task, depends_on: Vec<TaskId>, dependents: Vec<TaskId>) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
            depends_on,
            dependents,
        }
    }
}

/// A persisted dependency, returned when the service accepts a new edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub id: u64,
    /// The dependent task.
    pub task: TaskId,
    /// The prerequisite task.
    pub depends_on: TaskId,
    pub created_at: DateTime<Utc>,
}

/// Body of a rejected dependency request.
///
/// `path` is present when the service itself detected a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRejection {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<TaskId>,
}

impl DependencyRejection {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            path: Vec::new(),
        }
    }
}

impl std::fmt::Display for DependencyRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.error)
        } else {
            let path = self
                .path
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            write!(f, "{} ({})", self.error, path)
        }
    }
}

/// A task listing is either a bare array or a paginated page of results.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Plain(Vec<TaskRecord>),
    Paged { results: Vec<TaskRecord> },
}

/// Parse a task listing from JSON.
pub fn parse_snapshot(json: &str) -> Result<Vec<TaskRecord>> {
    let records = match serde_json::from_str::<Listing>(json)? {
        Listing::Plain(records) => records,
        Listing::Paged { results } => results,
    };
    tdlog_debug!("parse_snapshot: {} records", records.len());
    Ok(records)
}

/// Read and parse a task listing from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<Vec<TaskRecord>> {
    tdlog_debug!("load_snapshot path={}", path.display());
    parse_snapshot(&fs::read_to_string(path)?)
}
