//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building task records and graphs
//! - An in-memory task service that re-validates every dependency it is
//!   asked to persist, standing in for the real backend

use chrono::Utc;

use taskdag::core::records::{DependencyRecord, DependencyRejection, TaskRecord};
use taskdag::tea::{update, Command, Message, Model};
use taskdag::{Error, GraphModel, Task, TaskId};

/// A task record with the given prerequisites.
pub fn record(id: u64, depends_on: &[u64]) -> TaskRecord {
    TaskRecord::from_task(
        &Task::new(id, &format!("task-{}", id), ""),
        depends_on.iter().copied().map(TaskId).collect(),
        Vec::new(),
    )
}

/// Nodes {1, 2, 3} where 3 depends on 2 depends on 1.
pub fn chain_records() -> Vec<TaskRecord> {
    vec![record(1, &[]), record(2, &[1]), record(3, &[2])]
}

/// A graph with the given nodes and `(dependent, prerequisite)` edges.
pub fn graph_with(ids: &[u64], edges: &[(u64, u64)]) -> GraphModel {
    let mut graph = GraphModel::new();
    for &id in ids {
        graph
            .upsert_node(Task::new(id, &format!("task-{}", id), ""))
            .expect("valid task");
    }
    for &(dependent, prerequisite) in edges {
        graph
            .add_edge(TaskId(dependent), TaskId(prerequisite))
            .expect("valid edge");
    }
    graph
}

/// In-memory task service.
///
/// Holds the authoritative graph and answers commands the way the real
/// backend does: every dependency is re-checked before it is stored.
pub struct FakeTaskService {
    pub graph: GraphModel,
    next_record_id: u64,
    /// When set, the next command fails with this message.
    pub fail_next: Option<String>,
    /// Every command received, in order.
    pub received: Vec<Command>,
}

impl FakeTaskService {
    pub fn new(records: &[TaskRecord]) -> Self {
        let (graph, skipped) = GraphModel::from_records(records);
        assert!(skipped.is_empty(), "fixture listing must be valid");
        Self {
            graph,
            next_record_id: 1,
            fail_next: None,
            received: Vec::new(),
        }
    }

    pub fn listing(&self) -> Vec<TaskRecord> {
        self.graph.to_records()
    }

    /// Another editor adds a dependency directly on the service.
    pub fn remote_add_dependency(&mut self, dependent: u64, prerequisite: u64) {
        self.graph
            .add_edge(TaskId(dependent), TaskId(prerequisite))
            .expect("remote edge must be valid on the service");
    }

    pub fn handle(&mut self, cmd: &Command) -> Message {
        self.received.push(cmd.clone());

        match *cmd {
            Command::SubmitDependency { task, depends_on } => {
                let rejection = match self.fail_next.take() {
                    Some(reason) => Err(DependencyRejection::new(reason)),
                    None => self.graph.add_edge(task, depends_on).map_err(rejection_for),
                };
                match rejection {
                    Ok(()) => {
                        let record = DependencyRecord {
                            id: self.next_record_id,
                            task,
                            depends_on,
                            created_at: Utc::now(),
                        };
                        self.next_record_id += 1;
                        self.graph.confirm_edge(&record);
                        Message::DependencyConfirmed(record)
                    }
                    Err(rejection) => Message::DependencyRejected {
                        dependent: task,
                        prerequisite: depends_on,
                        rejection,
                    },
                }
            }
            Command::DeleteDependency { task, depends_on } => match self.fail_next.take() {
                Some(reason) => Message::DependencyRemoveRejected {
                    dependent: task,
                    prerequisite: depends_on,
                    rejection: DependencyRejection::new(reason),
                },
                None => {
                    self.graph.remove_edge(task, depends_on);
                    Message::DependencyRemoved {
                        dependent: task,
                        prerequisite: depends_on,
                    }
                }
            },
        }
    }
}

fn rejection_for(error: Error) -> DependencyRejection {
    match error {
        Error::Cycle { path, .. } => DependencyRejection {
            error: "Circular dependency detected".to_string(),
            path,
        },
        other => DependencyRejection::new(other.to_string()),
    }
}

/// Apply `msg`, then route every resulting command through `service` and
/// feed the answers back until nothing is left in flight.
pub fn dispatch(model: &mut Model, service: &mut FakeTaskService, msg: Message) {
    let mut queue = vec![msg];
    while let Some(msg) = queue.pop() {
        for cmd in update(model, msg) {
            queue.push(service.handle(&cmd));
        }
    }
}

/// A model loaded from `records`.
pub fn loaded_model(records: Vec<TaskRecord>) -> Model {
    let mut model = Model::default();
    update(&mut model, Message::TasksLoaded(records));
    model
}
