//! Task dependency graph.
//!
//! [`GraphModel`] owns the tasks and the "must-finish-before" edges between
//! them and refuses any mutation that would break the graph's invariants:
//! no self-edges, no duplicate edges, no dangling edges and, above all, no
//! cycles. Edges point from prerequisite to dependent, so a task's
//! `depends_on` set is its incoming neighbors and its `dependents` set is its
//! outgoing neighbors; both are read off the same edge and can never drift
//! apart.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use crate::core::cycle;
use crate::core::records::{DependencyRecord, TaskRecord};
use crate::core::task::{Task, TaskId};
use crate::core::traverse;
use crate::{tdlog_debug, tdlog_warn, Error, Result};

/// Confirmation state of a dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeState {
    /// Validated locally and submitted, not yet acknowledged by the service.
    Pending,
    /// Known to the service. Edges loaded from a task listing carry no
    /// record metadata.
    Confirmed {
        record_id: Option<u64>,
        created_at: Option<DateTime<Utc>>,
    },
}

impl EdgeState {
    fn unrecorded() -> Self {
        EdgeState::Confirmed {
            record_id: None,
            created_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, EdgeState::Pending)
    }
}

/// Read access to the `depends_on` relation.
///
/// Implemented by both the live model and its snapshots so reachability
/// checks run against either.
pub trait DependencyView {
    fn contains(&self, id: TaskId) -> bool;

    /// Direct prerequisites of `id`, empty for unknown ids.
    fn prerequisites(&self, id: TaskId) -> Vec<TaskId>;
}

/// The task graph.
pub struct GraphModel {
    graph: StableDiGraph<Task, EdgeState>,
    /// Insertion-ordered index; its order is the stable node ordering.
    index: IndexMap<TaskId, NodeIndex>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: IndexMap::new(),
        }
    }

    /// Build a graph from a task listing.
    ///
    /// Nodes are inserted first, then every record's `depends_on` entries in
    /// listing order. Entries that would violate an invariant are skipped and
    /// returned; the rest of the listing still loads.
    pub fn from_records(records: &[TaskRecord]) -> (Self, Vec<Error>) {
        let mut model = Self::new();
        let mut skipped = Vec::new();

        for record in records {
            if let Err(e) = model.upsert_node(record.task()) {
                tdlog_warn!("from_records: skipping task {}: {}", record.id, e);
                skipped.push(e);
            }
        }

        for record in records {
            if !model.contains(record.id) {
                continue;
            }
            for &prerequisite in &record.depends_on {
                if let Err(e) = model.add_edge(record.id, prerequisite) {
                    tdlog_warn!(
                        "from_records: skipping dependency {} -> {}: {}",
                        record.id,
                        prerequisite,
                        e
                    );
                    skipped.push(e);
                }
            }
        }

        for record in records {
            if !record.dependents.is_empty() && model.contains(record.id) {
                let mut listed = record.dependents.clone();
                listed.sort();
                listed.dedup();
                if listed != model.dependents(record.id) {
                    tdlog_debug!(
                        "from_records: task {} lists dependents {:?}, derived {:?}",
                        record.id,
                        listed,
                        model.dependents(record.id)
                    );
                }
            }
        }

        tdlog_debug!(
            "from_records: {} tasks, {} dependencies, {} skipped",
            model.task_count(),
            model.dependency_count(),
            skipped.len()
        );
        (model, skipped)
    }

    /// Export every task with both dependency directions, in node order.
    pub fn to_records(&self) -> Vec<TaskRecord> {
        self.tasks()
            .map(|task| TaskRecord::from_task(task, self.depends_on(task.id), self.dependents(task.id)))
            .collect()
    }

    // ========== Nodes ==========

    /// Insert a task or replace an existing task's attributes.
    ///
    /// Edges touching the task are left as they are.
    pub fn upsert_node(&mut self, task: Task) -> Result<()> {
        task.validate()?;

        match self.index.get(&task.id) {
            Some(&ix) => {
                if let Some(weight) = self.graph.node_weight_mut(ix) {
                    *weight = task;
                }
            }
            None => {
                let id = task.id;
                let ix = self.graph.add_node(task);
                self.index.insert(id, ix);
            }
        }
        Ok(())
    }

    /// Remove a task and every edge touching it.
    ///
    /// Returns the removed task, or `None` if it was not present.
    pub fn remove_node(&mut self, id: TaskId) -> Option<Task> {
        let ix = self.index.shift_remove(&id)?;
        let removed = self.graph.remove_node(ix);
        tdlog_debug!("remove_node {}: {} dependencies remain", id, self.graph.edge_count());
        removed
    }

    pub fn node(&self, id: TaskId) -> Option<&Task> {
        self.index.get(&id).and_then(|&ix| self.graph.node_weight(ix))
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Task ids in stable (insertion) order.
    pub fn node_ids(&self) -> Vec<TaskId> {
        self.index.keys().copied().collect()
    }

    /// Tasks in stable (insertion) order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.index
            .values()
            .filter_map(move |&ix| self.graph.node_weight(ix))
    }

    pub fn task_count(&self) -> usize {
        self.index.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // ========== Edges ==========

    /// Check whether `dependent` may start depending on `prerequisite`.
    ///
    /// This is the full rejection ladder used by every insertion, exposed so
    /// a caller can report the outcome before submitting anything.
    pub fn validate_edge(&self, dependent: TaskId, prerequisite: TaskId) -> Result<()> {
        if dependent == prerequisite {
            return Err(Error::SelfReference(dependent));
        }
        for id in [dependent, prerequisite] {
            if !self.contains(id) {
                return Err(Error::UnknownNode(id));
            }
        }
        if self.has_edge(dependent, prerequisite) {
            return Err(Error::DuplicateEdge {
                dependent,
                prerequisite,
            });
        }
        if let Some(path) = cycle::cycle_path(self, dependent, prerequisite) {
            return Err(Error::Cycle {
                dependent,
                prerequisite,
                path,
            });
        }
        Ok(())
    }

    /// Record that `dependent` depends on `prerequisite`.
    pub fn add_edge(&mut self, dependent: TaskId, prerequisite: TaskId) -> Result<()> {
        self.insert_edge(dependent, prerequisite, EdgeState::unrecorded())
    }

    /// Insert an edge awaiting acknowledgment from the service.
    ///
    /// Pending edges take part in validation exactly like confirmed ones, so
    /// two requests in flight can never close a cycle between them.
    pub fn add_pending_edge(&mut self, dependent: TaskId, prerequisite: TaskId) -> Result<()> {
        self.insert_edge(dependent, prerequisite, EdgeState::Pending)
    }

    fn insert_edge(&mut self, dependent: TaskId, prerequisite: TaskId, state: EdgeState) -> Result<()> {
        self.validate_edge(dependent, prerequisite)?;

        let (Some(&dep_ix), Some(&pre_ix)) =
            (self.index.get(&dependent), self.index.get(&prerequisite))
        else {
            return Err(Error::UnknownNode(dependent));
        };
        self.graph.add_edge(pre_ix, dep_ix, state);
        tdlog_debug!("add_edge {} -> {}", dependent, prerequisite);
        Ok(())
    }

    /// Remove an edge if present. Returns whether anything was removed.
    pub fn remove_edge(&mut self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.take_edge(dependent, prerequisite).is_some()
    }

    /// Remove an edge and hand back its state, so it can be put back later
    /// with [`GraphModel::restore_edge`].
    pub fn take_edge(&mut self, dependent: TaskId, prerequisite: TaskId) -> Option<EdgeState> {
        let edge = self.edge_index(dependent, prerequisite)?;
        let state = self.graph.remove_edge(edge)?;
        tdlog_debug!("remove_edge {} -> {}", dependent, prerequisite);
        Some(state)
    }

    /// Re-insert a previously taken edge with its old state. Validated like
    /// any new edge.
    pub fn restore_edge(
        &mut self,
        dependent: TaskId,
        prerequisite: TaskId,
        state: EdgeState,
    ) -> Result<()> {
        self.insert_edge(dependent, prerequisite, state)
    }

    /// Mark an edge as acknowledged by the service.
    ///
    /// Returns false if the edge does not exist.
    pub fn confirm_edge(&mut self, record: &DependencyRecord) -> bool {
        let Some(edge) = self.edge_index(record.task, record.depends_on) else {
            return false;
        };
        if let Some(state) = self.graph.edge_weight_mut(edge) {
            *state = EdgeState::Confirmed {
                record_id: Some(record.id),
                created_at: Some(record.created_at),
            };
        }
        true
    }

    pub fn edge_state(&self, dependent: TaskId, prerequisite: TaskId) -> Option<&EdgeState> {
        let edge = self.edge_index(dependent, prerequisite)?;
        self.graph.edge_weight(edge)
    }

    pub fn is_edge_pending(&self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.edge_state(dependent, prerequisite)
            .is_some_and(EdgeState::is_pending)
    }

    pub fn has_edge(&self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.edge_index(dependent, prerequisite).is_some()
    }

    fn edge_index(
        &self,
        dependent: TaskId,
        prerequisite: TaskId,
    ) -> Option<petgraph::stable_graph::EdgeIndex> {
        let dep_ix = self.index.get(&dependent)?;
        let pre_ix = self.index.get(&prerequisite)?;
        self.graph.find_edge(*pre_ix, *dep_ix)
    }

    /// All edges as `(dependent, prerequisite)` pairs, sorted.
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        let mut edges: Vec<(TaskId, TaskId)> = self
            .graph
            .edge_indices()
            .filter_map(|edge| {
                let (pre_ix, dep_ix) = self.graph.edge_endpoints(edge)?;
                Some((self.graph[dep_ix].id, self.graph[pre_ix].id))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Direct prerequisites of `id`, sorted.
    pub fn depends_on(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// Direct dependents of `id`, sorted.
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    fn neighbor_ids(&self, id: TaskId, direction: Direction) -> Vec<TaskId> {
        let Some(&ix) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut ids: Vec<TaskId> = self
            .graph
            .neighbors_directed(ix, direction)
            .filter_map(|n| self.graph.node_weight(n).map(|t| t.id))
            .collect();
        ids.sort();
        ids
    }

    /// Every task `id` transitively depends on.
    pub fn all_prerequisites(&self, id: TaskId) -> Vec<TaskId> {
        traverse::collect_reachable(id, |n| self.depends_on(n))
    }

    /// Every task that transitively depends on `id`.
    pub fn all_dependents(&self, id: TaskId) -> Vec<TaskId> {
        traverse::collect_reachable(id, |n| self.dependents(n))
    }

    /// Tasks ordered so every prerequisite precedes its dependents.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            let id = self
                .graph
                .node_weight(cycle.node_id())
                .map(|t| t.id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Error::Validation(format!("Cycle detected at task: {}", id))
        })?;

        Ok(sorted
            .into_iter()
            .filter_map(|ix| self.graph.node_weight(ix).map(|t| t.id))
            .collect())
    }

    /// Take an immutable copy of the current nodes and edges.
    pub fn snapshot(&self) -> GraphSnapshot {
        let tasks: IndexMap<TaskId, Task> = self.tasks().map(|t| (t.id, t.clone())).collect();
        let mut depends_on: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut dependents: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        let mut pending = HashSet::new();

        for edge in self.graph.edge_indices() {
            let Some((pre_ix, dep_ix)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let (dependent, prerequisite) = (self.graph[dep_ix].id, self.graph[pre_ix].id);
            depends_on.entry(dependent).or_default().push(prerequisite);
            dependents.entry(prerequisite).or_default().push(dependent);
            if self.graph.edge_weight(edge).is_some_and(EdgeState::is_pending) {
                pending.insert((dependent, prerequisite));
            }
        }
        for ids in depends_on.values_mut().chain(dependents.values_mut()) {
            ids.sort();
        }

        GraphSnapshot {
            tasks,
            depends_on,
            dependents,
            pending,
        }
    }
}

impl DependencyView for GraphModel {
    fn contains(&self, id: TaskId) -> bool {
        GraphModel::contains(self, id)
    }

    fn prerequisites(&self, id: TaskId) -> Vec<TaskId> {
        self.depends_on(id)
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphModel")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}

/// An immutable copy of a [`GraphModel`] at one point in time.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    tasks: IndexMap<TaskId, Task>,
    depends_on: HashMap<TaskId, Vec<TaskId>>,
    dependents: HashMap<TaskId, Vec<TaskId>>,
    pending: HashSet<(TaskId, TaskId)>,
}

impl GraphSnapshot {
    pub fn node(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Task ids in the model's stable order.
    pub fn node_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values()
    }

    pub fn depends_on(&self, id: TaskId) -> &[TaskId] {
        self.depends_on.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, id: TaskId) -> &[TaskId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_edge(&self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.depends_on(dependent).contains(&prerequisite)
    }

    pub fn is_pending(&self, dependent: TaskId, prerequisite: TaskId) -> bool {
        self.pending.contains(&(dependent, prerequisite))
    }

    /// All edges as `(dependent, prerequisite)` pairs, sorted.
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        let mut edges: Vec<(TaskId, TaskId)> = self
            .depends_on
            .iter()
            .flat_map(|(&dep, pres)| pres.iter().map(move |&pre| (dep, pre)))
            .collect();
        edges.sort();
        edges
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl DependencyView for GraphSnapshot {
    fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    fn prerequisites(&self, id: TaskId) -> Vec<TaskId> {
        self.depends_on(id).to_vec()
    }
}
