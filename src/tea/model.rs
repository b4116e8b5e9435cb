//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure editor state: the graph, its layout and what the user
//! is pointing at. It holds no channels or transport handles.

use serde::Serialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::core::dag::{EdgeState, GraphModel};
use crate::core::task::TaskId;
use crate::layout::{HitTester, LayoutEngine, Point, Positions};
use crate::render::{next_version, EdgeView, NodeView, RenderState};
use crate::tdlog_debug;

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Error,
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// A node being dragged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub id: TaskId,
    /// Pointer position minus node position at press time, so the node does
    /// not jump to center on the pointer.
    pub grab_offset: Point,
}

/// Editor state - the single owner of the graph.
pub struct Model {
    pub graph: GraphModel,
    pub layout: LayoutEngine,
    /// Positions from the last layout pass, plus any drag updates since.
    pub positions: Positions,
    pub hit: HitTester,

    // Interaction state
    pub hovered: Option<TaskId>,
    pub selected: Option<TaskId>,
    pub drag: Option<Drag>,
    pub notification: Option<Notification>,

    /// Edges removed locally whose deletion the service has not answered,
    /// keyed by `(dependent, prerequisite)`.
    pub removing: HashMap<(TaskId, TaskId), EdgeState>,

    /// Set when state changes and a render is needed.
    pub dirty: bool,
}

impl Model {
    pub fn new(config: &Config) -> Self {
        Self {
            graph: GraphModel::new(),
            layout: LayoutEngine::from_config(&config.layout),
            positions: Positions::new(),
            hit: HitTester::new(config.hit.radius),
            hovered: None,
            selected: None,
            drag: None,
            notification: None,
            removing: HashMap::new(),
            dirty: true,
        }
    }

    /// Model over an existing graph with its layout computed.
    pub fn with_graph(graph: GraphModel, config: &Config) -> Self {
        let mut model = Self::new(config);
        model.graph = graph;
        model.relayout();
        model
    }

    /// Recompute positions after the node set changed.
    ///
    /// Also forgets interaction state that points at removed nodes.
    pub fn relayout(&mut self) {
        let ids = self.graph.node_ids();
        self.positions = self.layout.recompute(&ids);

        if self.hovered.is_some_and(|id| !self.graph.contains(id)) {
            self.hovered = None;
        }
        if self.selected.is_some_and(|id| !self.graph.contains(id)) {
            self.selected = None;
        }
        if self.drag.is_some_and(|d| !self.graph.contains(d.id)) {
            self.drag = None;
        }
        tdlog_debug!("Model::relayout nodes={}", ids.len());
        self.dirty = true;
    }

    pub fn position(&self, id: TaskId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    /// Node under `pointer`, if any.
    pub fn node_at(&self, pointer: Point) -> Option<TaskId> {
        self.hit.resolve(pointer, &self.positions)
    }

    /// Build an owned view for the renderer.
    ///
    /// Each state gets a fresh version so a renderer can skip states it has
    /// already drawn.
    pub fn render_state(&self) -> RenderState {
        let snapshot = self.graph.snapshot();

        let nodes = snapshot
            .tasks()
            .filter_map(|task| {
                let position = self.position(task.id)?;
                Some(NodeView {
                    id: task.id,
                    title: task.title.clone(),
                    status: task.status,
                    position,
                    pinned: self.layout.override_for(task.id).is_some(),
                    hovered: self.hovered == Some(task.id),
                    selected: self.selected == Some(task.id),
                })
            })
            .collect();

        let edges = snapshot
            .edges()
            .into_iter()
            .map(|(dependent, prerequisite)| EdgeView {
                dependent,
                prerequisite,
                pending: snapshot.is_pending(dependent, prerequisite),
            })
            .collect();

        RenderState {
            version: next_version(),
            nodes,
            edges,
            hovered: self.hovered,
            selected: self.selected,
            notification: self.notification.clone(),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
