//! Node placement.
//!
//! Nodes sit on a circle by default: the `k`-th of `n` nodes at angle
//! `k * 2π/n - π/2`, so the first node is at the top and the rest follow
//! clockwise on screen. A user can pin any node elsewhere with an override;
//! overrides are keyed by task id and only disappear when cleared or when
//! their node leaves the graph.
//!
//! The engine never recomputes on its own. The owner calls
//! [`LayoutEngine::recompute`] whenever the node set changes.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::LayoutConfig;
use crate::core::task::TaskId;
use crate::layout::Point;
use crate::tdlog_debug;

/// Positions in node order.
pub type Positions = IndexMap<TaskId, Point>;

/// Default position of the `index`-th of `count` nodes.
///
/// A `count` of zero is treated as one.
pub fn circle_position(index: usize, count: usize, center: Point, radius: f64) -> Point {
    let count = count.max(1);
    let angle = index as f64 * (TAU / count as f64) - FRAC_PI_2;
    Point::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// One position per id in `node_ids`, overrides taking precedence.
///
/// Ids are expected to be distinct; a repeated id keeps its last position.
pub fn compute_positions(
    node_ids: &[TaskId],
    overrides: &HashMap<TaskId, Point>,
    center: Point,
    radius: f64,
) -> Positions {
    node_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let position = overrides
                .get(id)
                .copied()
                .unwrap_or_else(|| circle_position(index, node_ids.len(), center, radius));
            (*id, position)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    center: Point,
    radius: f64,
    overrides: HashMap<TaskId, Point>,
}

impl LayoutEngine {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            center,
            radius,
            overrides: HashMap::new(),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.center(), config.radius)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Pin `id` at `position` until cleared or the node is removed.
    pub fn set_override(&mut self, id: TaskId, position: Point) {
        self.overrides.insert(id, position);
    }

    /// Return `id` to its computed position. Returns whether it was pinned.
    pub fn clear_override(&mut self, id: TaskId) -> bool {
        self.overrides.remove(&id).is_some()
    }

    pub fn override_for(&self, id: TaskId) -> Option<Point> {
        self.overrides.get(&id).copied()
    }

    pub fn overrides(&self) -> &HashMap<TaskId, Point> {
        &self.overrides
    }

    /// Drop overrides for ids not in `node_ids`.
    pub fn retain(&mut self, node_ids: &[TaskId]) {
        if self.overrides.is_empty() {
            return;
        }
        let live: HashSet<TaskId> = node_ids.iter().copied().collect();
        let before = self.overrides.len();
        self.overrides.retain(|id, _| live.contains(id));
        let dropped = before - self.overrides.len();
        if dropped > 0 {
            tdlog_debug!("LayoutEngine::retain dropped {} overrides", dropped);
        }
    }

    /// Positions for `node_ids` under the current overrides.
    pub fn compute_positions(&self, node_ids: &[TaskId]) -> Positions {
        compute_positions(node_ids, &self.overrides, self.center, self.radius)
    }

    /// Forget overrides of removed nodes, then compute positions.
    pub fn recompute(&mut self, node_ids: &[TaskId]) -> Positions {
        self.retain(node_ids);
        tdlog_debug!(
            "LayoutEngine::recompute nodes={} overrides={}",
            node_ids.len(),
            self.overrides.len()
        );
        self.compute_positions(node_ids)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}
