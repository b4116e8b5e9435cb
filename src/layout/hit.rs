//! Pointer hit-testing against node positions.

use crate::core::task::TaskId;
use crate::layout::{Point, Positions};

/// Resolve `pointer` to the nearest node strictly closer than `radius`.
///
/// Equidistant candidates resolve to the one that comes first in
/// `positions`. Positions with a non-finite distance never match.
pub fn resolve(pointer: Point, positions: &Positions, radius: f64) -> Option<TaskId> {
    let mut best: Option<(TaskId, f64)> = None;

    for (&id, &position) in positions {
        let distance = pointer.distance(position);
        if !distance.is_finite() || distance >= radius {
            continue;
        }
        match best {
            Some((_, nearest)) if distance >= nearest => {}
            _ => best = Some((id, distance)),
        }
    }

    best.map(|(id, _)| id)
}

/// Hit-testing with a fixed detection radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTester {
    radius: f64,
}

impl HitTester {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn resolve(&self, pointer: Point, positions: &Positions) -> Option<TaskId> {
        resolve(pointer, positions, self.radius)
    }
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HIT_RADIUS)
    }
}
