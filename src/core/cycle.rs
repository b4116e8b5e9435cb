//! Cycle guard for candidate dependency edges.
//!
//! Adding `dependent -> prerequisite` closes a cycle exactly when
//! `dependent` is already reachable from `prerequisite` along `depends_on`
//! edges. Both checks read the graph as it is *before* the edge exists and
//! never mutate it.

use crate::core::dag::DependencyView;
use crate::core::task::TaskId;
use crate::core::traverse;

/// Would recording that `dependent` depends on `prerequisite` create a cycle?
///
/// A self-reference counts as a (trivial) cycle. An edge that already exists
/// is not reported here; duplicates are rejected by the graph itself.
pub fn would_create_cycle<G: DependencyView + ?Sized>(
    graph: &G,
    dependent: TaskId,
    prerequisite: TaskId,
) -> bool {
    if dependent == prerequisite {
        return true;
    }
    traverse::reachable(prerequisite, dependent, |id| graph.prerequisites(id))
}

/// The cycle the candidate edge would close, if any.
///
/// The path starts and ends at `dependent`:
/// `[dependent, prerequisite, ..., dependent]`.
pub fn cycle_path<G: DependencyView + ?Sized>(
    graph: &G,
    dependent: TaskId,
    prerequisite: TaskId,
) -> Option<Vec<TaskId>> {
    if dependent == prerequisite {
        return Some(vec![dependent, dependent]);
    }
    let existing = traverse::path_to(prerequisite, dependent, |id| graph.prerequisites(id))?;

    let mut path = Vec::with_capacity(existing.len() + 1);
    path.push(dependent);
    path.extend(existing);
    Some(path)
}
