//! Iterative graph traversal shared by every reachability query.
//!
//! All functions take the neighbor relation as a closure so the same code
//! walks prerequisites (`depends_on`) or dependents depending on what the
//! caller passes in. Traversal uses an explicit stack and visited set, so
//! graph depth never touches the call stack and each node is expanded once.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Returns true if `target` can be reached from `start` by following
/// `neighbors`. A node always reaches itself.
pub fn reachable<N, I, F>(start: N, target: N, mut neighbors: F) -> bool
where
    N: Copy + Eq + Hash,
    I: IntoIterator<Item = N>,
    F: FnMut(N) -> I,
{
    if start == target {
        return true;
    }

    let mut visited = HashSet::from([start]);
    let mut frontier = vec![start];

    while let Some(node) = frontier.pop() {
        for next in neighbors(node) {
            if next == target {
                return true;
            }
            if visited.insert(next) {
                frontier.push(next);
            }
        }
    }
    false
}

/// Finds a path from `start` to `target`, both inclusive.
///
/// The path is whichever one depth-first search reaches first; it is not
/// guaranteed to be the shortest.
pub fn path_to<N, I, F>(start: N, target: N, mut neighbors: F) -> Option<Vec<N>>
where
    N: Copy + Eq + Hash,
    I: IntoIterator<Item = N>,
    F: FnMut(N) -> I,
{
    if start == target {
        return Some(vec![start]);
    }

    let mut parent: HashMap<N, N> = HashMap::new();
    let mut visited = HashSet::from([start]);
    let mut frontier = vec![start];

    while let Some(node) = frontier.pop() {
        for next in neighbors(node) {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, node);
            if next == target {
                return Some(unwind(&parent, start, target));
            }
            frontier.push(next);
        }
    }
    None
}

fn unwind<N: Copy + Eq + Hash>(parent: &HashMap<N, N>, start: N, target: N) -> Vec<N> {
    let mut path = vec![target];
    let mut current = target;
    while current != start {
        match parent.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Every node reachable from `start`, excluding `start` itself, in
/// discovery order.
pub fn collect_reachable<N, I, F>(start: N, mut neighbors: F) -> Vec<N>
where
    N: Copy + Eq + Hash,
    I: IntoIterator<Item = N>,
    F: FnMut(N) -> I,
{
    let mut visited = HashSet::from([start]);
    let mut frontier = vec![start];
    let mut found = Vec::new();

    while let Some(node) = frontier.pop() {
        for next in neighbors(node) {
            if visited.insert(next) {
                found.push(next);
                frontier.push(next);
            }
        }
    }
    found
}
