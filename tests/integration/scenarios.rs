//! The reference scenarios, run against the public API.

use std::f64::consts::{FRAC_PI_2, TAU};

use taskdag::core::{cycle_path, would_create_cycle};
use taskdag::layout::{resolve, LayoutEngine, Point};
use taskdag::{Error, TaskId};

use crate::fixtures::graph_with;

#[test]
fn test_back_edge_on_chain_is_a_cycle() {
    let mut graph = graph_with(&[1, 2, 3], &[(2, 1), (3, 2)]);
    let snapshot = graph.snapshot();

    assert!(would_create_cycle(&snapshot, TaskId(1), TaskId(3)));
    assert_eq!(
        cycle_path(&snapshot, TaskId(1), TaskId(3)),
        Some(vec![TaskId(1), TaskId(3), TaskId(2), TaskId(1)])
    );
    assert!(matches!(
        graph.add_edge(TaskId(1), TaskId(3)),
        Err(Error::Cycle { .. })
    ));
    assert_eq!(graph.dependency_count(), 2);
}

#[test]
fn test_direct_edge_coexists_with_transitive_path() {
    let mut graph = graph_with(&[1, 2, 3], &[(2, 1), (3, 2)]);
    graph.add_edge(TaskId(3), TaskId(1)).unwrap();

    assert!(graph.has_edge(TaskId(3), TaskId(1)));
    assert!(graph.has_edge(TaskId(3), TaskId(2)));
    assert_eq!(graph.dependency_count(), 3);
    assert!(graph.topological_order().is_ok());
}

#[test]
fn test_self_dependency_is_rejected() {
    let mut graph = graph_with(&[5], &[]);
    assert!(matches!(
        graph.add_edge(TaskId(5), TaskId(5)),
        Err(Error::SelfReference(TaskId(5)))
    ));
}

#[test]
fn test_unknown_task_is_rejected() {
    let mut graph = graph_with(&[1], &[]);
    assert!(matches!(
        graph.add_edge(TaskId(9), TaskId(1)),
        Err(Error::UnknownNode(TaskId(9)))
    ));
}

#[test]
fn test_three_nodes_on_default_circle() {
    let center = Point::new(300.0, 300.0);
    let radius = 200.0;
    let engine = LayoutEngine::new(center, radius);
    let ids = [TaskId(1), TaskId(2), TaskId(3)];
    let positions = engine.compute_positions(&ids);

    for (k, id) in ids.iter().enumerate() {
        let p = positions[id];
        let angle = (p.y - center.y).atan2(p.x - center.x);
        let expected = -FRAC_PI_2 + k as f64 * TAU / 3.0;
        // Compare angles modulo a full turn.
        let diff = (angle - expected).rem_euclid(TAU);
        assert!(diff < 1e-9 || TAU - diff < 1e-9, "node {} at angle {}", id, angle);
        assert!((p.distance(center) - radius).abs() < 1e-9);
    }
}

#[test]
fn test_pointer_on_node_resolves_to_it() {
    let engine = LayoutEngine::default();
    let positions = engine.compute_positions(&[TaskId(1), TaskId(2), TaskId(3)]);
    let on_node_2 = positions[&TaskId(2)];

    assert_eq!(resolve(on_node_2, &positions, 35.0), Some(TaskId(2)));
}
