//! Controller and task service working together.

use taskdag::tea::{update, Command, Message, NotificationLevel};
use taskdag::TaskId;

use crate::fixtures::{chain_records, dispatch, loaded_model, record, FakeTaskService};

fn request(dependent: u64, prerequisite: u64) -> Message {
    Message::RequestDependency {
        dependent: TaskId(dependent),
        prerequisite: TaskId(prerequisite),
    }
}

#[test]
fn test_accepted_dependency_is_confirmed() {
    let mut service = FakeTaskService::new(&chain_records());
    let mut model = loaded_model(service.listing());

    dispatch(&mut model, &mut service, request(3, 1));

    assert!(model.graph.has_edge(TaskId(3), TaskId(1)));
    assert!(!model.graph.is_edge_pending(TaskId(3), TaskId(1)));
    assert!(service.graph.has_edge(TaskId(3), TaskId(1)));
    assert_eq!(model.graph.edges(), service.graph.edges());
}

#[test]
fn test_locally_rejected_request_never_reaches_service() {
    let mut service = FakeTaskService::new(&chain_records());
    let mut model = loaded_model(service.listing());

    for msg in [request(1, 3), request(2, 2), request(9, 1), request(2, 1)] {
        dispatch(&mut model, &mut service, msg);
    }

    assert!(service.received.is_empty());
    assert_eq!(model.graph.edges(), service.graph.edges());
}

#[test]
fn test_remote_race_is_caught_by_service_and_rolled_back() {
    let mut service = FakeTaskService::new(&[record(1, &[]), record(2, &[]), record(3, &[])]);
    let mut model = loaded_model(service.listing());

    // Another editor makes 1 depend on 2 after our listing was taken.
    service.remote_add_dependency(1, 2);

    // Locally 2 -> 1 still looks fine, so it is submitted optimistically.
    let cmds = update(&mut model, request(2, 1));
    assert_eq!(
        cmds,
        vec![Command::SubmitDependency {
            task: TaskId(2),
            depends_on: TaskId(1)
        }]
    );
    assert!(model.graph.is_edge_pending(TaskId(2), TaskId(1)));

    let answer = service.handle(&cmds[0]);
    assert!(matches!(answer, Message::DependencyRejected { .. }));
    update(&mut model, answer);

    assert!(!model.graph.has_edge(TaskId(2), TaskId(1)));
    let notification = model.notification.as_ref().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification.message.contains("2 -> 1 -> 2"));

    // A fresh listing brings the remote edge in.
    update(&mut model, Message::TasksLoaded(service.listing()));
    assert!(model.graph.has_edge(TaskId(1), TaskId(2)));
}

#[test]
fn test_transport_failure_rolls_back() {
    let mut service = FakeTaskService::new(&chain_records());
    let mut model = loaded_model(service.listing());
    service.fail_next = Some("connection reset".to_string());

    dispatch(&mut model, &mut service, request(3, 1));

    assert!(!model.graph.has_edge(TaskId(3), TaskId(1)));
    assert_eq!(model.graph.dependency_count(), 2);
    assert!(model
        .notification
        .as_ref()
        .unwrap()
        .message
        .contains("connection reset"));
}

#[test]
fn test_removal_roundtrip_and_failed_removal() {
    let mut service = FakeTaskService::new(&chain_records());
    let mut model = loaded_model(service.listing());

    let remove = |d: u64, p: u64| Message::RequestRemoveDependency {
        dependent: TaskId(d),
        prerequisite: TaskId(p),
    };

    dispatch(&mut model, &mut service, remove(3, 2));
    assert!(!model.graph.has_edge(TaskId(3), TaskId(2)));
    assert!(!service.graph.has_edge(TaskId(3), TaskId(2)));

    service.fail_next = Some("forbidden".to_string());
    dispatch(&mut model, &mut service, remove(2, 1));
    assert!(model.graph.has_edge(TaskId(2), TaskId(1)));
    assert!(service.graph.has_edge(TaskId(2), TaskId(1)));
}

#[test]
fn test_deleting_task_removes_its_edges_everywhere() {
    let mut service = FakeTaskService::new(&chain_records());
    let mut model = loaded_model(service.listing());

    service.graph.remove_node(TaskId(2));
    update(&mut model, Message::TaskDeleted(TaskId(2)));

    assert_eq!(model.graph.edges(), service.graph.edges());
    assert!(model.graph.edges().is_empty());
    for id in model.graph.node_ids() {
        assert!(model.graph.depends_on(id).iter().all(|p| model.graph.contains(*p)));
        assert!(model.graph.dependents(id).iter().all(|d| model.graph.contains(*d)));
    }
}

#[test]
fn test_listing_roundtrip_keeps_dependents_inverse() {
    let service = FakeTaskService::new(&chain_records());
    let model = loaded_model(service.listing());

    for exported in model.graph.to_records() {
        for prerequisite in &exported.depends_on {
            assert!(model.graph.dependents(*prerequisite).contains(&exported.id));
        }
        for dependent in &exported.dependents {
            assert!(model.graph.depends_on(*dependent).contains(&exported.id));
        }
    }
}
