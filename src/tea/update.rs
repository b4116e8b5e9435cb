//! Update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns the commands the runtime must forward to the task service.
//!
//! Dependency requests are validated and inserted as pending edges within a
//! single call, so no other local change can slip in between the check and
//! the submission. A concurrent editor on the service side can still race
//! us; the service re-validates and any rejection rolls the edge back here.

use crate::core::dag::GraphModel;
use crate::core::records::TaskRecord;
use crate::core::task::TaskId;
use crate::layout::Point;
use crate::{tdlog, tdlog_debug, tdlog_trace, tdlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Drag, Model, Notification, NotificationLevel};

fn set_error(model: &mut Model, message: String) {
    tdlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message,
    });
    model.dirty = true;
}

/// Model + Message → Commands
///
/// All I/O happens via the returned commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::TasksLoaded(records) => {
            let (graph, skipped) = GraphModel::from_records(&records);
            tdlog!(
                "Message::TasksLoaded tasks={} dependencies={} skipped={}",
                graph.task_count(),
                graph.dependency_count(),
                skipped.len()
            );
            model.graph = graph;
            model.removing.clear();
            model.relayout();
            if !skipped.is_empty() {
                set_error(
                    model,
                    format!("Ignored {} invalid entries in task list", skipped.len()),
                );
            }
        }

        Message::TaskCreated(record) => {
            tdlog!("Message::TaskCreated id={}", record.id);
            upsert_record(model, &record, true);
        }

        Message::TaskUpdated(record) => {
            tdlog_debug!("Message::TaskUpdated id={}", record.id);
            upsert_record(model, &record, false);
        }

        Message::TaskDeleted(id) => {
            tdlog!("Message::TaskDeleted id={}", id);
            if model.graph.remove_node(id).is_some() {
                model.removing.retain(|&(d, p), _| d != id && p != id);
                model.relayout();
            }
        }

        Message::RequestDependency {
            dependent,
            prerequisite,
        } => match model.graph.add_pending_edge(dependent, prerequisite) {
            Ok(()) => {
                tdlog!("Dependency requested: {} -> {}", dependent, prerequisite);
                model.notification = None;
                model.dirty = true;
                cmds.push(Command::SubmitDependency {
                    task: dependent,
                    depends_on: prerequisite,
                });
            }
            Err(e) => set_error(model, e.to_string()),
        },

        Message::DependencyConfirmed(record) => {
            tdlog_debug!(
                "Message::DependencyConfirmed {} -> {} record={}",
                record.task,
                record.depends_on,
                record.id
            );
            if !model.graph.confirm_edge(&record) {
                // Confirmed remotely without a local request (or after a
                // rollback): adopt it if it is still valid here.
                match model.graph.add_edge(record.task, record.depends_on) {
                    Ok(()) => {
                        model.graph.confirm_edge(&record);
                    }
                    Err(e) => tdlog_warn!(
                        "Confirmed dependency {} -> {} not applied locally: {}",
                        record.task,
                        record.depends_on,
                        e
                    ),
                }
            }
            model.dirty = true;
        }

        Message::DependencyRejected {
            dependent,
            prerequisite,
            rejection,
        } => {
            if model.graph.is_edge_pending(dependent, prerequisite) {
                model.graph.remove_edge(dependent, prerequisite);
            }
            set_error(
                model,
                format!(
                    "Dependency {} -> {} rejected: {}",
                    dependent, prerequisite, rejection
                ),
            );
        }

        Message::RequestRemoveDependency {
            dependent,
            prerequisite,
        } => {
            if let Some(state) = model.graph.take_edge(dependent, prerequisite) {
                tdlog!("Dependency removal requested: {} -> {}", dependent, prerequisite);
                model.removing.insert((dependent, prerequisite), state);
                model.dirty = true;
                cmds.push(Command::DeleteDependency {
                    task: dependent,
                    depends_on: prerequisite,
                });
            }
        }

        Message::DependencyRemoved {
            dependent,
            prerequisite,
        } => {
            model.removing.remove(&(dependent, prerequisite));
            if model.graph.remove_edge(dependent, prerequisite) {
                model.dirty = true;
            }
        }

        Message::DependencyRemoveRejected {
            dependent,
            prerequisite,
            rejection,
        } => {
            // Restore the edge we dropped optimistically, record id included.
            let restored = match model.removing.remove(&(dependent, prerequisite)) {
                Some(state) => model.graph.restore_edge(dependent, prerequisite, state),
                None => model.graph.add_edge(dependent, prerequisite),
            };
            if let Err(e) = restored {
                tdlog_warn!(
                    "Could not restore dependency {} -> {}: {}",
                    dependent,
                    prerequisite,
                    e
                );
            }
            set_error(
                model,
                format!(
                    "Removing dependency {} -> {} failed: {}",
                    dependent, prerequisite, rejection
                ),
            );
        }

        Message::PointerMoved(pointer) => pointer_moved(model, pointer),

        Message::PointerPressed(pointer) => {
            let hit = model.node_at(pointer);
            tdlog_trace!("Message::PointerPressed hit={:?}", hit);
            model.selected = hit;
            model.drag = hit.and_then(|id| {
                model.position(id).map(|position| Drag {
                    id,
                    grab_offset: pointer - position,
                })
            });
            model.dirty = true;
        }

        Message::PointerReleased => {
            if let Some(drag) = model.drag.take() {
                tdlog_debug!("Drag finished id={}", drag.id);
            }
        }

        Message::ResetPosition(id) => {
            if model.layout.clear_override(id) {
                model.relayout();
            }
        }
    }

    cmds
}

fn upsert_record(model: &mut Model, record: &TaskRecord, created: bool) {
    let is_new = !model.graph.contains(record.id);
    if let Err(e) = model.graph.upsert_node(record.task()) {
        set_error(model, e.to_string());
        return;
    }

    // A freshly created task arrives with its dependencies already persisted.
    if created || is_new {
        for &prerequisite in &record.depends_on {
            if model.graph.has_edge(record.id, prerequisite) {
                continue;
            }
            if let Err(e) = model.graph.add_edge(record.id, prerequisite) {
                tdlog_warn!(
                    "Task {} dependency on {} not applied: {}",
                    record.id,
                    prerequisite,
                    e
                );
            }
        }
    }

    if is_new {
        model.relayout();
        if created {
            set_info(model, format!("Created \"{}\"", record.title));
        }
    } else {
        model.dirty = true;
    }
}

fn pointer_moved(model: &mut Model, pointer: Point) {
    if let Some(drag) = model.drag {
        let position = pointer - drag.grab_offset;
        model.layout.set_override(drag.id, position);
        model.positions.insert(drag.id, position);
        model.dirty = true;
        return;
    }

    let hovered = model.node_at(pointer);
    if hovered != model.hovered {
        tdlog_trace!("hover {:?} -> {:?}", model.hovered, hovered);
        model.hovered = hovered;
        model.dirty = true;
    }
}

/// Whether `dependent` may depend on `prerequisite` right now.
///
/// Renderers call this while the user is still choosing, before any request
/// is made.
pub fn can_depend(model: &Model, dependent: TaskId, prerequisite: TaskId) -> crate::Result<()> {
    model.graph.validate_edge(dependent, prerequisite)
}
