//! Drag-and-drop model for connection tree operations
//!
//! Dropping connections onto the tree only ever changes their group. This
//! module keeps that as a pure transformation over the connection array so it
//! can be property-tested without a view layer.

use crate::models::{Connection, normalize_group};

/// Where dragged connections were dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto a group node
    Group(String),
    /// Onto a connection node; the dragged items join that connection's group
    Connection(String),
    /// Onto empty space; the dragged items become ungrouped
    Root,
}

/// Resolves the group a drop target stands for
///
/// Returns `Some(None)` for "ungrouped", and `None` if the target is a
/// connection id that is not in `connections`.
#[must_use]
pub fn target_group(connections: &[Connection], target: &DropTarget) -> Option<Option<String>> {
    match target {
        DropTarget::Group(name) => Some(normalize_group(Some(name))),
        DropTarget::Root => Some(None),
        DropTarget::Connection(id) => connections
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.group_name().map(ToString::to_string)),
    }
}

/// Moves the dragged connections into the target's group
///
/// Unknown ids are ignored, as is a connection target that does not exist.
/// Only records whose group actually changes get `modified_at = now`.
/// Returns the number of records changed.
pub fn apply_drop(
    connections: &mut [Connection],
    dragged_ids: &[String],
    target: &DropTarget,
    now: &str,
) -> usize {
    let Some(group) = target_group(connections, target) else {
        tracing::debug!(?target, "Drop target not found");
        return 0;
    };

    let mut moved = 0;
    for connection in connections
        .iter_mut()
        .filter(|c| dragged_ids.iter().any(|id| id == &c.id))
    {
        if connection.group_name() == group.as_deref() {
            continue;
        }
        connection.group.clone_from(&group);
        connection.modified_at = Some(now.to_string());
        moved += 1;
    }
    moved
}
