//! Property-based tests for regrouping by drag and drop

use proptest::prelude::*;
use rdpman_core::{DropTarget, apply_drop};

use super::{arb_connections, arb_group};

const NOW: &str = "2025-01-01T00:00:00.000Z";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Dropping onto a group puts every dragged connection in it and leaves
    /// the rest untouched
    #[test]
    fn prop_drop_on_group_only_moves_dragged(
        connections in arb_connections(12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
        group in "[A-Za-z][A-Za-z0-9]{0,10}",
    ) {
        let dragged: Vec<String> = if connections.is_empty() {
            Vec::new()
        } else {
            picks.iter().map(|i| connections[i.index(connections.len())].id.clone()).collect()
        };
        let before = connections.clone();
        let mut after = connections;
        let moved = apply_drop(&mut after, &dragged, &DropTarget::Group(group.clone()), NOW);

        let mut expected_moves = 0;
        for (old, new) in before.iter().zip(&after) {
            prop_assert_eq!(&old.id, &new.id);
            prop_assert_eq!(&old.hostname, &new.hostname);
            if dragged.contains(&old.id) {
                prop_assert_eq!(new.group_name(), Some(group.as_str()));
                if old.group_name() != Some(group.as_str()) {
                    expected_moves += 1;
                    prop_assert_eq!(new.modified_at.as_deref(), Some(NOW));
                }
            } else {
                prop_assert_eq!(old, new);
            }
        }
        prop_assert_eq!(moved, expected_moves);
    }

    /// Dropping onto a connection adopts that connection's group
    #[test]
    fn prop_drop_on_connection_adopts_its_group(
        mut connections in arb_connections(10),
        target in any::<prop::sample::Index>(),
        source in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!connections.is_empty());
        let target = connections[target.index(connections.len())].clone();
        let source = connections[source.index(connections.len())].id.clone();

        apply_drop(
            &mut connections,
            std::slice::from_ref(&source),
            &DropTarget::Connection(target.id.clone()),
            NOW,
        );
        let moved = connections.iter().find(|c| c.id == source).unwrap();
        prop_assert_eq!(moved.group_name(), target.group_name());
    }

    /// A second identical drop changes nothing
    #[test]
    fn prop_drop_is_idempotent(
        mut connections in arb_connections(10),
        group in arb_group(),
    ) {
        let dragged: Vec<String> = connections.iter().map(|c| c.id.clone()).collect();
        let target = group.map_or(DropTarget::Root, DropTarget::Group);
        apply_drop(&mut connections, &dragged, &target, NOW);
        let once = connections.clone();
        prop_assert_eq!(apply_drop(&mut connections, &dragged, &target, "later"), 0);
        prop_assert_eq!(connections, once);
    }

    /// Unknown drop targets are ignored
    #[test]
    fn prop_unknown_connection_target_is_a_no_op(mut connections in arb_connections(10)) {
        let before = connections.clone();
        let dragged: Vec<String> = connections.iter().map(|c| c.id.clone()).collect();
        let moved = apply_drop(&mut connections, &dragged, &DropTarget::Connection("missing".into()), NOW);
        prop_assert_eq!(moved, 0);
        prop_assert_eq!(connections, before);
    }
}
