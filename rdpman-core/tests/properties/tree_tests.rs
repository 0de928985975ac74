//! Property-based tests for the tree-view projection

use proptest::prelude::*;
use rdpman_core::{TreeItem, build_connection_tree};

use super::arb_connections;

fn leaf_count(items: &[TreeItem]) -> usize {
    items
        .iter()
        .map(|item| match item {
            TreeItem::Connection { .. } => 1,
            TreeItem::Group { children, .. } => leaf_count(children),
            TreeItem::Credential { .. } | TreeItem::Empty { .. } => 0,
        })
        .sum()
}

fn is_sorted_case_insensitive<'a>(labels: impl Iterator<Item = &'a str>) -> bool {
    let lowered: Vec<String> = labels.map(str::to_lowercase).collect();
    lowered.windows(2).all(|pair| pair[0] <= pair[1])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every connection appears exactly once, ungrouped ones first
    #[test]
    fn prop_tree_covers_every_connection(connections in arb_connections(15)) {
        let tree = build_connection_tree(&connections, &[]);
        if connections.is_empty() {
            let is_empty_placeholder = matches!(tree.as_slice(), [TreeItem::Empty { .. }]);
            prop_assert!(is_empty_placeholder);
            return Ok(());
        }

        prop_assert_eq!(leaf_count(&tree), connections.len());

        let first_group = tree
            .iter()
            .position(|item| matches!(item, TreeItem::Group { .. }))
            .unwrap_or(tree.len());
        let leaves_after_groups = tree[first_group..]
            .iter()
            .any(|item| matches!(item, TreeItem::Connection { .. }));
        prop_assert!(!leaves_after_groups);
    }

    /// Groups and their members are ordered case-insensitively
    #[test]
    fn prop_tree_is_sorted(connections in arb_connections(15)) {
        let tree = build_connection_tree(&connections, &[]);
        let ungrouped = tree
            .iter()
            .filter(|item| matches!(item, TreeItem::Connection { .. }))
            .map(TreeItem::label);
        prop_assert!(is_sorted_case_insensitive(ungrouped));

        let groups: Vec<&TreeItem> = tree
            .iter()
            .filter(|item| matches!(item, TreeItem::Group { .. }))
            .collect();
        prop_assert!(is_sorted_case_insensitive(groups.iter().map(|g| g.label())));
        for group in groups {
            prop_assert!(!group.children().is_empty());
            prop_assert!(is_sorted_case_insensitive(group.children().iter().map(TreeItem::label)));
        }
    }
}
