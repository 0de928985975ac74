//! Property test modules

mod drag_drop_tests;
mod migration_tests;
mod rdp_file_tests;
mod tree_tests;
mod validation_tests;

use proptest::prelude::*;
use rdpman_core::Connection;

/// Generates a plausible hostname
pub fn arb_hostname() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,20}(\\.[a-z][a-z0-9-]{0,10}){0,2}").unwrap()
}

/// Generates a group label, or none
pub fn arb_group() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[A-Za-z][A-Za-z0-9 ]{0,12}").unwrap())
}

/// Generates connections with distinct ids
pub fn arb_connections(max: usize) -> impl Strategy<Value = Vec<Connection>> {
    prop::collection::vec((arb_hostname(), arb_group()), 0..max).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(index, (hostname, group))| {
                let mut connection = Connection::new(hostname, None, group.as_deref());
                connection.id = format!("conn-{index}");
                connection
            })
            .collect()
    })
}
