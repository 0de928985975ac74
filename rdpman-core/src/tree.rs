//! Tree-view projection of the stored collections
//!
//! Hosts render these items however they like; only the grouping and
//! ordering are fixed here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Connection, CredentialMeta};

/// Label for connections with no credential assigned
pub const NO_CREDENTIAL_LABEL: &str = "(no credential)";

/// One node of a tree view
///
/// Serializes with a `kind` discriminant so hosts can switch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TreeItem {
    /// A connection leaf
    Connection {
        /// Connection id
        id: String,
        /// Host name shown as the label
        hostname: String,
        /// Group the connection belongs to
        #[serde(skip_serializing_if = "Option::is_none")]
        group: Option<String>,
        /// Username of the assigned credential, or a placeholder
        #[serde(rename = "credentialLabel")]
        credential_label: String,
    },
    /// A group node with its connections
    Group {
        /// Group label
        name: String,
        /// Connection leaves, sorted by hostname
        children: Vec<TreeItem>,
    },
    /// A credential leaf
    Credential {
        /// Credential id
        id: String,
        /// Login name
        username: String,
    },
    /// Placeholder shown when there is nothing to list
    Empty {
        /// Message to display
        message: String,
    },
}

impl TreeItem {
    /// Display label for the node
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Connection { hostname, .. } => hostname,
            Self::Group { name, .. } => name,
            Self::Credential { username, .. } => username,
            Self::Empty { message } => message,
        }
    }

    /// Child nodes; only groups have any
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Group { children, .. } => children,
            _ => &[],
        }
    }
}

fn sort_key(value: &str) -> String {
    value.to_lowercase()
}

fn connection_item(connection: &Connection, credentials: &[CredentialMeta]) -> TreeItem {
    let credential_label = connection
        .credential_id
        .as_deref()
        .and_then(|id| credentials.iter().find(|c| c.id == id))
        .map_or_else(|| NO_CREDENTIAL_LABEL.to_string(), |c| c.username.clone());

    TreeItem::Connection {
        id: connection.id.clone(),
        hostname: connection.hostname.clone(),
        group: connection.group_name().map(ToString::to_string),
        credential_label,
    }
}

fn sorted_by_hostname<'a>(connections: impl Iterator<Item = &'a Connection>) -> Vec<&'a Connection> {
    let mut list: Vec<_> = connections.collect();
    list.sort_by_key(|c| sort_key(&c.hostname));
    list
}

/// Builds the connection tree: ungrouped connections first, then groups
///
/// Groups and their members are ordered case-insensitively. An empty
/// collection yields a single [`TreeItem::Empty`].
#[must_use]
pub fn build_connection_tree(
    connections: &[Connection],
    credentials: &[CredentialMeta],
) -> Vec<TreeItem> {
    if connections.is_empty() {
        return vec![TreeItem::Empty {
            message: "No connections yet".to_string(),
        }];
    }

    let ungrouped = connections.iter().filter(|c| c.group_name().is_none());
    let mut items: Vec<TreeItem> = sorted_by_hostname(ungrouped)
        .into_iter()
        .map(|c| connection_item(c, credentials))
        .collect();

    // Keyed by lowercase name so "lab" and "Lab" sort together; the first
    // spelling seen is displayed
    let mut groups: BTreeMap<String, (String, Vec<&Connection>)> = BTreeMap::new();
    for connection in connections {
        if let Some(name) = connection.group_name() {
            groups
                .entry(sort_key(name))
                .or_insert_with(|| (name.to_string(), Vec::new()))
                .1
                .push(connection);
        }
    }

    items.extend(groups.into_values().map(|(name, members)| TreeItem::Group {
        name,
        children: sorted_by_hostname(members.into_iter())
            .into_iter()
            .map(|c| connection_item(c, credentials))
            .collect(),
    }));

    items
}

/// Builds the credential list sorted by username
#[must_use]
pub fn build_credential_tree(credentials: &[CredentialMeta]) -> Vec<TreeItem> {
    if credentials.is_empty() {
        return vec![TreeItem::Empty {
            message: "No credentials yet".to_string(),
        }];
    }

    let mut sorted: Vec<_> = credentials.iter().collect();
    sorted.sort_by_key(|c| sort_key(&c.username));
    sorted
        .into_iter()
        .map(|c| TreeItem::Credential {
            id: c.id.clone(),
            username: c.username.clone(),
        })
        .collect()
}
