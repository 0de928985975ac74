//! Persisted record collections
//!
//! Both stores follow the same pattern: read the whole collection from the
//! blob store, validate its shape, change it in memory and write the whole
//! collection back. There is no lock around that read-modify-write window;
//! the last writer wins.

mod connections;
mod credentials;

pub use connections::{ConnectionStore, ImportSummary, MigrationHook};
pub use credentials::CredentialStore;
