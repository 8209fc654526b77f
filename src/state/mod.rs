//! Persistent state
//!
//! Two small records in the user's home directory: global defaults in an
//! INI config, and per-document reading state in a JSON store.

pub mod config;
pub mod documents;

pub use config::Config;
pub use documents::{DocumentRecord, DocumentStore};
