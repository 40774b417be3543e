//! Persisted configuration for the picker
//!
//! - **document**: the in-memory document and its structural operations
//! - **store**: JSON load/save with legacy-shape migration

pub mod document;
pub mod store;

// Re-export commonly used types
pub use document::{Document, Section, Settings};
pub use store::{DocumentStore, JsonFileStore};
