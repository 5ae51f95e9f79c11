//! Storage layer for preferences and other persisted store state.
//!
//! Stores never talk to a backend directly: they hold a
//! [`PersistedSlot`] bound to their own namespaced key, and the slot handles
//! JSON encoding and graceful fallback.
//!
//! # Modules
//!
//! - `backend`: [`KeyValueStore`] trait
//! - `memory`: in-memory and always-failing backends
//! - `json`: JSON file backend with atomic writes
//! - `persisted`: typed `{"state": ...}` envelopes over a backend

pub mod backend;
pub mod json;
pub mod memory;
pub mod persisted;

pub use backend::KeyValueStore;
pub use json::JsonFileStore;
pub use memory::{MemoryStore, UnavailableStore};
pub use persisted::{Envelope, PersistedSlot};

/// Namespaced storage keys, one per store.
pub mod keys {
    pub const LANGUAGE: &str = "chapel-language";
    pub const THEME: &str = "chapel-theme";
    pub const SEARCH: &str = "chapel-search";

    /// Key for a listing page's filters (`chapel-listing-sermon`).
    #[must_use]
    pub fn listing(kind: &str) -> String {
        format!("chapel-listing-{kind}")
    }

    /// Key for a form's saved draft (`chapel-draft-contact`).
    #[must_use]
    pub fn draft(form: &str) -> String {
        format!("chapel-draft-{form}")
    }
}
