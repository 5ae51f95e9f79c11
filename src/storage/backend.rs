//! Durable key-value storage abstraction.
//!
//! This module defines the [`KeyValueStore`] trait every persistent store
//! writes through. The trait deals in raw bytes; encoding and decoding live
//! one layer up in [`PersistedSlot`](super::PersistedSlot), so a backend
//! never needs to know what a store keeps.
//!
//! The trait is deliberately minimal: the state layer only ever reads one
//! key, writes one key or forgets one key.

use crate::domain::error::Result;

/// Abstraction over durable, process-shared key-value storage.
///
/// Methods take `&self`: every store holds an `Arc` to the same backend, so
/// implementations use interior mutability. Each store writes under its own
/// namespaced key, so concurrent stores never collide.
///
/// # Implementations
///
/// - [`MemoryStore`](super::MemoryStore): process-lifetime map, for tests and
///   server-side rendering
/// - [`JsonFileStore`](super::JsonFileStore): single JSON file with atomic writes
/// - [`UnavailableStore`](super::UnavailableStore): always fails, modelling
///   storage that is disabled (privacy mode, quota exhausted)
///
/// # Examples
///
/// ```
/// use chapel::storage::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.set("chapel-language", br#"{"state":{"currentLanguage":"te"}}"#)?;
/// assert!(store.get("chapel-language")?.is_some());
/// # Ok::<(), chapel::ChapelError>(())
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Reads the bytes stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<()>;
}
