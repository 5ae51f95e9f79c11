//! In-memory and unavailable storage backends.

use crate::domain::error::{ChapelError, Result};
use crate::storage::backend::KeyValueStore;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-lifetime key-value store.
///
/// Used in tests and wherever durable storage is not wanted. Cloning the
/// contents out with [`snapshot`](Self::snapshot) lets tests inspect exactly
/// what a store persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|e| ChapelError::Storage(format!("memory store poisoned: {e}")))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// A backend that refuses every operation.
///
/// Models storage that exists but cannot be used. Stores built on it must
/// keep working in memory for the rest of the session.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Err(ChapelError::Storage(format!("storage unavailable reading {key}")))
    }

    fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
        Err(ChapelError::Storage(format!("storage unavailable writing {key}")))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Err(ChapelError::Storage(format!("storage unavailable removing {key}")))
    }
}
