//! Typed, best-effort persistence of one store's state slice.
//!
//! A [`PersistedSlot`] binds a namespaced key to the subset of a store's
//! fields that survives across sessions. The value on disk is an envelope:
//!
//! ```json
//! { "state": { "currentLanguage": "te" }, "version": 0 }
//! ```
//!
//! Loading never fails: missing, unreadable or undecodable data yields
//! `None` and a warning. Saving never fails either: a rejected write is
//! logged and the store carries on in memory.

use crate::storage::backend::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// Envelope schema version. Envelopes carrying any other version are
/// ignored on load.
pub const SCHEMA_VERSION: u32 = 0;

/// On-disk wrapper around a store's persisted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub state: T,
    #[serde(default)]
    pub version: u32,
}

/// A typed handle on one namespaced key.
pub struct PersistedSlot<T> {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    _state: PhantomData<fn() -> T>,
}

impl<T> PersistedSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            _state: PhantomData,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the persisted state, or `None` if absent or unusable.
    pub fn load(&self) -> Option<T> {
        let bytes = match self.backend.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::trace!(key = %self.key, "no persisted state");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "storage unavailable, using defaults");
                return None;
            }
        };

        match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) if envelope.version == SCHEMA_VERSION => Some(envelope.state),
            Ok(envelope) => {
                tracing::warn!(
                    key = %self.key,
                    found = envelope.version,
                    expected = SCHEMA_VERSION,
                    "persisted state version mismatch, using defaults"
                );
                None
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "corrupt persisted state, using defaults");
                None
            }
        }
    }

    /// Persists `state`. Returns whether the write reached the backend.
    pub fn save(&self, state: &T) -> bool {
        let envelope = Envelope {
            state,
            version: SCHEMA_VERSION,
        };
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to encode state");
                return false;
            }
        };

        match self.backend.set(&self.key, &bytes) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "persistence skipped");
                false
            }
        }
    }

    /// Removes the persisted state. Returns whether the backend accepted it.
    pub fn clear(&self) -> bool {
        match self.backend.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to clear persisted state");
                false
            }
        }
    }
}

impl<T> std::fmt::Debug for PersistedSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedSlot")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, UnavailableStore};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Prefs {
        current_language: String,
    }

    #[test]
    fn writes_state_envelope() {
        let memory = Arc::new(MemoryStore::new());
        let slot: PersistedSlot<Prefs> = PersistedSlot::new(memory.clone(), "prefs");
        assert!(slot.save(&Prefs {
            current_language: "te".to_string()
        }));

        let raw = memory.snapshot().remove("prefs").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["state"]["currentLanguage"], "te");
        assert_eq!(slot.load().unwrap().current_language, "te");
    }

    #[test]
    fn corrupt_or_mismatched_data_loads_as_none() {
        let memory = Arc::new(MemoryStore::new());
        memory.set("prefs", b"{\"state\": 42").unwrap();
        let slot: PersistedSlot<Prefs> = PersistedSlot::new(memory.clone(), "prefs");
        assert_eq!(slot.load(), None);

        memory
            .set("prefs", br#"{"state":{"currentLanguage":"en"},"version":3}"#)
            .unwrap();
        assert_eq!(slot.load(), None);

        memory
            .set("prefs", br#"{"state":{"currentLanguage":"en"}}"#)
            .unwrap();
        assert!(slot.load().is_some());
    }

    #[test]
    fn unavailable_backend_degrades_silently() {
        let slot: PersistedSlot<Prefs> = PersistedSlot::new(Arc::new(UnavailableStore), "prefs");
        assert_eq!(slot.load(), None);
        assert!(!slot.save(&Prefs {
            current_language: "en".to_string()
        }));
        assert!(!slot.clear());
    }
}
