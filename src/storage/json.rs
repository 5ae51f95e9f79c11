//! JSON file-based key-value backend.
//!
//! Every key lives in one human-readable JSON file. Writes go to a temporary
//! file that is then renamed over the target, so a crash never leaves a
//! half-written file behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "chapel-language": "{\"state\":{\"currentLanguage\":\"te\"},\"version\":0}",
//!     "chapel-theme": "{\"state\":{\"theme\":\"dark\"},\"version\":0}"
//!   }
//! }
//! ```

use crate::domain::error::{ChapelError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Top-level structure serialized to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileData {
    /// Version of the file format for future migrations.
    version: u32,

    /// Stored values keyed by namespaced store key. Values are UTF-8 text.
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for FileData {
    fn default() -> Self {
        Self {
            version: 1,
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    data: FileData,
    dirty: bool,
}

/// JSON file storage backend.
///
/// The whole file is loaded on [`open`](Self::open) and rewritten on every
/// mutation. Last write wins: two processes sharing a file are not
/// coordinated.
#[derive(Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonFileStore {
    /// Opens or creates a JSON store at `file_path`.
    ///
    /// A file that exists but does not parse is treated as empty and logged;
    /// it is overwritten by the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but cannot be read.
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        tracing::debug!(path = ?file_path, "opening JSON key-value store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path).unwrap_or_else(|e| {
                tracing::warn!(path = ?file_path, error = %e, "discarding unreadable store file");
                FileData::default()
            })
        } else {
            FileData::default()
        };

        tracing::debug!(entry_count = data.entries.len(), "JSON store opened");

        Ok(Self {
            file_path,
            inner: Mutex::new(Inner { data, dirty: false }),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<FileData> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ChapelError::Storage(format!("failed to parse JSON: {e}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| ChapelError::Storage(format!("store lock poisoned: {e}")))
    }

    /// Writes the in-memory data to disk via temp file + rename.
    fn save(file_path: &Path, inner: &mut Inner) -> Result<()> {
        if !inner.dirty {
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&inner.data)?;
        let tmp_path = file_path.with_extension("tmp");

        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, file_path)?;

        inner.dirty = false;
        tracing::trace!(path = ?file_path, "store file written");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.lock()?;
        Ok(inner.data.entries.get(key).map(|v| v.as_bytes().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let _span = tracing::debug_span!("json_store_set", key = %key, len = value.len()).entered();

        let text = std::str::from_utf8(value)
            .map_err(|e| ChapelError::Storage(format!("value for {key} is not UTF-8: {e}")))?;

        let mut inner = self.lock()?;
        if inner.data.entries.get(key).map(String::as_str) == Some(text) {
            return Ok(());
        }
        inner.data.entries.insert(key.to_string(), text.to_string());
        inner.dirty = true;
        Self::save(&self.file_path, &mut inner)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store_remove", key = %key).entered();

        let mut inner = self.lock()?;
        if inner.data.entries.remove(key).is_some() {
            inner.dirty = true;
        }
        Self::save(&self.file_path, &mut inner)
    }
}

impl Drop for JsonFileStore {
    fn drop(&mut self) {
        let Ok(inner) = self.inner.get_mut() else {
            return;
        };
        if inner.dirty {
            tracing::debug!("saving dirty store on drop");
            if let Err(e) = Self::save(&self.file_path, inner) {
                tracing::error!(error = %e, "failed to save store on drop");
            }
        }
    }
}
