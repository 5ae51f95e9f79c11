//! Size-rotated append-only file for trace lines.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Default size at which the trace file rotates (5 MB).
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of rotated files kept next to the live one.
pub const DEFAULT_MAX_BACKUPS: usize = 3;

/// Thread-safe line writer with size-based rotation.
///
/// Before each write the live file is checked; once it exceeds `max_bytes`
/// it is renamed to `<name>.<timestamp>` and a fresh file is started. Only
/// the newest `max_backups` rotated files are kept.
pub struct FileWriter {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    rotations: AtomicU64,
    file: Mutex<Option<fs::File>>,
}

impl FileWriter {
    /// Creates a writer with the default limits. The file is opened lazily.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limits(path, DEFAULT_MAX_BYTES, DEFAULT_MAX_BACKUPS)
    }

    #[must_use]
    pub const fn with_limits(path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            path,
            max_bytes,
            max_backups,
            rotations: AtomicU64::new(0),
            file: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `line` plus a newline, rotating first if needed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be rotated, opened or written, or if the
    /// lock was poisoned by a panicking writer.
    pub fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("trace writer lock poisoned: {e}")))?;

        if fs::metadata(&self.path).is_ok_and(|m| m.len() > self.max_bytes) {
            *file = None;
            self.rotate()?;
        }

        if file.is_none() {
            *file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        if let Some(handle) = file.as_mut() {
            writeln!(handle, "{line}")?;
            handle.flush()?;
        }
        Ok(())
    }

    fn rotate(&self) -> std::io::Result<()> {
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S%9f");
        let seq = self.rotations.fetch_add(1, Ordering::Relaxed);
        let mut backup = self.path.clone().into_os_string();
        backup.push(format!(".{stamp}-{seq:06}"));
        fs::rename(&self.path, PathBuf::from(backup))?;
        self.prune_backups()
    }

    /// Deletes rotated files beyond the retention limit. Timestamps sort
    /// lexically, so name order is age order.
    fn prune_backups(&self) -> std::io::Result<()> {
        let (Some(dir), Some(name)) = (self.path.parent(), self.path.file_name().and_then(|n| n.to_str())) else {
            return Ok(());
        };
        let prefix = format!("{name}.");
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();
        backups.sort();
        backups.reverse();

        for old in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("max_backups", &self.max_backups)
            .finish_non_exhaustive()
    }
}
