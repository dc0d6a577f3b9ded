//! JSON-file preference store.
//!
//! The file is read once on open and rewritten in full on every change.
//! Each write goes to its own temp file in the same directory and is
//! persisted over the target, so an interrupted write leaves the previous
//! file intact. Writers are serialized; the last `set` wins on disk.

use crate::error::PersistenceResult;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Key of the persisted theme preference.
pub const THEME_KEY: &str = "gex.theme";

/// Key of the persisted notes markup.
pub const NOTES_KEY: &str = "gex.notes";

/// Key/value preference store backed by a JSON file.
#[derive(Debug)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
    /// Held across snapshot and file write.
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Preference file not found, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "Loaded preferences");

        Ok(Self {
            path: Some(path),
            values: Mutex::new(values),
            write_lock: Mutex::new(()),
        })
    }

    /// Store that keeps values in memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(BTreeMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Set a value and write the file.
    ///
    /// The in-memory value is updated even if the write fails.
    pub fn set(&self, key: &str, value: impl Into<String>) -> PersistenceResult<()> {
        let _writer = self.write_lock.lock();
        let snapshot = {
            let mut values = self.values.lock();
            values.insert(key.to_string(), value.into());
            values.clone()
        };
        self.write(&snapshot)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn write(&self, values: &BTreeMap<String, String>) -> PersistenceResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let content = serde_json::to_string_pretty(values)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;

        if let Err(e) = tmp.persist(path) {
            warn!(path = %path.display(), error = %e.error, "Failed to replace preference file");
            return Err(e.error.into());
        }

        debug!(path = %path.display(), keys = values.len(), "Preferences written");
        Ok(())
    }
}
