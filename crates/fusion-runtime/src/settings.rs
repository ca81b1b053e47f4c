//! UI settings persistence.
//!
//! One JSON object on disk, shared by every module through the shared
//! context. Read failures degrade to an empty snapshot; write failures
//! propagate to the caller. Single-process, single-writer: no locking
//! beyond the cache mutex.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::warn;

/// Full settings snapshot: arbitrary string keys, JSON values.
pub type Snapshot = Map<String, Value>;

/// Cached, file-backed key/value store.
pub struct SettingsStore {
    path: PathBuf,
    cache: Mutex<Option<Snapshot>>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Load settings, using the cache after the first read. Returns a
    /// defensive copy. A missing, unreadable or malformed file yields an
    /// empty snapshot (logged, never an error).
    pub fn load(&self) -> Snapshot {
        let mut cache = self.cache.lock().expect("settings cache lock poisoned");
        if let Some(snapshot) = cache.as_ref() {
            return snapshot.clone();
        }
        let snapshot = self.read_from_disk();
        *cache = Some(snapshot.clone());
        snapshot
    }

    fn read_from_disk(&self) -> Snapshot {
        if !self.path.exists() {
            return Snapshot::new();
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to load settings, using defaults");
                return Snapshot::new();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(path = ?self.path, "Settings file is not a JSON object, using defaults");
                Snapshot::new()
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Invalid JSON in settings file, using defaults");
                Snapshot::new()
            }
        }
    }

    /// Save the full snapshot to disk and refresh the cache. Creates parent
    /// directories as needed; I/O errors propagate to the caller.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {:?}", parent)
                })?;
            }
        }
        let content = serde_json::to_string_pretty(&Value::Object(snapshot.clone()))
            .context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings file {:?}", self.path))?;

        *self.cache.lock().expect("settings cache lock poisoned") = Some(snapshot.clone());
        Ok(())
    }

    /// Get a single setting value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.load().get(key).cloned()
    }

    /// Get a single setting value, or `default` if unset.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Set a single setting value and persist the whole snapshot
    /// immediately.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut snapshot = self.load();
        snapshot.insert(key.to_string(), value);
        self.save(&snapshot)
    }

    /// Drop the cache and re-read from disk.
    pub fn reload(&self) -> Snapshot {
        *self.cache.lock().expect("settings cache lock poisoned") = None;
        self.load()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
