//! Flat-file JSON document store
//!
//! The whole database is one JSON object in one file, mapping composite
//! `{date}_{type}` keys to caller-supplied payloads. Every operation loads
//! or rewrites the full document; there is no patching, indexing, or
//! deletion.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not parse as a JSON object.
    /// Distinct from `Io` so callers can tell "store unreadable" apart
    /// from "store broken"; an empty mapping is not an error.
    #[error("store file is corrupted: {0}")]
    Corrupt(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Build the document key for a `(date, type)` pair.
///
/// Plain concatenation with `_`; the separator is not escaped, so a date
/// ending in `_` cannot be told apart from a type starting with one.
pub fn compose_key(date: &str, kind: &str) -> String {
    format!("{date}_{kind}")
}

/// Durable key/value access over a single JSON document file.
pub struct Store {
    path: PathBuf,
    /// Serializes the load-modify-persist cycle of `write`.
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file containing an empty document when absent.
    ///
    /// Idempotent; safe to call at every process start. An existing file is
    /// left untouched, whatever it contains.
    pub fn initialize(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, "{}")?;
        Ok(())
    }

    /// Return the value stored under `key`, or an empty array when the key
    /// was never written.
    pub async fn read(&self, key: &str) -> Result<Value> {
        let document = self.load_document().await?;
        Ok(document
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }

    /// Replace the value under `key` and persist the whole document.
    ///
    /// Mutations are serialized through the write lock, and the rewrite goes
    /// through a temporary sibling plus rename so an interrupted write never
    /// leaves a truncated document. A corrupted document rejects the write
    /// and stays on disk as-is.
    pub async fn write(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = match self.load_document().await {
            Ok(doc) => doc,
            // A store that was never initialized still accepts writes
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e),
        };
        document.insert(key.to_string(), value);

        let content = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Load and parse the full document from disk.
    async fn load_document(&self) -> Result<Map<String, Value>> {
        let bytes = tokio::fs::read(&self.path).await?;
        serde_json::from_slice::<Map<String, Value>>(&bytes).map_err(StoreError::Corrupt)
    }
}
