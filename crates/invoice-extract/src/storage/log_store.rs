//! Capacity-bounded activity log backed by a JSON file

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::types::{LogEntry, NewLogEntry};

/// Number of entries kept when no capacity is configured
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Storage for pipeline activity entries
///
/// Implementations:
/// - `JsonFileLogStore`: pretty-printed JSON array on local disk
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Assign an id to the entry, store it and return the stored form
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntry>;

    /// All stored entries, oldest first
    async fn list(&self) -> Result<Vec<LogEntry>>;

    /// Append, reporting a failure only through tracing
    async fn record(&self, entry: NewLogEntry) {
        if let Err(e) = self.append(entry).await {
            tracing::warn!("Activity log not updated: {}", e);
        }
    }
}

/// Log store keeping the most recent `capacity` entries in one JSON file.
///
/// Appends are read-modify-write of the whole file. They are serialized within
/// this process; separate processes sharing the file can still lose entries.
pub struct JsonFileLogStore {
    path: PathBuf,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl JsonFileLogStore {
    /// Create a store for the given file. Nothing is read or written until first use.
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored entries. A missing or unparseable file reads as empty.
    async fn read_entries(&self) -> Result<Vec<LogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::log_store(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Vec<LogEntry>>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Ignoring unparseable activity log {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_entries(&self, entries: &[LogEntry]) -> Result<()> {
        let data = serde_json::to_string_pretty(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for JsonFileLogStore {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntry> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries().await.unwrap_or_else(|e| {
            tracing::warn!("Starting a fresh activity log: {}", e);
            Vec::new()
        });

        let now = Utc::now().timestamp_millis().max(0) as u64;
        let id = match entries.iter().map(|e| e.id).max() {
            Some(last) if last >= now => last + 1,
            _ => now,
        };

        let stored = entry.with_id(id);
        entries.push(stored.clone());

        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }

        self.write_entries(&entries)
            .await
            .map_err(|e| Error::log_store(format!("Failed to write activity log: {}", e)))?;

        tracing::debug!(
            "Logged {:?}/{:?} for '{}' (id {})",
            stored.action,
            stored.status,
            stored.file_name,
            stored.id
        );

        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<LogEntry>> {
        self.read_entries().await
    }
}
