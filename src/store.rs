//! Whole-blob persistence for `QueueState`.
//!
//! There is no locking across processes: two interactions saving at the
//! same time means the later write wins.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::state::QueueState;

pub trait StateStore: Send + Sync {
    /// The last saved state, or an empty one if nothing usable is stored.
    fn load(&self) -> QueueState;

    /// Replaces the stored state entirely.
    fn save(&self, state: &QueueState) -> Result<(), StoreError>;
}

/// Stores the queue as a JSON file shared by every client that points at it.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<QueueState>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }
}

impl StateStore for FileStore {
    fn load(&self) -> QueueState {
        let mut state = match self.read() {
            Ok(Some(state)) => state,
            Ok(None) => {
                crate::dlog!("[Store] No queue at {}, starting empty", self.path.display());
                return QueueState::new();
            }
            Err(err) => {
                tracing::warn!(
                    "[Store] Unreadable queue at {}, starting empty: {err}",
                    self.path.display()
                );
                return QueueState::new();
            }
        };
        if state.normalize() {
            tracing::warn!("[Store] Repaired inconsistent queue at {}", self.path.display());
        }
        state
    }

    fn save(&self, state: &QueueState) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| StoreError::Persist {
            path: self.path.display().to_string(),
            source: err.error,
        })?;
        crate::dlog!(
            "[Store] Saved revision {} to {}",
            state.revision(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the state in process; for embedding and tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Option<QueueState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: QueueState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> QueueState {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_default()
    }

    fn save(&self, state: &QueueState) -> Result<(), StoreError> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = Some(state.clone());
        Ok(())
    }
}
