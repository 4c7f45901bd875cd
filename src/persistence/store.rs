//! Where snapshots live
//!
//! The session only sees [`SnapshotStore`]. Platform-specific backends are in
//! [`crate::platform::storage`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A single-slot string store for the economy snapshot
pub trait SnapshotStore {
    /// The saved JSON, or `None` if nothing was ever saved
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    fn save(&mut self, json: &str) -> Result<(), PersistenceError>;
}

/// In-process store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            data: Some(json.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, json: &str) -> Result<(), PersistenceError> {
        self.data = Some(json.to_string());
        Ok(())
    }
}
