//! Snapshot storage backends
//!
//! LocalStorage on web, a JSON file natively.

use crate::persistence::{PersistenceError, SnapshotStore};

/// Key the browser build has always saved under
pub const STORAGE_KEY: &str = "serpentScaleProgress";

/// Browser LocalStorage slot (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(STORAGE_KEY)
    }
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistenceError::Unavailable("no LocalStorage".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl SnapshotStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))
    }

    fn save(&mut self, json: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(&self.key, json)
            .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))?;
        log::debug!("Progress written to LocalStorage");
        Ok(())
    }
}

/// JSON file on disk (native only). Writes go through a temp file and a rename.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, json: &str) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
