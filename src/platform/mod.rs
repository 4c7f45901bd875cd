//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, a file natively)
//! - The JS-facing game handle (web only)

pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use storage::STORAGE_KEY;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
#[cfg(target_arch = "wasm32")]
pub use web::WebGame;
