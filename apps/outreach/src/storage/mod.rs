//! Durable key-value storage for the few values that outlive a session.
//!
//! `open_store` picks the file-backed store when its directory can be
//! created and falls back to an in-memory map otherwise.

pub mod file;
pub mod memory;
pub mod personal_info;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

pub use file::FileStore;
pub use memory::MemoryStore;
pub use personal_info::{PersonalInfoStore, PERSONAL_INFO_KEY};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Minimal string-to-string store. Values are opaque to the store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Selects the store implementation once at startup.
pub fn open_store(path: Option<PathBuf>) -> Arc<dyn KeyValueStore> {
    let Some(path) = path else {
        warn!("No data directory available; personal info will not survive restarts");
        return Arc::new(MemoryStore::default());
    };

    match FileStore::open(&path) {
        Ok(store) => {
            info!("Using file store at {}", path.display());
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                "File store at {} unavailable ({e}); falling back to in-memory storage",
                path.display()
            );
            Arc::new(MemoryStore::default())
        }
    }
}
