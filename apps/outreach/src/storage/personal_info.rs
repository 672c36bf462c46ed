use std::sync::Arc;

use tracing::warn;

use super::{KeyValueStore, StorageError};
use crate::models::PersonalInfo;

/// Fixed slot holding the serialized PersonalInfo across sessions.
pub const PERSONAL_INFO_KEY: &str = "outreach-ai-personal-info";

/// Typed view over the PersonalInfo slot. Written on every submission,
/// read once at startup, never deleted.
#[derive(Clone)]
pub struct PersonalInfoStore {
    store: Arc<dyn KeyValueStore>,
}

impl PersonalInfoStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the saved info, or `None` when nothing usable is stored.
    /// Read and decode failures are logged and treated as an empty slot so
    /// the form starts blank instead of blocking the wizard.
    pub fn load(&self) -> Option<PersonalInfo> {
        let raw = match self.store.get(PERSONAL_INFO_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Error reading stored personal info: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Stored personal info is not valid JSON, ignoring it: {e}");
                None
            }
        }
    }

    pub fn save(&self, info: &PersonalInfo) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(info)?;
        self.store.set(PERSONAL_INFO_KEY, &serialized)
    }
}
