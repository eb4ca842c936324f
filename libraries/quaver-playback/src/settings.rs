//! Key-value settings persistence seam
//!
//! The player persists a handful of small values (crossfade duration,
//! volume, mute flag, playback speed) through whatever key-value storage
//! the embedding application has. The trait is deliberately infallible:
//! storage trouble degrades to defaults, it never becomes an error the
//! playback core has to handle.

use std::collections::HashMap;
use std::sync::Mutex;

/// Abstraction over the embedder's key-value settings storage
///
/// Implementations should swallow their own failures and answer `None` /
/// do nothing, matching the degrade-to-defaults policy of the player.
pub trait SettingsStore: Send + Sync {
    /// Read a previously stored value, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);
}

/// In-memory settings store
///
/// The default store: keeps values for the process lifetime only. Useful
/// for tests and for embedders that have no persistence.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}
