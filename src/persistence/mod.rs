//! Small persisted flags
//!
//! The upload gate must survive a page reload but not a fresh browser session,
//! which is exactly sessionStorage. Native builds and tests keep flags in memory.

use std::collections::HashMap;

/// Boolean key/value storage
pub trait FlagStore {
    fn load(&self, key: &str) -> Option<bool>;
    fn store(&mut self, key: &str, value: bool);
    fn remove(&mut self, key: &str);
}

/// In-memory store (native, tests)
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: HashMap<String, bool>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn load(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }

    fn store(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.flags.remove(key);
    }
}

/// `window.sessionStorage`, flags stored as `"true"` / `"false"`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionFlagStore;

#[cfg(target_arch = "wasm32")]
impl SessionFlagStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl FlagStore for SessionFlagStore {
    fn load(&self, key: &str) -> Option<bool> {
        let value = Self::storage()?.get_item(key).ok()??;
        Some(value == "true")
    }

    fn store(&mut self, key: &str, value: bool) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, if value { "true" } else { "false" }).is_err() {
                log::warn!("sessionStorage write failed for {}", key);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
