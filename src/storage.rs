//! Key/Value Storage
//!
//! Thin abstraction over `localStorage` / `sessionStorage` so the session
//! layer can run against an in-memory map in tests.

use std::cell::RefCell;
use std::collections::HashMap;

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Which Web Storage area to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Session,
}

/// `window.localStorage` / `window.sessionStorage`
///
/// Every call re-resolves the storage object; browsers may refuse access
/// (private mode, sandboxed iframes) and in that case reads return `None`
/// and writes are dropped.
pub struct BrowserStorage {
    area: StorageArea,
}

impl BrowserStorage {
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        let storage = match self.area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        };
        storage.ok().flatten()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(storage) = self.storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("[STORAGE] write refused for key {}", key);
            }
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// In-memory store (tests, and fallback when no window is available)
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}
