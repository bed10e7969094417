//! Browser-backed storage and time

use quiz_core::{Clock, KeyValue, StoreError, StoreResult};

/// `window.localStorage`, looked up on every call.
///
/// `KeyValue` requires `Send + Sync`, so the `Storage` handle is never stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageKv;

impl LocalStorageKv {
    fn storage(&self) -> StoreResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))
    }
}

impl KeyValue for LocalStorageKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Io(format!("{e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        // quota errors surface here
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Io(format!("{e:?}")))
    }

    fn is_available(&self) -> bool {
        self.storage().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "LocalStorage"
    }
}

/// `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
