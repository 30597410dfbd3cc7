use crate::describe_js;
use codex_sidebar_core::KeyValueStore;
use codex_sidebar_core::StoreError;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::DomException;
use web_sys::Storage;
use web_sys::Window;

/// The page's `localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Fails when storage is disabled or the frame is sandboxed.
    pub fn from_window(window: &Window) -> Result<Self, StoreError> {
        let storage = window
            .local_storage()
            .map_err(|err| StoreError::unavailable(describe_js(&err)))?
            .ok_or_else(|| StoreError::unavailable("localStorage is disabled"))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage
            .get_item(key)
            .map_err(|err| StoreError::rejected("get", key, describe_js(&err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| write_error(key, &err))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage
            .remove_item(key)
            .map_err(|err| StoreError::rejected("remove", key, describe_js(&err)))
    }
}

fn write_error(key: &str, err: &JsValue) -> StoreError {
    let quota = err
        .dyn_ref::<DomException>()
        .is_some_and(|exception| exception.name() == "QuotaExceededError");
    if quota {
        StoreError::QuotaExceeded {
            key: key.to_string(),
        }
    } else {
        StoreError::rejected("set", key, describe_js(err))
    }
}
