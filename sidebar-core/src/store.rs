use crate::category::Category;
use crate::config::StorageKeys;
use crate::error::StoreError;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;
use tracing::warn;

/// String-valued durable storage, e.g. the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Best-effort persistence of the selection and favorites.
///
/// Nothing here returns an error: backend failures are logged and the
/// caller keeps its in-memory state.
#[derive(Clone)]
pub struct PersistenceStore {
    backend: Rc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PersistenceStore {
    pub fn new(backend: Rc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    /// Absent or blank means no selection.
    pub fn load_selection(&self) -> Option<Category> {
        match self.backend.get(&self.keys.selection) {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(Category::new(raw)),
            Ok(_) => None,
            Err(err) => {
                warn!(key = %self.keys.selection, error = %err, "failed to load selection");
                None
            }
        }
    }

    pub fn save_selection(&self, selection: Option<&Category>) {
        let result = match selection {
            Some(category) => self.backend.set(&self.keys.selection, category.as_str()),
            None => self.backend.remove(&self.keys.selection),
        };
        if let Err(err) = result {
            warn!(key = %self.keys.selection, error = %err, "failed to persist selection");
        }
    }

    /// A JSON array of strings. Anything else, including non-string array
    /// elements, is dropped.
    pub fn load_favorites(&self) -> BTreeSet<Category> {
        let raw = match self.backend.get(&self.keys.favorites) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(err) => {
                warn!(key = %self.keys.favorites, error = %err, "failed to load favorites");
                return BTreeSet::new();
            }
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(values) => values
                .into_iter()
                .filter_map(|value| match value {
                    serde_json::Value::String(label) => Some(Category::new(label)),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                debug!(key = %self.keys.favorites, error = %err, "ignoring malformed favorites");
                BTreeSet::new()
            }
        }
    }

    pub fn save_favorites(&self, favorites: &BTreeSet<Category>) {
        let encoded = match serde_json::to_string(favorites) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to encode favorites");
                return;
            }
        };
        if let Err(err) = self.backend.set(&self.keys.favorites, &encoded) {
            warn!(key = %self.keys.favorites, error = %err, "failed to persist favorites");
        }
    }
}
