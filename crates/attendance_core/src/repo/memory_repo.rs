//! In-process adapter for tests and hosts without a filesystem.

use crate::repo::kv_repo::{PersistError, PersistResult, PersistenceAdapter, StorageKey};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// Stores serialized JSON text per key, like browser local storage.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    entries: RefCell<HashMap<StorageKey, String>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw stored text under `key`.
    pub fn raw(&self, key: StorageKey) -> Option<String> {
        self.entries.borrow().get(&key).cloned()
    }

    /// Overwrites the raw stored text under `key`, bypassing JSON encoding.
    pub fn put_raw(&self, key: StorageKey, text: impl Into<String>) {
        self.entries.borrow_mut().insert(key, text.into());
    }
}

impl PersistenceAdapter for MemoryKvRepository {
    fn load(&self, key: StorageKey) -> PersistResult<Option<Value>> {
        match self.entries.borrow().get(&key) {
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|err| PersistError::InvalidData {
                    key,
                    message: err.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn save(&self, key: StorageKey, value: &Value) -> PersistResult<()> {
        let text = serde_json::to_string(value)?;
        self.entries.borrow_mut().insert(key, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvRepository;
    use crate::repo::kv_repo::{PersistError, PersistenceAdapter, StorageKey};
    use serde_json::json;

    #[test]
    fn save_then_load_returns_value() {
        let repo = MemoryKvRepository::new();
        assert!(repo.load(StorageKey::Subjects).unwrap().is_none());

        repo.save(StorageKey::Subjects, &json!([{"name": "Math"}]))
            .unwrap();
        let loaded = repo.load(StorageKey::Subjects).unwrap().unwrap();
        assert_eq!(loaded[0]["name"], "Math");
        assert!(repo.load(StorageKey::Attendance).unwrap().is_none());
    }

    #[test]
    fn corrupt_text_is_reported() {
        let repo = MemoryKvRepository::new();
        repo.put_raw(StorageKey::Settings, "{not json");
        let err = repo.load(StorageKey::Settings).unwrap_err();
        assert!(matches!(
            err,
            PersistError::InvalidData {
                key: StorageKey::Settings,
                ..
            }
        ));
    }
}
