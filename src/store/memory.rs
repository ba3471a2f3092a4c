use std::collections::HashMap;

use parking_lot::RwLock;

use super::{PreferenceStore, SecretStore};
use crate::error::ClientResult;

/// Process-local store; nothing survives a restart. Used by tests and embedders
/// that keep credentials elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    pub fn contains(&self, key: &str) -> bool { self.entries.read().contains_key(key) }
}

impl SecretStore for MemoryStore {
    fn get_secret(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set_secret(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_secret(&self, key: &str) -> ClientResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn set_secrets(&self, entries: &[(&str, &str)]) -> ClientResult<()> {
        let mut map = self.entries.write();
        for (k, v) in entries {
            map.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get_preference(&self, key: &str) -> ClientResult<Option<String>> {
        self.get_secret(key)
    }

    fn set_preference(&self, key: &str, value: &str) -> ClientResult<()> {
        self.set_secret(key, value)
    }

    fn remove_preference(&self, key: &str) -> ClientResult<()> {
        self.delete_secret(key)
    }
}
