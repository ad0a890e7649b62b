//! In-memory implementation of [`RecoveryStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests, ephemeral editing
//! sessions, and anywhere durability isn't needed. An optional byte quota
//! reproduces the "quota exceeded" failure of browser storage.

use std::collections::HashMap;

use crate::error::StorageError;
use crate::traits::RecoveryStore;

/// In-memory implementation of [`RecoveryStore`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: HashMap<String, String>,
    /// Maximum total bytes of keys plus values, if limited.
    quota: Option<usize>,
}

impl InMemoryStore {
    /// Creates a new empty, unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes pushing it past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        InMemoryStore {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes used if `key` held `value` instead of its current value.
    fn usage_with(&self, key: &str, value: &str) -> usize {
        let others: usize = self
            .entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        others + key.len() + value.len()
    }
}

impl RecoveryStore for InMemoryStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.usage_with(key, value);
            if needed > quota {
                return Err(StorageError::Unavailable {
                    reason: format!("quota exceeded: {} of {} bytes", needed, quota),
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }
}
