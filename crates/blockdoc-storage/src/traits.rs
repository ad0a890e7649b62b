//! The [`RecoveryStore`] trait defining the durable key/value contract.
//!
//! The contract mirrors browser local storage: string keys, string values,
//! last write wins. Backends ([`InMemoryStore`](crate::InMemoryStore),
//! [`SqliteStore`](crate::SqliteStore)) are fully swappable; record encoding
//! lives in [`codec`](crate::codec) so no backend repeats it.

use crate::error::StorageError;

/// Durable string key/value storage.
///
/// The trait is synchronous: the editor is single-threaded and every write
/// is a small local operation.
pub trait RecoveryStore {
    /// Stores `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Reads the value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Deletes `key`. Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
}

impl<S: RecoveryStore + ?Sized> RecoveryStore for Box<S> {
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}
