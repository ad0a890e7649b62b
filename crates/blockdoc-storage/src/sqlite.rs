//! SQLite implementation of [`RecoveryStore`].
//!
//! [`SqliteStore`] keeps the recovery area in a single `local_storage`
//! table with WAL mode and automatic schema migrations. Every write is a
//! single-row upsert, so a record is either fully replaced or untouched.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::traits::RecoveryStore;

/// SQLite-backed implementation of [`RecoveryStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    /// RFC 3339 timestamp of the last write to `key`.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        let updated = self
            .conn
            .query_row(
                "SELECT updated_at FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated)
    }
}

impl RecoveryStore for SqliteStore {
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let rows = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_value() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.write("k", "first").unwrap();
        store.write("k", "second").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("second"));
        assert!(store.updated_at("k").unwrap().is_some());
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(!store.remove("missing").unwrap());
        store.write("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert_eq!(store.read("k").unwrap(), None);
        assert_eq!(store.updated_at("k").unwrap(), None);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recovery.db");
        let path = path.to_str().unwrap();

        {
            let mut store = SqliteStore::new(path).unwrap();
            store.write("k", "persisted").unwrap();
        }

        let store = SqliteStore::new(path).unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("persisted"));
    }
}
