//! `SQLite`-backed persistent key/value store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::{migrations, KeyValueStore};

const MEMORY_PATH: &str = ":memory:";

/// Persistent store keeping each key as one row of the `entries` table.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the stored keys in name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let (total_entries, payload_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM entries ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let last_updated = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_entries,
            payload_bytes,
            last_updated,
            db_size_bytes,
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let updated_at = Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, updated_at],
        )?;
        debug!("Wrote {} bytes under {}", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM entries", [])?;
        if affected > 0 {
            info!("Cleared {} entries", affected);
        }
        Ok(affected)
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of keys stored.
    pub total_entries: i64,
    /// Total size of the stored documents in bytes.
    pub payload_bytes: i64,
    /// When any key was last written.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("failed to create test store")
    }

    fn cleanup(path: &Path) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[test]
    fn test_open_in_memory() {
        assert!(SqliteStore::open_in_memory().is_ok());
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("rides", r#"[{"id":"r-1"}]"#).unwrap();

        assert_eq!(
            store.get("rides").unwrap().as_deref(),
            Some(r#"[{"id":"r-1"}]"#)
        );
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert!(store.get("passengers").unwrap().is_none());
    }

    #[test]
    fn test_set_replaces_whole_value() {
        let store = create_test_store();
        store.set("drivers", "[1,2,3]").unwrap();
        store.set("drivers", "[]").unwrap();

        assert_eq!(store.get("drivers").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.keys().unwrap(), vec!["drivers".to_string()]);
    }

    #[test]
    fn test_remove() {
        let store = create_test_store();
        store.set("currentUser", "{}").unwrap();

        assert!(store.remove("currentUser").unwrap());
        assert!(!store.remove("currentUser").unwrap());
    }

    #[test]
    fn test_clear() {
        let store = create_test_store();
        store.set("passengers", "[]").unwrap();
        store.set("rides", "[]").unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_keys_sorted() {
        let store = create_test_store();
        store.set("rides", "[]").unwrap();
        store.set("drivers", "[]").unwrap();
        store.set("passengers", "[]").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["drivers", "passengers", "rides"]
        );
    }

    #[test]
    fn test_unicode_value() {
        let store = create_test_store();
        let value = r#"[{"pickup":"مال روڈ"}]"#;
        store.set("rides", value).unwrap();

        assert_eq!(store.get("rides").unwrap().as_deref(), Some(value));
    }

    #[test]
    fn test_stats_empty() {
        let store = create_test_store();
        let stats = store.stats().unwrap();

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.payload_bytes, 0);
        assert!(stats.last_updated.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let store = create_test_store();
        store.set("rides", "[]").unwrap();
        store.set("drivers", "[1]").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.payload_bytes, 5);
        assert!(stats.last_updated.is_some());
    }

    #[test]
    fn test_path() {
        let store = create_test_store();
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_file_based_survives_reopen() {
        let db_path =
            std::env::temp_dir().join(format!("ridehail_test_{}.db", std::process::id()));
        cleanup(&db_path);

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set("passengers", r#"[{"id":"p-1"}]"#).unwrap();
            assert_eq!(store.path(), db_path);
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            store.get("passengers").unwrap().as_deref(),
            Some(r#"[{"id":"p-1"}]"#)
        );
        assert!(store.stats().unwrap().db_size_bytes > 0);

        drop(store);
        cleanup(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!("ridehail_test_{}", std::process::id()));
        let nested_path = root.join("nested/store.db");
        let _ = std::fs::remove_dir_all(&root);

        let store = SqliteStore::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(store);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_stats_debug_and_clone() {
        let stats = StoreStats {
            total_entries: 3,
            payload_bytes: 120,
            last_updated: None,
            db_size_bytes: 4096,
        };
        let cloned = stats.clone();
        assert_eq!(stats, cloned);
        assert!(format!("{stats:?}").contains("total_entries"));
    }
}
