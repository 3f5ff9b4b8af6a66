//! Storage layer for ridehail.
//!
//! Everything the services persist goes through [`KeyValueStore`]: a flat map
//! from a top-level key to a JSON document. Every read and write moves a whole
//! document; there is no partial access and no cross-key atomicity.

pub mod collections;
pub mod migrations;
pub mod schema;
mod sqlite;

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::Result;

pub use collections::{Collection, CURRENT_USER_KEY};
pub use sqlite::{SqliteStore, StoreStats};

/// A flat key/value store holding JSON documents.
///
/// Implementations take `&self` on writes; the services that share a store
/// only ever hold shared references to it.
pub trait KeyValueStore {
    /// Read the document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Remove every key. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn clear(&self) -> Result<usize>;
}

/// In-process store backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.borrow_mut();
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}
