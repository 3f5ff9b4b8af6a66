//! Typed access to the named collections.
//!
//! A collection is a JSON array stored under one key. A missing key reads as
//! an empty collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::error::Result;
use crate::model::UserType;

use super::KeyValueStore;

/// Key of the logged-in user's record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// The three collections kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Registered passengers.
    Passengers,
    /// Registered drivers.
    Drivers,
    /// Every ride ever requested.
    Rides,
}

impl Collection {
    /// All collections, in the order they are reported.
    pub const ALL: [Self; 3] = [Self::Passengers, Self::Drivers, Self::Rides];

    /// The store key holding this collection.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Passengers => "passengers",
            Self::Drivers => "drivers",
            Self::Rides => "rides",
        }
    }

    /// The identity collection for a user type.
    #[must_use]
    pub const fn for_user_type(user_type: UserType) -> Self {
        match user_type {
            UserType::Passenger => Self::Passengers,
            UserType::Driver => Self::Drivers,
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Read a whole collection.
///
/// # Errors
///
/// Returns an error if the store fails or the stored document is not a
/// JSON array of `T`.
pub fn load<T, S>(store: &S, collection: Collection) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(collection.key())? {
        Some(raw) => {
            let items: Vec<T> = serde_json::from_str(&raw)?;
            trace!("Loaded {} records from {}", items.len(), collection);
            Ok(items)
        }
        None => Ok(Vec::new()),
    }
}

/// Replace a whole collection.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save<T, S>(store: &S, collection: Collection, items: &[T]) -> Result<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(items)?;
    store.set(collection.key(), &raw)?;
    trace!("Saved {} records to {}", items.len(), collection);
    Ok(())
}

/// Whether a collection holds no records.
///
/// # Errors
///
/// Returns an error if the store fails or the document is not a JSON array.
pub fn is_empty<S>(store: &S, collection: Collection) -> Result<bool>
where
    S: KeyValueStore + ?Sized,
{
    Ok(load::<serde_json::Value, S>(store, collection)?.is_empty())
}
