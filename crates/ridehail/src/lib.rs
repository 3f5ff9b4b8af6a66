//! `ridehail` - passenger and driver accounts, ride requests and driver matching
//!
//! State lives in a flat key/value store ([`store::KeyValueStore`]) holding the
//! `passengers`, `drivers` and `rides` collections plus the logged-in user.
//! [`RideHailing`] ties a store to a [`Config`] and hands out the
//! [`IdentityService`] and [`RideService`] that operate on it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod rides;
pub mod seed;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use identity::IdentityService;
pub use logging::init_logging;
pub use model::{Driver, Gender, NewRide, Passenger, Ride, RideStatus, User, UserType, VehicleType};
pub use rides::{PassengerRides, RideOptions, RideService};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};

/// A store together with the configuration its services run under.
#[derive(Debug)]
pub struct RideHailing<S> {
    store: S,
    config: Config,
}

impl<S: KeyValueStore> RideHailing<S> {
    /// Wrap `store` with `config`.
    #[must_use]
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Account and session operations.
    #[must_use]
    pub fn identity(&self) -> IdentityService<'_, S> {
        IdentityService::new(&self.store)
    }

    /// Ride operations, with the configured matching and lifecycle rules.
    #[must_use]
    pub fn rides(&self) -> RideService<'_, S> {
        RideService::new(&self.store, RideOptions::from(&self.config))
    }

    /// Seed demo data if the configuration asks for it and the store is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn seed_if_enabled(&self) -> Result<bool> {
        if self.config.seed.demo_data {
            seed::seed_demo_data(&self.store)
        } else {
            Ok(false)
        }
    }

    /// Remove every collection and the session. Returns how many keys were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn reset(&self) -> Result<usize> {
        self.store.clear()
    }
}

impl RideHailing<SqliteStore> {
    /// Open the database named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: Config) -> Result<Self> {
        let store = SqliteStore::open(config.database_path())?;
        Ok(Self::new(store, config))
    }
}
