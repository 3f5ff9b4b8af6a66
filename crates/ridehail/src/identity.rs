//! Passenger and driver accounts, and the logged-in session.
//!
//! Credentials are compared as stored, in plaintext. A failed login never
//! says whether the email or the password was wrong.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Driver, Passenger, User, UserType};
use crate::store::{collections, Collection, KeyValueStore, CURRENT_USER_KEY};

/// Registration, login and session handling over a shared store.
#[derive(Debug)]
pub struct IdentityService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> IdentityService<'a, S> {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Register a user in the collection of its type.
    ///
    /// The user type is carried by the [`User`] variant itself, so there is
    /// no separate type argument: a [`User::Passenger`] goes to `passengers`
    /// and a [`User::Driver`] to `drivers`.
    ///
    /// Returns `false` without writing anything if the email is already
    /// taken in that collection. The same email may exist once as a
    /// passenger and once as a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn register(&self, user: &User) -> Result<bool> {
        let collection = Collection::for_user_type(user.user_type());
        let mut users: Vec<User> = collections::load(self.store, collection)?;
        if users.iter().any(|u| u.email() == user.email()) {
            debug!("Registration refused: email already in {}", collection);
            return Ok(false);
        }
        users.push(user.clone());
        collections::save(self.store, collection, &users)?;
        info!("Registered new account in {}", collection);
        Ok(true)
    }

    /// Find the user of the given type whose email and password both match
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn login(&self, email: &str, password: &str, user_type: UserType) -> Result<Option<User>> {
        let users: Vec<User> = collections::load(self.store, Collection::for_user_type(user_type))?;
        let user = users
            .into_iter()
            .find(|u| u.email() == email && u.password() == password);
        if user.is_none() {
            debug!("Login failed for {} account", user_type);
        }
        Ok(user)
    }

    /// All registered passengers, in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn passengers(&self) -> Result<Vec<Passenger>> {
        collections::load(self.store, Collection::Passengers)
    }

    /// All registered drivers, in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn drivers(&self) -> Result<Vec<Driver>> {
        collections::load(self.store, Collection::Drivers)
    }

    /// Look up a passenger by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn find_passenger(&self, id: &str) -> Result<Option<Passenger>> {
        Ok(self.passengers()?.into_iter().find(|p| p.id == id))
    }

    /// Look up a driver by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn find_driver(&self, id: &str) -> Result<Option<Driver>> {
        Ok(self.drivers()?.into_iter().find(|d| d.id == id))
    }

    /// Mark a driver as taking rides or not. Returns `false` if no driver
    /// has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn set_driver_availability(&self, driver_id: &str, available: bool) -> Result<bool> {
        let mut drivers = self.drivers()?;
        let Some(driver) = drivers.iter_mut().find(|d| d.id == driver_id) else {
            return Ok(false);
        };
        driver.availability = available;
        collections::save(self.store, Collection::Drivers, &drivers)?;
        info!("Driver {} availability set to {}", driver_id, available);

        // Keep the session copy in step when the driver is the one logged in.
        if let Some(User::Driver(mut current)) = self.current_user()? {
            if current.id == driver_id {
                current.availability = available;
                self.set_current_user(&User::Driver(current))?;
            }
        }
        Ok(true)
    }

    /// Record `user` as the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_current_user(&self, user: &User) -> Result<()> {
        let raw = serde_json::to_string(user)?;
        self.store.set(CURRENT_USER_KEY, &raw)
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the entry is corrupt.
    pub fn current_user(&self) -> Result<Option<User>> {
        match self.store.get(CURRENT_USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// The logged-in passenger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session and
    /// [`Error::WrongUserType`] when a driver is logged in.
    pub fn require_passenger(&self) -> Result<Passenger> {
        match self.current_user()? {
            Some(User::Passenger(p)) => Ok(p),
            Some(User::Driver(_)) => Err(Error::WrongUserType {
                expected: UserType::Passenger,
            }),
            None => Err(Error::NotLoggedIn),
        }
    }

    /// The logged-in driver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLoggedIn`] without a session and
    /// [`Error::WrongUserType`] when a passenger is logged in.
    pub fn require_driver(&self) -> Result<Driver> {
        match self.current_user()? {
            Some(User::Driver(d)) => Ok(d),
            Some(User::Passenger(_)) => Err(Error::WrongUserType {
                expected: UserType::Driver,
            }),
            None => Err(Error::NotLoggedIn),
        }
    }

    /// End the session. Returns whether anyone was logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&self) -> Result<bool> {
        self.store.remove(CURRENT_USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, VehicleType};
    use crate::store::MemoryStore;

    fn passenger(email: &str) -> User {
        Passenger::new("Ayesha Khan", Gender::Female, email, "pass123").into()
    }

    fn driver(email: &str) -> User {
        Driver::new(
            "Fatima Noor",
            Gender::Female,
            VehicleType::Bike,
            email,
            "pass123",
        )
        .into()
    }

    #[test]
    fn test_register_new_user() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);

        assert!(identity.register(&passenger("ayesha@example.com")).unwrap());
        assert_eq!(identity.passengers().unwrap().len(), 1);
        assert!(identity.drivers().unwrap().is_empty());
    }

    #[test]
    fn test_register_routes_by_variant_and_keeps_record_shape() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        identity.register(&passenger("ayesha@example.com")).unwrap();
        identity.register(&driver("fatima@example.com")).unwrap();

        let passengers: Vec<serde_json::Value> =
            serde_json::from_str(&store.get("passengers").unwrap().unwrap()).unwrap();
        let drivers: Vec<serde_json::Value> =
            serde_json::from_str(&store.get("drivers").unwrap().unwrap()).unwrap();

        assert_eq!(passengers.len(), 1);
        assert!(passengers[0].get("vehicleType").is_none());
        assert_eq!(passengers[0]["email"], "ayesha@example.com");
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0]["vehicleType"], "Bike");
        assert_eq!(identity.drivers().unwrap()[0].email, "fatima@example.com");
    }

    #[test]
    fn test_duplicate_email_same_type_refused() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        let first = passenger("ayesha@example.com");
        let second: User =
            Passenger::new("Someone Else", Gender::Male, "ayesha@example.com", "other").into();

        assert!(identity.register(&first).unwrap());
        assert!(!identity.register(&second).unwrap());

        let stored = identity.passengers().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(Some(&stored[0]), first.as_passenger());
    }

    #[test]
    fn test_duplicate_refusal_leaves_store_untouched() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        identity.register(&driver("fatima@example.com")).unwrap();
        let before = store.get("drivers").unwrap();

        assert!(!identity.register(&driver("fatima@example.com")).unwrap());
        assert_eq!(store.get("drivers").unwrap(), before);
    }

    #[test]
    fn test_same_email_across_types_allowed() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);

        assert!(identity.register(&passenger("shared@example.com")).unwrap());
        assert!(identity.register(&driver("shared@example.com")).unwrap());
    }

    #[test]
    fn test_login_exact_match() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        let user = passenger("ayesha@example.com");
        identity.register(&user).unwrap();

        let found = identity
            .login("ayesha@example.com", "pass123", UserType::Passenger)
            .unwrap();
        assert_eq!(found, Some(user));
    }

    #[test]
    fn test_login_mismatch_returns_none() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        identity.register(&passenger("ayesha@example.com")).unwrap();

        for (email, password) in [
            ("ayesha@example.com", "wrong"),
            ("nobody@example.com", "pass123"),
            ("AYESHA@example.com", "pass123"),
            ("ayesha@example.com", "pass123 "),
        ] {
            assert!(identity
                .login(email, password, UserType::Passenger)
                .unwrap()
                .is_none());
        }
    }

    #[test]
    fn test_login_checks_only_the_named_collection() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        identity.register(&passenger("ayesha@example.com")).unwrap();

        assert!(identity
            .login("ayesha@example.com", "pass123", UserType::Driver)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_login_empty_store() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);

        assert!(identity
            .login("a@b", "c", UserType::Passenger)
            .unwrap()
            .is_none());
        assert!(identity.login("a@b", "c", UserType::Driver).unwrap().is_none());
    }

    #[test]
    fn test_login_returns_driver_record() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        identity.register(&driver("fatima@example.com")).unwrap();

        let found = identity
            .login("fatima@example.com", "pass123", UserType::Driver)
            .unwrap()
            .unwrap();
        let d = found.as_driver().unwrap();
        assert_eq!(d.vehicle_type, VehicleType::Bike);
        assert!(d.availability);
    }

    #[test]
    fn test_find_by_id() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        let p = passenger("a@example.com");
        let d = driver("d@example.com");
        identity.register(&p).unwrap();
        identity.register(&d).unwrap();

        assert!(identity.find_passenger(p.id()).unwrap().is_some());
        assert!(identity.find_driver(d.id()).unwrap().is_some());
        assert!(identity.find_passenger(d.id()).unwrap().is_none());
        assert!(identity.find_driver("missing").unwrap().is_none());
    }

    #[test]
    fn test_session_round_trip() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        let user = driver("fatima@example.com");

        assert!(identity.current_user().unwrap().is_none());
        identity.set_current_user(&user).unwrap();
        assert_eq!(identity.current_user().unwrap(), Some(user));

        assert!(identity.logout().unwrap());
        assert!(!identity.logout().unwrap());
        assert!(identity.current_user().unwrap().is_none());
    }

    #[test]
    fn test_require_role() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);

        assert!(matches!(
            identity.require_passenger(),
            Err(Error::NotLoggedIn)
        ));

        identity.set_current_user(&driver("d@example.com")).unwrap();
        assert!(identity.require_driver().is_ok());
        assert!(matches!(
            identity.require_passenger(),
            Err(Error::WrongUserType {
                expected: UserType::Passenger
            })
        ));

        identity.set_current_user(&passenger("p@example.com")).unwrap();
        assert!(identity.require_passenger().is_ok());
        assert!(identity.require_driver().is_err());
    }

    #[test]
    fn test_set_driver_availability() {
        let store = MemoryStore::new();
        let identity = IdentityService::new(&store);
        let user = driver("fatima@example.com");
        identity.register(&user).unwrap();
        identity.set_current_user(&user).unwrap();

        assert!(identity.set_driver_availability(user.id(), false).unwrap());
        assert!(!identity.find_driver(user.id()).unwrap().unwrap().availability);
        assert!(!identity.require_driver().unwrap().availability);

        assert!(!identity.set_driver_availability("missing", true).unwrap());
    }
}
