//! Core record types for ridehail.
//!
//! The serialized shape of these types is the persisted layout: camelCase
//! field names, optional fields omitted when absent, and the status
//! `InProgress` written as `"In Progress"`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gender of a user, also used as a ride's driver preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Kind of vehicle a driver operates and a ride requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    /// Motorbike.
    Bike,
    /// Car.
    Car,
    /// Auto rickshaw.
    Rickshaw,
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bike => write!(f, "Bike"),
            Self::Car => write!(f, "Car"),
            Self::Rickshaw => write!(f, "Rickshaw"),
        }
    }
}

/// Lifecycle status of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideStatus {
    /// Waiting for a driver.
    Requested,
    /// A driver has taken the ride.
    Accepted,
    /// The passenger has been picked up.
    #[serde(rename = "In Progress")]
    InProgress,
    /// The ride is over.
    Completed,
    /// Never produced by any operation; kept so stored data using it still loads.
    Cancelled,
}

impl RideStatus {
    /// Whether a ride in this status may move to `next`.
    ///
    /// `Requested -> Requested` is a driver rejecting the offer.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Requested | Self::Accepted)
                | (Self::Accepted, Self::InProgress)
                | (Self::InProgress, Self::Completed)
        )
    }

    /// Whether this status means a driver is currently carrying the ride.
    #[must_use]
    pub fn is_assigned(self) -> bool {
        matches!(self, Self::Accepted | Self::InProgress)
    }
}

impl std::fmt::Display for RideStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requested => write!(f, "Requested"),
            Self::Accepted => write!(f, "Accepted"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Which identity collection a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Rider.
    Passenger,
    /// Vehicle operator.
    Driver,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passenger => write!(f, "passenger"),
            Self::Driver => write!(f, "driver"),
        }
    }
}

/// A registered passenger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Opaque unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
    /// Login email, unique among passengers.
    pub email: String,
    /// Login password, stored as given.
    pub password: String,
}

impl Passenger {
    /// Create a passenger with a freshly generated id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        gender: Gender,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            gender,
            email: email.into(),
            password: password.into(),
        }
    }
}

/// A registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Opaque unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
    /// The vehicle this driver operates.
    pub vehicle_type: VehicleType,
    /// Whether the driver is taking rides.
    pub availability: bool,
    /// Login email, unique among drivers.
    pub email: String,
    /// Login password, stored as given.
    pub password: String,
}

impl Driver {
    /// Create an available driver with a freshly generated id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        gender: Gender,
        vehicle_type: VehicleType,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            gender,
            vehicle_type,
            availability: true,
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Either kind of user.
///
/// Serialized without a tag, so a stored user record looks the same whether
/// it sits in its collection or in the session entry. `Driver` is tried first
/// because a driver record also satisfies the passenger shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum User {
    /// A driver account.
    Driver(Driver),
    /// A passenger account.
    Passenger(Passenger),
}

impl User {
    /// The collection this user belongs to.
    #[must_use]
    pub fn user_type(&self) -> UserType {
        match self {
            Self::Passenger(_) => UserType::Passenger,
            Self::Driver(_) => UserType::Driver,
        }
    }

    /// The user's id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Passenger(p) => &p.id,
            Self::Driver(d) => &d.id,
        }
    }

    /// The user's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Passenger(p) => &p.name,
            Self::Driver(d) => &d.name,
        }
    }

    /// The user's login email.
    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Passenger(p) => &p.email,
            Self::Driver(d) => &d.email,
        }
    }

    /// The user's password.
    #[must_use]
    pub fn password(&self) -> &str {
        match self {
            Self::Passenger(p) => &p.password,
            Self::Driver(d) => &d.password,
        }
    }

    /// The passenger record, if this is a passenger.
    #[must_use]
    pub fn as_passenger(&self) -> Option<&Passenger> {
        match self {
            Self::Passenger(p) => Some(p),
            Self::Driver(_) => None,
        }
    }

    /// The driver record, if this is a driver.
    #[must_use]
    pub fn as_driver(&self) -> Option<&Driver> {
        match self {
            Self::Driver(d) => Some(d),
            Self::Passenger(_) => None,
        }
    }
}

impl From<Passenger> for User {
    fn from(passenger: Passenger) -> Self {
        Self::Passenger(passenger)
    }
}

impl From<Driver> for User {
    fn from(driver: Driver) -> Self {
        Self::Driver(driver)
    }
}

/// A ride as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    /// Opaque unique id.
    pub id: String,
    /// The requesting passenger.
    pub passenger_id: String,
    /// The driver carrying the ride, once one accepted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    /// Free-text pickup location.
    pub pickup: String,
    /// Free-text destination.
    pub drop: String,
    /// Vehicle the passenger asked for.
    pub ride_type: VehicleType,
    /// Restricts offers to drivers of this gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_driver_gender: Option<Gender>,
    /// Lifecycle status.
    pub status: RideStatus,
}

impl Ride {
    /// Whether a driver with the given vehicle and gender may be offered
    /// this ride while it is still open.
    #[must_use]
    pub fn matches_driver(&self, vehicle_type: VehicleType, gender: Gender) -> bool {
        self.ride_type == vehicle_type
            && self.preferred_driver_gender.map_or(true, |g| g == gender)
    }

    /// Whether the given driver is assigned to this ride.
    #[must_use]
    pub fn is_assigned_to(&self, driver_id: &str) -> bool {
        self.driver_id.as_deref() == Some(driver_id)
    }
}

/// What a passenger fills in to request a ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRide {
    /// Free-text pickup location.
    pub pickup: String,
    /// Free-text destination.
    pub drop: String,
    /// Vehicle wanted.
    pub ride_type: VehicleType,
    /// Optional driver gender restriction.
    pub preferred_driver_gender: Option<Gender>,
}

impl NewRide {
    /// Build the stored ride for this request, in status `Requested` with
    /// no driver and a fresh id.
    #[must_use]
    pub fn into_ride(self, passenger_id: impl Into<String>) -> Ride {
        Ride {
            id: new_id(),
            passenger_id: passenger_id.into(),
            driver_id: None,
            pickup: self.pickup,
            drop: self.drop,
            ride_type: self.ride_type,
            preferred_driver_gender: self.preferred_driver_gender,
            status: RideStatus::Requested,
        }
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
