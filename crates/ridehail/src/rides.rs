//! Ride requests, driver matching and the ride lifecycle.
//!
//! Every operation loads the whole `rides` collection, works on it in memory
//! and writes it back in one piece. Two actors updating the same ride simply
//! run one after the other; the later write wins.

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::IdentityService;
use crate::model::{Driver, Gender, NewRide, Ride, RideStatus, VehicleType};
use crate::store::{collections, Collection, KeyValueStore};

/// Behaviour switches for [`RideService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideOptions {
    /// Hide open requests from drivers whose availability flag is off.
    pub respect_driver_availability: bool,
    /// Drop the ride's driver id when a driver rejects it.
    pub clear_driver_on_reject: bool,
    /// Refuse requests whose passenger id is not registered.
    pub require_known_passenger: bool,
}

impl Default for RideOptions {
    fn default() -> Self {
        Self {
            respect_driver_availability: false,
            clear_driver_on_reject: false,
            require_known_passenger: true,
        }
    }
}

impl From<&Config> for RideOptions {
    fn from(config: &Config) -> Self {
        Self {
            respect_driver_availability: config.matching.respect_driver_availability,
            clear_driver_on_reject: config.rides.clear_driver_on_reject,
            require_known_passenger: config.rides.require_known_passenger,
        }
    }
}

/// A passenger's rides split the way their dashboard shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassengerRides {
    /// The first ride, in store order, that is not completed.
    pub current: Option<Ride>,
    /// Completed rides, in store order.
    pub history: Vec<Ride>,
}

/// Ride operations over a shared store.
#[derive(Debug)]
pub struct RideService<'a, S: ?Sized> {
    store: &'a S,
    options: RideOptions,
}

impl<'a, S: KeyValueStore + ?Sized> RideService<'a, S> {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: &'a S, options: RideOptions) -> Self {
        Self { store, options }
    }

    /// The options this service was built with.
    #[must_use]
    pub fn options(&self) -> RideOptions {
        self.options
    }

    fn load(&self) -> Result<Vec<Ride>> {
        collections::load(self.store, Collection::Rides)
    }

    fn save(&self, rides: &[Ride]) -> Result<()> {
        collections::save(self.store, Collection::Rides, rides)
    }

    /// Every stored ride, in store order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn all(&self) -> Result<Vec<Ride>> {
        self.load()
    }

    /// Append a caller-built ride.
    ///
    /// The ride must be `Requested` with no driver. Nothing stops one
    /// passenger from having several open requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRideRequest`] for a ride in another status or
    /// with a driver, [`Error::UnknownPassenger`] if passenger checking is on
    /// and the id is not registered, or a storage error.
    pub fn request_ride(&self, ride: Ride) -> Result<()> {
        if ride.status != RideStatus::Requested {
            return Err(Error::invalid_ride_request(format!(
                "new rides must be Requested, got {}",
                ride.status
            )));
        }
        if ride.driver_id.is_some() {
            return Err(Error::invalid_ride_request(
                "new rides cannot have a driver",
            ));
        }
        if self.options.require_known_passenger
            && IdentityService::new(self.store)
                .find_passenger(&ride.passenger_id)?
                .is_none()
        {
            return Err(Error::unknown_passenger(ride.passenger_id));
        }

        let mut rides = self.load()?;
        info!(
            "Ride {} requested by {} ({}, {} -> {})",
            ride.id, ride.passenger_id, ride.ride_type, ride.pickup, ride.drop
        );
        rides.push(ride);
        self.save(&rides)
    }

    /// Build a ride from a passenger's request and store it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::request_ride`].
    pub fn request(&self, passenger_id: &str, new_ride: NewRide) -> Result<Ride> {
        let ride = new_ride.into_ride(passenger_id);
        self.request_ride(ride.clone())?;
        Ok(ride)
    }

    /// All rides whose passenger id equals `passenger_id`, in store order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn rides_for_passenger(&self, passenger_id: &str) -> Result<Vec<Ride>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.passenger_id == passenger_id)
            .collect())
    }

    /// The passenger's current ride and completed history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn passenger_dashboard(&self, passenger_id: &str) -> Result<PassengerRides> {
        let rides = self.rides_for_passenger(passenger_id)?;
        let current = rides
            .iter()
            .find(|r| r.status != RideStatus::Completed)
            .cloned();
        let history = rides
            .into_iter()
            .filter(|r| r.status == RideStatus::Completed)
            .collect();
        Ok(PassengerRides { current, history })
    }

    /// Rides to show on a driver's board, in store order.
    ///
    /// That is every open request the driver's vehicle and gender qualify
    /// for, plus the rides this driver is carrying (`Accepted` or
    /// `In Progress`). Assigned rides are not re-filtered by type or gender.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn available_rides_for_driver(&self, driver: &Driver) -> Result<Vec<Ride>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| {
                let open = r.status == RideStatus::Requested && self.is_offered(r, driver);
                let carrying = r.is_assigned_to(&driver.id) && r.status.is_assigned();
                open || carrying
            })
            .collect())
    }

    /// Whether an open ride may be offered to `driver`.
    fn is_offered(&self, ride: &Ride, driver: &Driver) -> bool {
        (!self.options.respect_driver_availability || driver.availability)
            && ride.matches_driver(driver.vehicle_type, driver.gender)
    }

    /// Move a ride to `status`, optionally stamping the driver.
    ///
    /// Returns `false` and writes nothing when no ride has `ride_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if the lifecycle does not allow
    /// the change, [`Error::DriverRequired`] when accepting, starting or
    /// completing without a driver, [`Error::NotAssignedDriver`] when another
    /// driver tries to advance an assigned ride, or a storage error.
    pub fn update_ride_status(
        &self,
        ride_id: &str,
        status: RideStatus,
        driver_id: Option<&str>,
    ) -> Result<bool> {
        self.apply_status(ride_id, status, driver_id, None)
    }

    /// Status change on behalf of `candidate`, which must be offered the ride
    /// while it is still open.
    fn apply_status(
        &self,
        ride_id: &str,
        status: RideStatus,
        driver_id: Option<&str>,
        candidate: Option<&Driver>,
    ) -> Result<bool> {
        let mut rides = self.load()?;
        let Some(ride) = rides.iter_mut().find(|r| r.id == ride_id) else {
            debug!("Status update for unknown ride {} ignored", ride_id);
            return Ok(false);
        };

        if !ride.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                ride_id: ride_id.to_string(),
                from: ride.status,
                to: status,
            });
        }

        if let Some(driver) = candidate {
            if ride.status == RideStatus::Requested && !self.is_offered(ride, driver) {
                return Err(Error::DriverNotEligible {
                    ride_id: ride_id.to_string(),
                    driver_id: driver.id.clone(),
                });
            }
        }

        if matches!(
            status,
            RideStatus::Accepted | RideStatus::InProgress | RideStatus::Completed
        ) {
            let Some(actor) = driver_id else {
                return Err(Error::DriverRequired {
                    ride_id: ride_id.to_string(),
                });
            };
            if status != RideStatus::Accepted {
                if let Some(assigned) = ride.driver_id.as_deref() {
                    if assigned != actor {
                        return Err(Error::NotAssignedDriver {
                            ride_id: ride_id.to_string(),
                            driver_id: actor.to_string(),
                        });
                    }
                }
            }
        }

        let from = ride.status;
        ride.status = status;
        if let Some(driver_id) = driver_id {
            ride.driver_id = Some(driver_id.to_string());
        } else if status == RideStatus::Requested && self.options.clear_driver_on_reject {
            ride.driver_id = None;
        }
        info!("Ride {} moved from {} to {}", ride_id, from, status);

        self.save(&rides)?;
        Ok(true)
    }

    /// Driver takes an open ride.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverNotEligible`] if the ride is not one the driver
    /// would be offered, otherwise the same as [`Self::update_ride_status`].
    pub fn accept(&self, ride_id: &str, driver: &Driver) -> Result<bool> {
        self.apply_status(ride_id, RideStatus::Accepted, Some(&driver.id), Some(driver))
    }

    /// Driver passes on an open ride; it stays open for everyone, including
    /// the driver who passed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverNotEligible`] if the ride is not one the driver
    /// would be offered, otherwise the same as [`Self::update_ride_status`].
    pub fn reject(&self, ride_id: &str, driver: &Driver) -> Result<bool> {
        self.apply_status(ride_id, RideStatus::Requested, None, Some(driver))
    }

    /// Driver picks the passenger up.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_ride_status`].
    pub fn start(&self, ride_id: &str, driver_id: &str) -> Result<bool> {
        self.update_ride_status(ride_id, RideStatus::InProgress, Some(driver_id))
    }

    /// Driver drops the passenger off.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_ride_status`].
    pub fn complete(&self, ride_id: &str, driver_id: &str) -> Result<bool> {
        self.update_ride_status(ride_id, RideStatus::Completed, Some(driver_id))
    }

    /// Available drivers with the given vehicle and, if set, gender.
    ///
    /// Unlike ride matching this always checks the availability flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn available_drivers_for_ride_type(
        &self,
        ride_type: VehicleType,
        preferred_gender: Option<Gender>,
    ) -> Result<Vec<Driver>> {
        let drivers: Vec<Driver> = collections::load(self.store, Collection::Drivers)?;
        Ok(drivers
            .into_iter()
            .filter(|d| {
                d.availability
                    && d.vehicle_type == ride_type
                    && preferred_gender.map_or(true, |g| d.gender == g)
            })
            .collect())
    }
}
