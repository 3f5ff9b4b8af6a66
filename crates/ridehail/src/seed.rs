//! Demo data for a fresh store.

use tracing::info;

use crate::error::Result;
use crate::identity::IdentityService;
use crate::model::{new_id, Driver, Gender, Passenger, Ride, RideStatus, User, VehicleType};
use crate::store::{collections, Collection, KeyValueStore};

/// Passenger id used by the demo ride that points at nobody.
pub const DANGLING_PASSENGER_ID: &str = "invalid-id";

const DEMO_PASSWORD: &str = "pass123";

/// Populate an empty store with demo passengers, drivers and rides.
///
/// Does nothing and returns `false` if any of the three collections already
/// holds data. The demo rides are written straight into the collection: one
/// of them references a passenger that does not exist, which the ride service
/// would refuse.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn seed_demo_data<S: KeyValueStore + ?Sized>(store: &S) -> Result<bool> {
    for collection in Collection::ALL {
        if !collections::is_empty(store, collection)? {
            return Ok(false);
        }
    }

    let passengers = [
        Passenger::new("Ayesha Khan", Gender::Female, "ayesha@example.com", DEMO_PASSWORD),
        Passenger::new("Ali Ahmed", Gender::Male, "ali@example.com", DEMO_PASSWORD),
        Passenger::new("Sana Malik", Gender::Female, "sana@example.com", DEMO_PASSWORD),
        Passenger::new("Usman Riaz", Gender::Male, "usman@example.com", DEMO_PASSWORD),
    ];

    let mut bilal = Driver::new(
        "Bilal Khan",
        Gender::Male,
        VehicleType::Bike,
        "bilal@example.com",
        DEMO_PASSWORD,
    );
    bilal.availability = false;
    let drivers = [
        Driver::new(
            "Fatima Noor",
            Gender::Female,
            VehicleType::Bike,
            "fatima@example.com",
            DEMO_PASSWORD,
        ),
        Driver::new(
            "Hassan Iqbal",
            Gender::Male,
            VehicleType::Car,
            "hassan@example.com",
            DEMO_PASSWORD,
        ),
        Driver::new(
            "Zainab Ali",
            Gender::Female,
            VehicleType::Rickshaw,
            "zainab@example.com",
            DEMO_PASSWORD,
        ),
        bilal,
    ];

    let rides = vec![
        demo_ride(
            &passengers[0].id,
            Some(drivers[0].id.as_str()),
            ("Mall Road", "Airport"),
            VehicleType::Bike,
            Some(Gender::Female),
            RideStatus::InProgress,
        ),
        demo_ride(
            &passengers[1].id,
            Some(drivers[1].id.as_str()),
            ("Gulberg", "Lahore Fort"),
            VehicleType::Car,
            None,
            RideStatus::InProgress,
        ),
        demo_ride(
            &passengers[2].id,
            None,
            ("Model Town", "Liberty Market"),
            VehicleType::Bike,
            Some(Gender::Female),
            RideStatus::Requested,
        ),
        demo_ride(
            DANGLING_PASSENGER_ID,
            None,
            ("DHA", "Wapda Town"),
            VehicleType::Rickshaw,
            None,
            RideStatus::Requested,
        ),
    ];

    let identity = IdentityService::new(store);
    for passenger in passengers {
        identity.register(&User::Passenger(passenger))?;
    }
    for driver in drivers {
        identity.register(&User::Driver(driver))?;
    }
    collections::save(store, Collection::Rides, &rides)?;

    info!("Seeded demo data: 4 passengers, 4 drivers, {} rides", rides.len());
    Ok(true)
}

fn demo_ride(
    passenger_id: &str,
    driver_id: Option<&str>,
    (pickup, drop): (&str, &str),
    ride_type: VehicleType,
    preferred_driver_gender: Option<Gender>,
    status: RideStatus,
) -> Ride {
    Ride {
        id: new_id(),
        passenger_id: passenger_id.to_string(),
        driver_id: driver_id.map(str::to_string),
        pickup: pickup.to_string(),
        drop: drop.to_string(),
        ride_type,
        preferred_driver_gender,
        status,
    }
}
