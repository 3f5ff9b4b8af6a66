//! Error types for ridehail.
//!
//! This module defines all error types used throughout the ridehail crate.
//! Expected domain outcomes (duplicate registration, bad credentials, unknown
//! ride id on update) are not errors; they are reported through the return
//! values of the services.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::{RideStatus, UserType};

/// The main error type for ridehail operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Ride Errors ===
    /// A ride referenced a passenger that is not registered.
    #[error("unknown passenger: {passenger_id}")]
    UnknownPassenger {
        /// The passenger id carried by the ride.
        passenger_id: String,
    },

    /// A ride request was malformed.
    #[error("invalid ride request: {message}")]
    InvalidRideRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// A status change is not allowed from the ride's current status.
    #[error("ride {ride_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The ride being updated.
        ride_id: String,
        /// Current status.
        from: RideStatus,
        /// Requested status.
        to: RideStatus,
    },

    /// The transition assigns the ride, so a driver id must be given.
    #[error("ride {ride_id} needs a driver for this transition")]
    DriverRequired {
        /// The ride being updated.
        ride_id: String,
    },

    /// A driver tried to advance a ride assigned to someone else.
    #[error("driver {driver_id} is not assigned to ride {ride_id}")]
    NotAssignedDriver {
        /// The ride being updated.
        ride_id: String,
        /// The driver that attempted the update.
        driver_id: String,
    },

    /// The driver's vehicle or gender does not fit an open ride.
    #[error("driver {driver_id} is not eligible for ride {ride_id}")]
    DriverNotEligible {
        /// The ride being updated.
        ride_id: String,
        /// The driver that attempted the update.
        driver_id: String,
    },

    // === Session Errors ===
    /// No user is logged in.
    #[error("not logged in")]
    NotLoggedIn,

    /// The logged-in user has the wrong role for the operation.
    #[error("this action requires a {expected} account")]
    WrongUserType {
        /// The role the operation needs.
        expected: UserType,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// A stored collection could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for ridehail operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid ride request error.
    #[must_use]
    pub fn invalid_ride_request(message: impl Into<String>) -> Self {
        Self::InvalidRideRequest {
            message: message.into(),
        }
    }

    /// Create an unknown passenger error.
    #[must_use]
    pub fn unknown_passenger(passenger_id: impl Into<String>) -> Self {
        Self::UnknownPassenger {
            passenger_id: passenger_id.into(),
        }
    }

    /// Check if this error is a rejected status change.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotLoggedIn;
        assert_eq!(err.to_string(), "not logged in");

        let err = Error::unknown_passenger("p-1");
        assert_eq!(err.to_string(), "unknown passenger: p-1");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = Error::InvalidTransition {
            ride_id: "r-1".to_string(),
            from: RideStatus::Completed,
            to: RideStatus::Accepted,
        };
        assert_eq!(
            err.to_string(),
            "ride r-1 cannot move from Completed to Accepted"
        );
        assert!(err.is_invalid_transition());
        assert!(!Error::NotLoggedIn.is_invalid_transition());
    }

    #[test]
    fn test_in_progress_display_uses_spaced_name() {
        let err = Error::InvalidTransition {
            ride_id: "r-2".to_string(),
            from: RideStatus::Requested,
            to: RideStatus::InProgress,
        };
        assert!(err.to_string().contains("In Progress"));
    }

    #[test]
    fn test_session_errors_display() {
        let err = Error::WrongUserType {
            expected: UserType::Driver,
        };
        assert_eq!(err.to_string(), "this action requires a driver account");
    }

    #[test]
    fn test_driver_errors_display() {
        let err = Error::DriverRequired {
            ride_id: "r-3".to_string(),
        };
        assert!(err.to_string().contains("r-3"));

        let err = Error::NotAssignedDriver {
            ride_id: "r-4".to_string(),
            driver_id: "d-9".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("r-4"));
        assert!(msg.contains("d-9"));

        let err = Error::DriverNotEligible {
            ride_id: "r-5".to_string(),
            driver_id: "d-2".to_string(),
        };
        assert_eq!(err.to_string(), "driver d-2 is not eligible for ride r-5");
    }

    #[test]
    fn test_invalid_ride_request() {
        let err = Error::invalid_ride_request("status must be Requested");
        assert_eq!(
            err.to_string(),
            "invalid ride request: status must be Requested"
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "database_path must not be empty".to_string(),
        };
        assert!(err.to_string().contains("database_path"));
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
