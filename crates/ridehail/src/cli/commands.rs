//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{Gender, UserType, VehicleType};

/// Account creation commands.
#[derive(Debug, Subcommand)]
pub enum RegisterCommand {
    /// Register a passenger account
    Passenger(AccountArgs),

    /// Register a driver account
    Driver {
        /// Common account fields
        #[command(flatten)]
        account: AccountArgs,

        /// Vehicle the driver operates
        #[arg(long, value_enum)]
        vehicle: VehicleArg,
    },
}

/// Fields shared by both account kinds.
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Gender
    #[arg(long, value_enum)]
    pub gender: GenderArg,

    /// Login email
    #[arg(long)]
    pub email: String,

    /// Login password
    #[arg(long)]
    pub password: String,
}

/// Login command arguments.
#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Which kind of account to log into
    #[arg(long = "as", value_enum, default_value = "passenger")]
    pub user_type: UserTypeArg,

    /// Login email
    #[arg(long)]
    pub email: String,

    /// Login password
    #[arg(long)]
    pub password: String,
}

/// Ride request arguments (logged-in passenger).
#[derive(Debug, Args)]
pub struct RequestCommand {
    /// Where to be picked up
    #[arg(long)]
    pub pickup: String,

    /// Where to go
    #[arg(long)]
    pub drop: String,

    /// Vehicle wanted
    #[arg(short = 't', long, value_enum, default_value = "bike")]
    pub ride_type: VehicleArg,

    /// Only offer the ride to drivers of this gender
    #[arg(long, value_enum)]
    pub prefer: Option<GenderArg>,
}

/// A driver action on one ride.
#[derive(Debug, Args)]
pub struct RideActionCommand {
    /// Id of the ride
    pub ride_id: String,
}

/// Available driver lookup arguments.
#[derive(Debug, Args)]
pub struct DriversCommand {
    /// Vehicle type to look for
    #[arg(short = 't', long, value_enum)]
    pub ride_type: VehicleArg,

    /// Restrict to this gender
    #[arg(long, value_enum)]
    pub gender: Option<GenderArg>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Driver availability arguments (logged-in driver).
#[derive(Debug, Args)]
pub struct AvailabilityCommand {
    /// New availability
    #[arg(value_enum)]
    pub state: Toggle,
}

/// Commands that only print, with optional JSON output.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Store reset arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Gender argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenderArg {
    /// Male
    Male,
    /// Female
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Self::Male,
            GenderArg::Female => Self::Female,
        }
    }
}

/// Vehicle type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleArg {
    /// Motorbike
    Bike,
    /// Car
    Car,
    /// Auto rickshaw
    Rickshaw,
}

impl From<VehicleArg> for VehicleType {
    fn from(arg: VehicleArg) -> Self {
        match arg {
            VehicleArg::Bike => Self::Bike,
            VehicleArg::Car => Self::Car,
            VehicleArg::Rickshaw => Self::Rickshaw,
        }
    }
}

/// Account kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UserTypeArg {
    /// Passenger account
    Passenger,
    /// Driver account
    Driver,
}

impl From<UserTypeArg> for UserType {
    fn from(arg: UserTypeArg) -> Self {
        match arg {
            UserTypeArg::Passenger => Self::Passenger,
            UserTypeArg::Driver => Self::Driver,
        }
    }
}

/// On/off switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    /// Enabled
    On,
    /// Disabled
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle == Toggle::On
    }
}
