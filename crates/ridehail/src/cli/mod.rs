//! Command-line interface for ridehail.
//!
//! This module provides the CLI structure for the `ridehail` binary. Command
//! handlers live in the binary itself.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccountArgs, AvailabilityCommand, ConfigCommand, DriversCommand, GenderArg, ListCommand,
    LoginCommand, RegisterCommand, RequestCommand, ResetCommand, RideActionCommand,
    StatusCommand, Toggle, UserTypeArg, VehicleArg,
};

/// ridehail - Request rides and drive them
///
/// Passengers request rides; drivers see the requests their vehicle and
/// gender qualify for and carry them through to completion. State is kept in
/// a local database and the logged-in account is remembered between runs.
#[derive(Debug, Parser)]
#[command(name = "ridehail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and log into it
    #[command(subcommand)]
    Register(RegisterCommand),

    /// Log into an existing account
    Login(LoginCommand),

    /// Log out
    Logout,

    /// Show the logged-in account
    Whoami(ListCommand),

    /// Request a ride (passenger)
    Request(RequestCommand),

    /// Show your current ride and ride history (passenger)
    Rides(ListCommand),

    /// Show rides you can take or are carrying (driver)
    Board(ListCommand),

    /// Accept an open ride (driver)
    Accept(RideActionCommand),

    /// Pass on an open ride (driver)
    Reject(RideActionCommand),

    /// Mark an accepted ride as picked up (driver)
    Start(RideActionCommand),

    /// Mark a ride in progress as completed (driver)
    Complete(RideActionCommand),

    /// Set whether you are taking rides (driver)
    Availability(AvailabilityCommand),

    /// List available drivers for a vehicle type
    Drivers(DriversCommand),

    /// Load demo accounts and rides into an empty store
    Seed,

    /// Delete all accounts, rides and the session
    Reset(ResetCommand),

    /// Show store status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether demo data is loaded before this command runs. Commands that
    /// manage the stored data themselves, or never touch it, are left alone.
    #[must_use]
    pub fn seeds_on_startup(&self) -> bool {
        !matches!(self, Self::Seed | Self::Reset(_) | Self::Config(_))
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Debug,
            }
        }
    }
}
