//! `ridehail` - CLI for the ride-hailing store
//!
//! This binary provides the command-line front end: accounts, ride requests
//! and the driver workflow, all against the configured local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use ridehail::cli::{
    AccountArgs, Cli, Command, ConfigCommand, DriversCommand, LoginCommand, RegisterCommand,
    RequestCommand,
};
use ridehail::{
    init_logging, Config, Driver, Error, NewRide, Passenger, Ride, RideHailing, SqliteStore,
    User, UserType,
};

type App = RideHailing<SqliteStore>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Configuration commands must work even when the database cannot be opened.
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        other => other,
    };

    let app = RideHailing::open(config).context("opening the ride database")?;
    if command.seeds_on_startup() {
        app.seed_if_enabled()?;
    }

    match command {
        Command::Register(cmd) => handle_register(&app, cmd),
        Command::Login(cmd) => handle_login(&app, &cmd),
        Command::Logout => {
            if app.identity().logout()? {
                println!("Logged out.");
            } else {
                println!("Nobody was logged in.");
            }
            Ok(())
        }
        Command::Whoami(cmd) => handle_whoami(&app, cmd.json),
        Command::Request(cmd) => handle_request(&app, cmd),
        Command::Rides(cmd) => handle_rides(&app, cmd.json),
        Command::Board(cmd) => handle_board(&app, cmd.json),
        Command::Accept(cmd) => {
            let driver = current_driver(&app)?;
            report_update(app.rides().accept(&cmd.ride_id, &driver)?, &cmd.ride_id, "accepted")
        }
        Command::Reject(cmd) => {
            let driver = current_driver(&app)?;
            report_update(app.rides().reject(&cmd.ride_id, &driver)?, &cmd.ride_id, "rejected")
        }
        Command::Start(cmd) => {
            let driver = app.identity().require_driver()?;
            report_update(app.rides().start(&cmd.ride_id, &driver.id)?, &cmd.ride_id, "started")
        }
        Command::Complete(cmd) => {
            let driver = app.identity().require_driver()?;
            report_update(
                app.rides().complete(&cmd.ride_id, &driver.id)?,
                &cmd.ride_id,
                "completed",
            )
        }
        Command::Availability(cmd) => {
            let driver = app.identity().require_driver()?;
            let available = bool::from(cmd.state);
            if !app.identity().set_driver_availability(&driver.id, available)? {
                bail!("driver account {} no longer exists", driver.id);
            }
            println!(
                "You are now {}.",
                if available { "available" } else { "unavailable" }
            );
            Ok(())
        }
        Command::Drivers(cmd) => handle_drivers(&app, &cmd),
        Command::Seed => {
            if ridehail::seed::seed_demo_data(app.store())? {
                println!("Demo data loaded.");
            } else {
                println!("Store already has data; nothing loaded.");
            }
            Ok(())
        }
        Command::Reset(cmd) => {
            if cmd.yes {
                let removed = app.reset()?;
                println!("Removed {removed} entries.");
            } else {
                println!("This deletes every account, ride and the current session.");
                println!("Use --yes to confirm.");
            }
            Ok(())
        }
        Command::Status(cmd) => handle_status(&app, cmd.json),
        Command::Config(config_cmd) => handle_config(app.config(), config_cmd),
    }
}

fn handle_register(app: &App, cmd: RegisterCommand) -> anyhow::Result<()> {
    let user: User = match cmd {
        RegisterCommand::Passenger(account) => {
            let AccountArgs {
                name,
                gender,
                email,
                password,
            } = account;
            Passenger::new(name, gender.into(), email, password).into()
        }
        RegisterCommand::Driver { account, vehicle } => {
            let AccountArgs {
                name,
                gender,
                email,
                password,
            } = account;
            Driver::new(name, gender.into(), vehicle.into(), email, password).into()
        }
    };

    if !app.identity().register(&user)? {
        bail!("Email already exists");
    }
    app.identity().set_current_user(&user)?;
    println!(
        "Registered {} account for {} and logged in.",
        user.user_type(),
        user.name()
    );
    Ok(())
}

fn handle_login(app: &App, cmd: &LoginCommand) -> anyhow::Result<()> {
    let user_type = UserType::from(cmd.user_type);
    let Some(user) = app.identity().login(&cmd.email, &cmd.password, user_type)? else {
        bail!("Invalid credentials");
    };
    app.identity().set_current_user(&user)?;
    println!("Logged in as {} ({}).", user.name(), user.user_type());
    Ok(())
}

fn handle_whoami(app: &App, json: bool) -> anyhow::Result<()> {
    let user = app.identity().current_user()?.ok_or(Error::NotLoggedIn)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }
    println!("Name:   {}", user.name());
    println!("Email:  {}", user.email());
    println!("Role:   {}", user.user_type());
    if let Some(driver) = user.as_driver() {
        println!("Vehicle:   {}", driver.vehicle_type);
        println!("Available: {}", driver.availability);
    }
    Ok(())
}

fn handle_request(app: &App, cmd: RequestCommand) -> anyhow::Result<()> {
    let passenger = app.identity().require_passenger()?;

    // One open ride at a time, as the passenger screen enforces.
    if let Some(current) = app.rides().passenger_dashboard(&passenger.id)?.current {
        bail!(
            "you already have a ride in progress ({}, {})",
            current.id,
            current.status
        );
    }

    let ride = app.rides().request(
        &passenger.id,
        NewRide {
            pickup: cmd.pickup,
            drop: cmd.drop,
            ride_type: cmd.ride_type.into(),
            preferred_driver_gender: cmd.prefer.map(Into::into),
        },
    )?;
    println!("Ride requested: {}", ride.id);
    print_ride(&ride);
    Ok(())
}

fn handle_rides(app: &App, json: bool) -> anyhow::Result<()> {
    let passenger = app.identity().require_passenger()?;
    let dashboard = app.rides().passenger_dashboard(&passenger.id)?;

    if json {
        let out = serde_json::json!({
            "current": dashboard.current,
            "history": dashboard.history,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Current ride");
    println!("------------");
    match &dashboard.current {
        Some(ride) => print_ride(ride),
        None => println!("  No active ride."),
    }
    println!();
    println!("Ride history");
    println!("------------");
    if dashboard.history.is_empty() {
        println!("  No completed rides.");
    }
    for ride in &dashboard.history {
        print_ride(ride);
    }
    Ok(())
}

fn handle_board(app: &App, json: bool) -> anyhow::Result<()> {
    let driver = current_driver(app)?;
    let rides = app.rides().available_rides_for_driver(&driver)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rides)?);
        return Ok(());
    }
    if rides.is_empty() {
        println!("No rides available.");
    }
    for ride in &rides {
        print_ride(ride);
    }
    Ok(())
}

/// The logged-in driver, re-read from the store so changes made by another
/// session (availability) are seen.
fn current_driver(app: &App) -> anyhow::Result<Driver> {
    let session = app.identity().require_driver()?;
    Ok(app.identity().find_driver(&session.id)?.unwrap_or(session))
}

fn handle_drivers(app: &App, cmd: &DriversCommand) -> anyhow::Result<()> {
    let drivers = app
        .rides()
        .available_drivers_for_ride_type(cmd.ride_type.into(), cmd.gender.map(Into::into))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&drivers)?);
        return Ok(());
    }
    if drivers.is_empty() {
        println!("No available drivers.");
    }
    for driver in &drivers {
        println!(
            "{}  {} ({}, {})",
            driver.id, driver.name, driver.gender, driver.vehicle_type
        );
    }
    Ok(())
}

fn handle_status(app: &App, json: bool) -> anyhow::Result<()> {
    let stats = app.store().stats()?;
    let keys = app.store().keys()?;
    let identity = app.identity();
    let passengers = identity.passengers()?.len();
    let drivers = identity.drivers()?.len();
    let rides = app.rides().all()?.len();
    let current = identity.current_user()?;

    if json {
        let status = serde_json::json!({
            "database_path": app.store().path(),
            "passengers": passengers,
            "drivers": drivers,
            "rides": rides,
            "current_user": current.as_ref().map(User::email),
            "entries": stats.total_entries,
            "keys": keys,
            "payload_bytes": stats.payload_bytes,
            "last_updated": stats.last_updated,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("ridehail status");
        println!("---------------");
        println!("Database:      {}", app.store().path().display());
        println!("Passengers:    {passengers}");
        println!("Drivers:       {drivers}");
        println!("Rides:         {rides}");
        println!(
            "Logged in:     {}",
            current.as_ref().map_or("nobody", User::email)
        );
        println!("Stored keys:   {}", keys.join(", "));
        println!("Size:          {} bytes", stats.db_size_bytes);
        if let Some(updated) = stats.last_updated {
            println!("Last write:    {}", updated.to_rfc3339());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:               {}", config.database_path().display());
                println!();
                println!("[Matching]");
                println!(
                    "  Respect driver availability: {}",
                    config.matching.respect_driver_availability
                );
                println!();
                println!("[Rides]");
                println!(
                    "  Clear driver on reject:      {}",
                    config.rides.clear_driver_on_reject
                );
                println!(
                    "  Require known passenger:     {}",
                    config.rides.require_known_passenger
                );
                println!();
                println!("[Seed]");
                println!("  Demo data:                   {}", config.seed.demo_data);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn report_update(updated: bool, ride_id: &str, verb: &str) -> anyhow::Result<()> {
    if !updated {
        bail!("ride {ride_id} not found");
    }
    println!("Ride {ride_id} {verb}.");
    Ok(())
}

fn print_ride(ride: &Ride) {
    let preference = ride
        .preferred_driver_gender
        .map(|g| format!(", {g} driver only"))
        .unwrap_or_default();
    println!(
        "  {}  {} -> {}  [{}{}]  {}",
        ride.id, ride.pickup, ride.drop, ride.ride_type, preference, ride.status
    );
    if let Some(driver_id) = &ride.driver_id {
        println!("      driver: {driver_id}");
    }
}
