//! Command-line interface for the mealdrop delivery service.
//!
//! Every subcommand opens the configured SQLite database, performs one
//! operation and prints the affected records as JSON on standard output.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::debug;
use mealdrop_core::{Geocoder, SqliteStore};
use serde::Serialize;

mod catalog;
mod config;
mod deliveries;
mod error;
mod ledger;

pub use error::CliError;

use catalog::{
    AddCenterArgs, AddOptionArgs, AddPlanArgs, AddRestrictionArgs, ListOptionsArgs,
    ListPlansArgs, SetAvailabilityArgs,
};
use config::{GeocoderBuilder, NominatimBuilder, ServiceArgs, ServiceConfig};
use deliveries::{AssignArgs, DeliverArgs, DeliveriesArgs};
use ledger::{CancelArgs, OrderArgs, OrdersArgs, PurchaseArgs, SetProfileArgs, ShowProfileArgs};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_GEOCODER_URL: &str = "geocoder-url";
pub(crate) const ARG_GEOCODER_TIMEOUT: &str = "geocoder-timeout-secs";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_MEAL_DATE: &str = "date";

/// Run the mealdrop CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, the store or
/// output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &NominatimBuilder, &mut stdout)
}

pub(crate) fn run_with(
    cli: Cli,
    geocoders: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = cli.service.into_config()?;
    let store = config.open_store()?;
    debug!("using database {}", config.database);
    let mut session = Session {
        store,
        config,
        geocoders,
        writer,
    };
    match cli.command {
        Command::AddCenter(args) => args.execute(&mut session),
        Command::Centers => catalog::list_centers(&mut session),
        Command::AddPlan(args) => args.execute(&mut session),
        Command::Plans(args) => args.execute(&mut session),
        Command::AddOption(args) => args.execute(&mut session),
        Command::Options(args) => args.execute(&mut session),
        Command::SetAvailability(args) => args.execute(&mut session),
        Command::AddRestriction(args) => args.execute(&mut session),
        Command::Restrictions => catalog::list_restrictions(&mut session),
        Command::SetProfile(args) => args.execute(&mut session),
        Command::Profile(args) => args.execute(&mut session),
        Command::Purchase(args) => args.execute(&mut session),
        Command::Cancel(args) => args.execute(&mut session),
        Command::Order(args) => args.execute(&mut session),
        Command::Orders(args) => args.execute(&mut session),
        Command::ResetQuantities => ledger::reset_quantities(&mut session),
        Command::Deliveries(args) => args.execute(&mut session),
        Command::Assign(args) => args.execute(&mut session),
        Command::Deliver(args) => args.execute(&mut session),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mealdrop",
    about = "Coordinate meal orders, inventory and delivery routes",
    version
)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a meal center.
    AddCenter(AddCenterArgs),
    /// List meal centers.
    Centers,
    /// Schedule a meal plan for a center.
    AddPlan(AddPlanArgs),
    /// List meal plans.
    Plans(ListPlansArgs),
    /// Add a purchasable option to a meal plan.
    AddOption(AddOptionArgs),
    /// List the options of a meal plan.
    Options(ListOptionsArgs),
    /// Withdraw an option from sale or restore it.
    SetAvailability(SetAvailabilityArgs),
    /// Define a dietary restriction.
    AddRestriction(AddRestrictionArgs),
    /// List dietary restrictions.
    Restrictions,
    /// Create or update a user's delivery profile.
    SetProfile(SetProfileArgs),
    /// Show a user's delivery profile.
    Profile(ShowProfileArgs),
    /// Buy one unit of a meal option.
    Purchase(PurchaseArgs),
    /// Cancel an order and release its inventory.
    Cancel(CancelArgs),
    /// Show one order with its items, profile and delivery.
    Order(OrderArgs),
    /// List orders by user or meal plan.
    Orders(OrdersArgs),
    /// Reset the daily sold counter of every available option.
    ResetQuantities,
    /// List a driver's deliveries for a date in driving order.
    Deliveries(DeliveriesArgs),
    /// Assign a delivery to a driver.
    Assign(AssignArgs),
    /// Record a delivery as completed.
    Deliver(DeliverArgs),
}

/// State shared by one command invocation.
pub(crate) struct Session<'a> {
    pub(crate) store: SqliteStore,
    config: ServiceConfig,
    geocoders: &'a dyn GeocoderBuilder,
    writer: &'a mut dyn Write,
}

impl Session<'_> {
    /// Build the configured geocoder.
    pub(crate) fn geocoder(&self) -> Result<Box<dyn Geocoder>, CliError> {
        self.geocoders.build(&self.config)
    }

    /// Print `value` as pretty JSON followed by a newline.
    pub(crate) fn emit<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CliError> {
        let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
        self.writer
            .write_all(payload.as_bytes())
            .map_err(CliError::WriteOutput)?;
        self.writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
