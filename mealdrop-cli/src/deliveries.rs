//! Driver-facing subcommands.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use mealdrop_core::DriverFilter;

use crate::{CliError, Session};

#[derive(Debug, Args)]
pub(crate) struct DeliveriesArgs {
    /// Meal center the route starts from.
    #[arg(long)]
    pub(crate) center: u64,
    /// Scheduled date, `YYYY-MM-DD`.
    #[arg(long, value_name = "date")]
    pub(crate) date: NaiveDate,
    /// Driver id; omit or pass 0 for unassigned deliveries.
    #[arg(long)]
    pub(crate) driver: Option<u64>,
}

impl DeliveriesArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let route = session.store.deliveries_for_driver(
            DriverFilter::from(self.driver),
            self.date,
            self.center,
        )?;
        session.emit(&route)
    }
}

#[derive(Debug, Args)]
pub(crate) struct AssignArgs {
    #[arg(long)]
    pub(crate) delivery: u64,
    #[arg(long)]
    pub(crate) driver: u64,
}

impl AssignArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let delivery = session.store.assign_driver(self.delivery, self.driver)?;
        session.emit(&delivery)
    }
}

#[derive(Debug, Args)]
pub(crate) struct DeliverArgs {
    #[arg(long)]
    pub(crate) delivery: u64,
    /// Completion time in RFC 3339; defaults to now.
    #[arg(long, value_name = "timestamp")]
    pub(crate) at: Option<DateTime<Utc>>,
}

impl DeliverArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let at = self.at.unwrap_or_else(Utc::now);
        let delivery = session.store.mark_delivered(self.delivery, at)?;
        session.emit(&delivery)
    }
}
