//! Profile and order subcommands.

use clap::Args;
use geo::Coord;
use mealdrop_core::{DomainError, Entity, Geocoder, NewProfile, PurchaseRequest, StoreError};
use serde::Serialize;

use crate::{CliError, Session, catalog::LocationArgs};

#[derive(Debug, Args)]
pub(crate) struct SetProfileArgs {
    /// User the profile belongs to.
    #[arg(long)]
    pub(crate) user: u64,
    /// Delivery address, geocoded unless coordinates are given.
    #[arg(long)]
    pub(crate) address: String,
    #[arg(long)]
    pub(crate) phone: String,
    /// Instructions for the driver.
    #[arg(long, default_value = "")]
    pub(crate) delivery_notes: String,
    /// Allergies or preferences in free text.
    #[arg(long)]
    pub(crate) dietary_notes: String,
    /// Dietary restriction id. Repeatable; replaces the current links.
    #[arg(long = "restriction", value_name = "id")]
    pub(crate) restrictions: Vec<u64>,
    /// Remove every dietary restriction link.
    #[arg(long, conflicts_with = "restrictions")]
    pub(crate) clear_restrictions: bool,
    #[command(flatten)]
    pub(crate) location: LocationArgs,
}

impl SetProfileArgs {
    fn new_profile(self) -> Result<(u64, NewProfile, LocationArgs), CliError> {
        let base = NewProfile::new(
            self.address,
            self.phone,
            self.delivery_notes,
            self.dietary_notes,
        )?;
        let profile = if self.clear_restrictions {
            base.with_restrictions([])
        } else if self.restrictions.is_empty() {
            base
        } else {
            base.with_restrictions(self.restrictions)
        };
        Ok((self.user, profile, self.location))
    }

    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let (user_id, profile, location) = self.new_profile()?;
        let saved = match location.explicit() {
            Some(location) => session.store.upsert_profile(user_id, &profile, location)?,
            None => {
                let geocoder = session.geocoder()?;
                session.store.register_profile(&*geocoder, user_id, &profile)?
            }
        };
        session.emit(&saved)
    }
}

#[derive(Debug, Args)]
pub(crate) struct ShowProfileArgs {
    #[arg(long)]
    pub(crate) user: u64,
}

impl ShowProfileArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let profile = session
            .store
            .profile_for_user(self.user)?
            .ok_or(StoreError::Domain(DomainError::NotFound {
                entity: Entity::Profile,
                id: self.user,
            }))?;
        session.emit(&profile)
    }
}

#[derive(Debug, Args)]
pub(crate) struct PurchaseArgs {
    /// Purchasing user.
    #[arg(long)]
    pub(crate) user: u64,
    /// Meal option to buy.
    #[arg(long)]
    pub(crate) option: u64,
    #[arg(long, default_value = "")]
    pub(crate) note: String,
    /// Deliver here instead of the profile address.
    #[arg(long, value_name = "address")]
    pub(crate) deliver_to: Option<String>,
    /// Longitude of --deliver-to; skips geocoding with --latitude.
    #[arg(
        long,
        value_name = "deg",
        requires_all = ["deliver_to", "latitude"],
        allow_negative_numbers = true
    )]
    pub(crate) longitude: Option<f64>,
    /// Latitude of --deliver-to; skips geocoding with --longitude.
    #[arg(
        long,
        value_name = "deg",
        requires_all = ["deliver_to", "longitude"],
        allow_negative_numbers = true
    )]
    pub(crate) latitude: Option<f64>,
}

impl PurchaseArgs {
    fn request(self, session: &Session<'_>) -> Result<PurchaseRequest, CliError> {
        let request = PurchaseRequest::new(self.user, self.option).with_note(self.note);
        let Some(address) = self.deliver_to else {
            return Ok(request);
        };
        let location = match self.longitude.zip(self.latitude) {
            Some((x, y)) => Coord { x, y },
            None => session
                .geocoder()?
                .lookup(&address)
                .map_err(StoreError::from)?,
        };
        Ok(request.with_delivery_address(address, location))
    }

    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let request = self.request(session)?;
        let order = session.store.purchase(&request, chrono::Utc::now())?;
        session.emit(&order)
    }
}

#[derive(Debug, Args)]
pub(crate) struct CancelArgs {
    #[arg(long)]
    pub(crate) order: u64,
    /// User requesting the cancellation; must own the order.
    #[arg(long)]
    pub(crate) user: u64,
}

impl CancelArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let order = session.store.cancel_order(self.order, self.user)?;
        session.emit(&order)
    }
}

#[derive(Debug, Args)]
pub(crate) struct OrderArgs {
    #[arg(long)]
    pub(crate) id: u64,
}

impl OrderArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let order = session.store.order(self.id)?;
        session.emit(&order)
    }
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub(crate) struct OrdersArgs {
    /// Orders placed by this user.
    #[arg(long)]
    pub(crate) user: Option<u64>,
    /// Orders containing an option of this meal plan.
    #[arg(long)]
    pub(crate) plan: Option<u64>,
}

impl OrdersArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let orders = match (self.user, self.plan) {
            (Some(user_id), _) => session.store.orders_for_user(user_id)?,
            (None, Some(plan_id)) => session.store.orders_for_meal_plan(plan_id)?,
            (None, None) => Vec::new(),
        };
        session.emit(&orders)
    }
}

#[derive(Debug, Serialize)]
struct ResetSummary {
    reset: usize,
}

pub(crate) fn reset_quantities(session: &mut Session<'_>) -> Result<(), CliError> {
    let reset = session.store.reset_daily_quantities()?;
    session.emit(&ResetSummary { reset })
}
