//! Catalog subcommands: meal centers, plans, options and dietary restrictions.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{ArgAction, Args};
use geo::Coord;
use mealdrop_core::{NewMealCenter, NewMealOption, NewMealPlan};

use crate::{ARG_MEAL_DATE, CliError, Session};

/// Explicit coordinates that bypass geocoding.
#[derive(Debug, Clone, Copy, Default, Args)]
pub(crate) struct LocationArgs {
    /// Longitude in degrees. Requires --latitude.
    #[arg(long, value_name = "deg", requires = "latitude", allow_negative_numbers = true)]
    pub(crate) longitude: Option<f64>,
    /// Latitude in degrees. Requires --longitude.
    #[arg(long, value_name = "deg", requires = "longitude", allow_negative_numbers = true)]
    pub(crate) latitude: Option<f64>,
}

impl LocationArgs {
    /// The coordinate when both axes were supplied.
    pub(crate) fn explicit(self) -> Option<Coord<f64>> {
        self.longitude
            .zip(self.latitude)
            .map(|(x, y)| Coord { x, y })
    }
}

/// Accept `YYYY-MM-DD` as midnight UTC or a full RFC 3339 timestamp.
pub(crate) fn parse_meal_date(value: &str) -> Result<DateTime<Utc>, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|time| time.with_timezone(&Utc)))
        .map_err(|_| CliError::InvalidDate {
            field: ARG_MEAL_DATE,
            value: value.to_owned(),
        })
}

#[derive(Debug, Args)]
pub(crate) struct AddCenterArgs {
    /// Display name.
    #[arg(long)]
    pub(crate) name: String,
    /// Street address, geocoded unless coordinates are given.
    #[arg(long)]
    pub(crate) address: String,
    /// Contact phone number.
    #[arg(long)]
    pub(crate) phone: String,
    #[command(flatten)]
    pub(crate) location: LocationArgs,
}

impl AddCenterArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let center = NewMealCenter::new(self.name, self.address, self.phone)?;
        let created = match self.location.explicit() {
            Some(location) => session.store.create_meal_center(&center, location)?,
            None => {
                let geocoder = session.geocoder()?;
                session.store.register_meal_center(&*geocoder, &center)?
            }
        };
        session.emit(&created)
    }
}

pub(crate) fn list_centers(session: &mut Session<'_>) -> Result<(), CliError> {
    let centers = session.store.meal_centers()?;
    session.emit(&centers)
}

#[derive(Debug, Args)]
pub(crate) struct AddPlanArgs {
    /// Owning meal center id.
    #[arg(long)]
    pub(crate) center: u64,
    /// Display name.
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Serving date, `YYYY-MM-DD` or RFC 3339.
    #[arg(long = ARG_MEAL_DATE, value_name = "date")]
    pub(crate) date: String,
}

impl AddPlanArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let meal_date = parse_meal_date(&self.date)?;
        let plan = NewMealPlan::new(self.center, self.name, self.description, meal_date)?;
        let created = session.store.create_meal_plan(&plan)?;
        session.emit(&created)
    }
}

#[derive(Debug, Args)]
pub(crate) struct ListPlansArgs {
    /// Only plans of this meal center.
    #[arg(long)]
    pub(crate) center: Option<u64>,
}

impl ListPlansArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let plans = session.store.meal_plans(self.center)?;
        session.emit(&plans)
    }
}

#[derive(Debug, Args)]
pub(crate) struct AddOptionArgs {
    /// Owning meal plan id.
    #[arg(long)]
    pub(crate) plan: u64,
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) description: String,
    /// Unit price.
    #[arg(long)]
    pub(crate) price: f64,
    /// Nutritional summary, for example "450 kcal".
    #[arg(long)]
    pub(crate) nutrition: String,
    /// Units that may be sold per day.
    #[arg(long, value_name = "count")]
    pub(crate) max_daily: u32,
    /// Dietary restriction id the option satisfies. Repeatable.
    #[arg(long = "restriction", value_name = "id")]
    pub(crate) restrictions: Vec<u64>,
}

impl AddOptionArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let option = NewMealOption::new(
            self.plan,
            self.name,
            self.description,
            self.price,
            self.nutrition,
            self.max_daily,
        )?
        .with_restrictions(self.restrictions);
        let created = session.store.create_meal_option(&option)?;
        session.emit(&created)
    }
}

#[derive(Debug, Args)]
pub(crate) struct ListOptionsArgs {
    /// Meal plan id.
    #[arg(long)]
    pub(crate) plan: u64,
}

impl ListOptionsArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let options = session.store.meal_options_for_plan(self.plan)?;
        session.emit(&options)
    }
}

#[derive(Debug, Args)]
pub(crate) struct SetAvailabilityArgs {
    /// Meal option id.
    #[arg(long)]
    pub(crate) option: u64,
    /// `true` to offer the option, `false` to withdraw it.
    #[arg(long, action = ArgAction::Set, value_name = "bool")]
    pub(crate) available: bool,
}

impl SetAvailabilityArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let option = session
            .store
            .set_meal_option_availability(self.option, self.available)?;
        session.emit(&option)
    }
}

#[derive(Debug, Args)]
pub(crate) struct AddRestrictionArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
}

impl AddRestrictionArgs {
    pub(crate) fn execute(self, session: &mut Session<'_>) -> Result<(), CliError> {
        let restriction = session
            .store
            .create_dietary_restriction(&self.name, &self.description)?;
        session.emit(&restriction)
    }
}

pub(crate) fn list_restrictions(session: &mut Session<'_>) -> Result<(), CliError> {
    let restrictions = session.store.dietary_restrictions()?;
    session.emit(&restrictions)
}
