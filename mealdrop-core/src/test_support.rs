//! Fixture builders and a table-driven geocoder shared by unit, behaviour and
//! integration tests.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use geo::Coord;

use crate::{
    catalog::{DaysMeals, MealOption},
    delivery::{DeliveryInfo, DeliveryStatus},
    geocode::{GeocodeError, Geocoder},
    order::{Order, OrderStatus},
    profile::UserProfile,
};

/// `Geocoder` answering from a fixed address table.
///
/// Blank addresses fail with [`GeocodeError::EmptyAddress`] and unknown ones
/// with [`GeocodeError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct FixedGeocoder {
    addresses: HashMap<String, Coord<f64>>,
}

impl FixedGeocoder {
    /// Resolve `address` to `location`.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>, location: Coord<f64>) -> Self {
        self.addresses.insert(address.into(), location);
        self
    }
}

impl Geocoder for FixedGeocoder {
    fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        self.addresses
            .get(address)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                address: address.to_owned(),
            })
    }
}

/// This time tomorrow, a meal date that is still deliverable.
#[must_use]
pub fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::days(1)
}

/// An available meal option priced at 4.50 with nothing sold.
#[must_use]
pub fn meal_option(id: u64, days_meals_id: u64, max_daily_quantity: u32) -> MealOption {
    MealOption {
        id,
        days_meals_id,
        name: format!("Option {id}"),
        description: "Seasonal dish".to_owned(),
        price: 4.5,
        nutritional_info: "450 kcal".to_owned(),
        is_available: true,
        max_daily_quantity,
        current_daily_quantity: 0,
        dietary_restrictions: Vec::new(),
    }
}

/// An active meal plan served on `meal_date`.
#[must_use]
pub fn days_meals(id: u64, meal_center_id: u64, meal_date: DateTime<Utc>) -> DaysMeals {
    DaysMeals {
        id,
        meal_center_id,
        name: format!("Plan {id}"),
        description: String::new(),
        meal_date,
        is_active: true,
    }
}

/// A single-unit order addressed from profile `id`.
#[must_use]
pub fn order(id: u64, user_id: u64, status: OrderStatus) -> Order {
    Order {
        id,
        user_id,
        user_profile_id: id,
        status,
        delivery_date: Utc::now(),
        note: String::new(),
        total_price: 4.5,
    }
}

/// A profile at the origin.
#[must_use]
pub fn user_profile(id: u64, user_id: u64) -> UserProfile {
    UserProfile {
        id,
        user_id,
        address: format!("{user_id} Test Street"),
        location: Coord { x: 0.0, y: 0.0 },
        phone_number: "0123".to_owned(),
        delivery_notes: String::new(),
        dietary_notes: "None".to_owned(),
        dietary_restrictions: Vec::new(),
    }
}

/// A scheduled, unassigned delivery at (`longitude`, `latitude`).
#[must_use]
pub fn delivery_at(id: u64, order_id: u64, longitude: f64, latitude: f64) -> DeliveryInfo {
    DeliveryInfo {
        id,
        order_id,
        driver_id: None,
        scheduled_time: Utc::now(),
        actual_time: None,
        status: DeliveryStatus::Scheduled,
        notes: String::new(),
        address: format!("Stop {id}"),
        location: Coord {
            x: longitude,
            y: latitude,
        },
        custom_address: false,
    }
}

#[cfg(feature = "store-sqlite")]
pub use seed::{DEFAULT_HOME, Seeded, seed_meal_option, seed_profile, seed_profile_at};

#[cfg(feature = "store-sqlite")]
mod seed {
    use chrono::{DateTime, Utc};
    use geo::Coord;

    use crate::{
        catalog::{DaysMeals, MealCenter, MealOption, NewMealCenter, NewMealOption, NewMealPlan},
        profile::{NewProfile, UserProfile},
        store::{SqliteStore, StoreError},
    };

    /// Location of the seeded meal center.
    pub const CENTER: Coord<f64> = Coord { x: -1.0, y: 52.0 };

    /// Location used by [`seed_profile`].
    pub const DEFAULT_HOME: Coord<f64> = Coord { x: -1.0, y: 52.05 };

    /// Records created by [`seed_meal_option`].
    #[derive(Debug, Clone)]
    pub struct Seeded {
        /// Owning meal center.
        pub center: MealCenter,
        /// Owning meal plan.
        pub plan: DaysMeals,
        /// The purchasable option.
        pub option: MealOption,
    }

    /// Create a center, a plan on `meal_date` and one option capped at
    /// `max_daily_quantity`.
    ///
    /// # Errors
    /// Propagates any store failure.
    pub fn seed_meal_option(
        store: &mut SqliteStore,
        max_daily_quantity: u32,
        meal_date: DateTime<Utc>,
    ) -> Result<Seeded, StoreError> {
        let center = store.create_meal_center(
            &NewMealCenter::new("Central Kitchen", "1 High St", "0123 456")?,
            CENTER,
        )?;
        let plan = store.create_meal_plan(&NewMealPlan::new(
            center.id,
            "Daily menu",
            "",
            meal_date,
        )?)?;
        let option = store.create_meal_option(&NewMealOption::new(
            plan.id,
            "Lentil soup",
            "Red lentils and cumin",
            4.5,
            "320 kcal",
            max_daily_quantity,
        )?)?;
        Ok(Seeded {
            center,
            plan,
            option,
        })
    }

    /// Save a profile for `user_id` at [`DEFAULT_HOME`].
    ///
    /// # Errors
    /// Propagates any store failure.
    pub fn seed_profile(store: &mut SqliteStore, user_id: u64) -> Result<UserProfile, StoreError> {
        seed_profile_at(store, user_id, DEFAULT_HOME)
    }

    /// Save a profile for `user_id` at `location`.
    ///
    /// # Errors
    /// Propagates any store failure.
    pub fn seed_profile_at(
        store: &mut SqliteStore,
        user_id: u64,
        location: Coord<f64>,
    ) -> Result<UserProfile, StoreError> {
        let profile = NewProfile::new(
            format!("{user_id} Test Street"),
            "0123",
            "Knock loudly",
            "None",
        )?;
        store.upsert_profile(user_id, &profile, location)
    }
}
