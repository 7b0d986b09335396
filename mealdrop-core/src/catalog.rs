//! Meal centers, their daily plans and the options sold from each plan.

use chrono::{DateTime, Utc};
use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::DomainError,
    route::Located,
    validation::{ValidationError, amount, at_most, required},
};

const NAME_MAX: usize = 255;
const ADDRESS_MAX: usize = 255;
const PHONE_MAX: usize = 20;
const DESCRIPTION_MAX: usize = 1000;

/// Kitchen that prepares meals and is the start of every delivery route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MealCenter {
    /// Unique identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Geocoded position of the address.
    pub location: Coord<f64>,
    /// Whether the center is currently operating.
    pub is_active: bool,
}

impl Located for MealCenter {
    fn location(&self) -> Coord<f64> {
        self.location
    }
}

/// Validated fields for a meal center that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMealCenter {
    /// Display name.
    pub name: String,
    /// Street address, also used for geocoding.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
}

impl NewMealCenter {
    /// Validate and construct a [`NewMealCenter`].
    ///
    /// # Errors
    /// Returns [`ValidationError`] when a field is blank or too long.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let center = Self {
            name: name.into(),
            address: address.into(),
            phone_number: phone_number.into(),
        };
        required("name", &center.name, NAME_MAX)?;
        required("address", &center.address, ADDRESS_MAX)?;
        required("phone_number", &center.phone_number, PHONE_MAX)?;
        Ok(center)
    }
}

/// The menu a meal center offers on one calendar date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DaysMeals {
    /// Unique identifier.
    pub id: u64,
    /// Owning meal center.
    pub meal_center_id: u64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// When the meals are delivered.
    pub meal_date: DateTime<Utc>,
    /// Whether the plan is published.
    pub is_active: bool,
}

impl DaysMeals {
    /// Check that meals from this plan can still be delivered at `now`.
    ///
    /// A plan dated exactly `now` is still deliverable.
    ///
    /// # Errors
    /// Returns [`DomainError::PastDeliveryDate`] when `meal_date` precedes `now`.
    pub fn ensure_deliverable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.meal_date < now {
            return Err(DomainError::PastDeliveryDate {
                date: self.meal_date,
            });
        }
        Ok(())
    }
}

/// Validated fields for a meal plan that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMealPlan {
    /// Owning meal center.
    pub meal_center_id: u64,
    /// Display name.
    pub name: String,
    /// Free-text description, may be empty.
    pub description: String,
    /// Delivery date of the plan.
    pub meal_date: DateTime<Utc>,
}

impl NewMealPlan {
    /// Validate and construct a [`NewMealPlan`].
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the name is blank or a field is too long.
    pub fn new(
        meal_center_id: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        meal_date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let plan = Self {
            meal_center_id,
            name: name.into(),
            description: description.into(),
            meal_date,
        };
        required("name", &plan.name, NAME_MAX)?;
        at_most("description", &plan.description, DESCRIPTION_MAX)?;
        Ok(plan)
    }
}

/// A dietary need such as "Diabetic" or "Low Sodium".
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DietaryRestriction {
    /// Unique identifier.
    pub id: u64,
    /// Short name.
    pub name: String,
    /// Longer explanation.
    pub description: String,
}

/// A purchasable meal within a [`DaysMeals`] plan.
///
/// `current_daily_quantity` counts units sold for the plan date and never
/// exceeds `max_daily_quantity`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MealOption {
    /// Unique identifier.
    pub id: u64,
    /// Owning meal plan.
    pub days_meals_id: u64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Nutritional summary shown to buyers.
    pub nutritional_info: String,
    /// Whether the option can currently be bought.
    pub is_available: bool,
    /// Daily production cap.
    pub max_daily_quantity: u32,
    /// Units already sold today.
    pub current_daily_quantity: u32,
    /// Dietary restrictions the meal satisfies.
    pub dietary_restrictions: Vec<DietaryRestriction>,
}

impl MealOption {
    /// Units still available today.
    ///
    /// # Examples
    /// ```
    /// use mealdrop_core::test_support::meal_option;
    ///
    /// let mut option = meal_option(1, 1, 5);
    /// option.current_daily_quantity = 3;
    /// assert_eq!(option.remaining(), 2);
    /// ```
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.max_daily_quantity
            .saturating_sub(self.current_daily_quantity)
    }

    /// Check that one more unit can be sold.
    ///
    /// Availability is checked before capacity.
    ///
    /// # Errors
    /// Returns [`DomainError::Unavailable`] or [`DomainError::CapacityExceeded`].
    pub const fn ensure_orderable(&self) -> Result<(), DomainError> {
        if !self.is_available {
            return Err(DomainError::Unavailable { id: self.id });
        }
        if self.remaining() < 1 {
            return Err(DomainError::CapacityExceeded {
                id: self.id,
                max: self.max_daily_quantity,
            });
        }
        Ok(())
    }
}

/// Validated fields for a meal option that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealOption {
    /// Owning meal plan.
    pub days_meals_id: u64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Nutritional summary.
    pub nutritional_info: String,
    /// Daily production cap.
    pub max_daily_quantity: u32,
    /// Restrictions to link to the option.
    pub dietary_restriction_ids: Vec<u64>,
}

impl NewMealOption {
    /// Validate and construct a [`NewMealOption`] with no dietary restrictions.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when text is blank or too long, or the
    /// price is negative or not finite.
    pub fn new(
        days_meals_id: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        nutritional_info: impl Into<String>,
        max_daily_quantity: u32,
    ) -> Result<Self, ValidationError> {
        let option = Self {
            days_meals_id,
            name: name.into(),
            description: description.into(),
            price,
            nutritional_info: nutritional_info.into(),
            max_daily_quantity,
            dietary_restriction_ids: Vec::new(),
        };
        required("name", &option.name, NAME_MAX)?;
        required("description", &option.description, DESCRIPTION_MAX)?;
        amount("price", option.price)?;
        required("nutritional_info", &option.nutritional_info, usize::MAX)?;
        Ok(option)
    }

    /// Link the option to the given dietary restrictions.
    #[must_use]
    pub fn with_restrictions(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.dietary_restriction_ids = ids.into_iter().collect();
        self
    }
}
