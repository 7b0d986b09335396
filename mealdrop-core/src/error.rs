//! Domain failures raised by catalog lookups, purchases and cancellations.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{delivery::DeliveryStatus, order::OrderStatus};

/// Kinds of record that a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A [`MealCenter`](crate::MealCenter).
    MealCenter,
    /// A [`DaysMeals`](crate::DaysMeals) plan.
    MealPlan,
    /// A [`MealOption`](crate::MealOption).
    MealOption,
    /// A [`DietaryRestriction`](crate::DietaryRestriction).
    DietaryRestriction,
    /// A [`UserProfile`](crate::UserProfile).
    Profile,
    /// An [`Order`](crate::Order).
    Order,
    /// A [`DeliveryInfo`](crate::DeliveryInfo).
    Delivery,
}

impl Entity {
    /// Human-readable name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MealCenter => "meal center",
            Self::MealPlan => "meal plan",
            Self::MealOption => "meal option",
            Self::DietaryRestriction => "dietary restriction",
            Self::Profile => "user profile",
            Self::Order => "order",
            Self::Delivery => "delivery",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed rejection of a catalog, ordering or delivery operation.
///
/// Every variant leaves the record store untouched: operations check these
/// conditions inside their transaction and roll back on failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record.
        entity: Entity,
        /// Identifier that was looked up.
        id: u64,
    },
    /// The meal option has been withdrawn from sale.
    #[error("meal option {id} is not available")]
    Unavailable {
        /// Meal option identifier.
        id: u64,
    },
    /// The meal option has already sold its daily quantity.
    #[error("meal option {id} has reached its daily limit of {max}")]
    CapacityExceeded {
        /// Meal option identifier.
        id: u64,
        /// Configured daily maximum.
        max: u32,
    },
    /// The purchasing user has no delivery profile on file.
    #[error("user {user_id} must complete a delivery profile before ordering")]
    ProfileRequired {
        /// User that attempted the purchase.
        user_id: u64,
    },
    /// The meal plan date has already passed.
    #[error("delivery date {date} is in the past")]
    PastDeliveryDate {
        /// Date of the meal plan.
        date: DateTime<Utc>,
    },
    /// The order is no longer cancelable.
    #[error("order {id} cannot be canceled while {status}")]
    InvalidState {
        /// Order identifier.
        id: u64,
        /// Status that blocked the cancellation.
        status: OrderStatus,
    },
    /// The delivery has already been completed or canceled.
    #[error("delivery {id} is already {status}")]
    DeliveryClosed {
        /// Delivery identifier.
        id: u64,
        /// Final status of the delivery.
        status: DeliveryStatus,
    },
    /// The order belongs to a different user.
    #[error("order {id} does not belong to user {user_id}")]
    Forbidden {
        /// Order identifier.
        id: u64,
        /// User that attempted the operation.
        user_id: u64,
    },
}

impl DomainError {
    pub(crate) const fn not_found(entity: Entity, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DomainError::not_found(Entity::MealPlan, 4), "meal plan 4 not found")]
    #[case(
        DomainError::CapacityExceeded { id: 2, max: 5 },
        "meal option 2 has reached its daily limit of 5"
    )]
    #[case(
        DomainError::InvalidState { id: 9, status: OrderStatus::Delivered },
        "order 9 cannot be canceled while delivered"
    )]
    #[case(
        DomainError::DeliveryClosed { id: 3, status: DeliveryStatus::Canceled },
        "delivery 3 is already canceled"
    )]
    fn messages_name_the_record(#[case] error: DomainError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
