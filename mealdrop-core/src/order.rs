//! Orders, their line items and purchase requests.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{delivery::DeliveryInfo, error::DomainError, profile::UserProfile};

/// Lifecycle of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    /// Placed and awaiting confirmation.
    Pending,
    /// Accepted by the meal center.
    Confirmed,
    /// Being cooked.
    Preparing,
    /// With a driver.
    OutForDelivery,
    /// Handed over to the customer.
    Delivered,
    /// Withdrawn before preparation.
    Canceled,
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Canceled,
    ];

    /// Return the status as a `snake_case` `&str`.
    ///
    /// # Examples
    /// ```
    /// use mealdrop_core::OrderStatus;
    ///
    /// assert_eq!(OrderStatus::OutForDelivery.as_str(), "out_for_delivery");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Whether an order in this status may still be canceled.
    #[must_use]
    pub const fn is_cancelable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{value}'")]
pub struct ParseStatusError {
    /// Text that failed to parse.
    pub value: String,
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError {
                value: s.to_owned(),
            })
    }
}

/// A purchase placed by a user.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    /// Unique identifier.
    pub id: u64,
    /// Purchasing user.
    pub user_id: u64,
    /// Profile the delivery was addressed from.
    pub user_profile_id: u64,
    /// Current status.
    pub status: OrderStatus,
    /// Meal plan date at the time of purchase.
    pub delivery_date: DateTime<Utc>,
    /// Free-text note from the buyer.
    pub note: String,
    /// Sum of item prices at purchase time.
    pub total_price: f64,
}

impl Order {
    /// Check that `user_id` may cancel this order now.
    ///
    /// Ownership is checked before status.
    ///
    /// # Errors
    /// Returns [`DomainError::Forbidden`] for another user's order and
    /// [`DomainError::InvalidState`] unless the order is pending or confirmed.
    pub const fn ensure_cancelable_by(&self, user_id: u64) -> Result<(), DomainError> {
        if self.user_id != user_id {
            return Err(DomainError::Forbidden {
                id: self.id,
                user_id,
            });
        }
        if !self.status.is_cancelable() {
            return Err(DomainError::InvalidState {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}

/// One meal option within an order. Price is a snapshot at purchase time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderItem {
    /// Unique identifier.
    pub id: u64,
    /// Owning order.
    pub order_id: u64,
    /// Purchased meal option.
    pub meal_option_id: u64,
    /// Units purchased.
    pub quantity: u32,
    /// Unit price when the order was placed.
    pub price: f64,
}

/// An order with its items, profile and delivery loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderDetails {
    /// The order itself.
    pub order: Order,
    /// Line items, ordered by id.
    pub items: Vec<OrderItem>,
    /// Profile of the purchasing user.
    pub profile: UserProfile,
    /// Delivery scheduled for the order, if any.
    pub delivery: Option<DeliveryInfo>,
}

/// A delivery address that overrides the profile address.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryAddress {
    /// Street address.
    pub address: String,
    /// Geocoded position.
    pub location: Coord<f64>,
}

/// Parameters of a single-unit purchase.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mealdrop_core::PurchaseRequest;
///
/// let request = PurchaseRequest::new(7, 42)
///     .with_note("Leave with neighbour")
///     .with_delivery_address("2 Low Rd", Coord { x: -1.0, y: 52.0 });
/// assert_eq!(request.meal_option_id, 42);
/// assert!(request.delivery_address.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRequest {
    /// Purchasing user.
    pub user_id: u64,
    /// Meal option to buy.
    pub meal_option_id: u64,
    /// Free-text note stored on the order.
    pub note: String,
    /// Overrides the profile address when set.
    pub delivery_address: Option<DeliveryAddress>,
}

impl PurchaseRequest {
    /// Request one unit of `meal_option_id` for `user_id`.
    #[must_use]
    pub const fn new(user_id: u64, meal_option_id: u64) -> Self {
        Self {
            user_id,
            meal_option_id,
            note: String::new(),
            delivery_address: None,
        }
    }

    /// Attach a note to the order.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Deliver to `address` instead of the profile address.
    #[must_use]
    pub fn with_delivery_address(mut self, address: impl Into<String>, location: Coord<f64>) -> Self {
        self.delivery_address = Some(DeliveryAddress {
            address: address.into(),
            location,
        });
        self
    }
}
