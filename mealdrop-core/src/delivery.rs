//! Delivery records and assembly of a driver's ordered stop list.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use geo::Coord;
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::DomainError,
    order::{Order, ParseStatusError},
    profile::UserProfile,
    route::{Located, optimize_route},
};

/// Progress of a [`DeliveryInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeliveryStatus {
    /// Created with the order, no driver yet.
    Scheduled,
    /// A driver has been assigned.
    Assigned,
    /// The driver is on the way.
    OutForDelivery,
    /// Handed over.
    Delivered,
    /// The order was canceled.
    Canceled,
}

impl DeliveryStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Scheduled,
        Self::Assigned,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Canceled,
    ];

    /// Return the status as a `snake_case` `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Assigned => "assigned",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Whether the delivery can no longer change hands or be completed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Delivered | Self::Canceled)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
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

/// Where and when an order is delivered.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryInfo {
    /// Unique identifier.
    pub id: u64,
    /// Order being delivered.
    pub order_id: u64,
    /// Assigned driver, if any.
    pub driver_id: Option<u64>,
    /// Scheduled delivery time, taken from the meal plan date.
    pub scheduled_time: DateTime<Utc>,
    /// When the delivery was completed.
    pub actual_time: Option<DateTime<Utc>>,
    /// Current status.
    pub status: DeliveryStatus,
    /// Instructions for the driver.
    pub notes: String,
    /// Destination address.
    pub address: String,
    /// Destination position.
    pub location: Coord<f64>,
    /// Whether `address` overrides the profile address.
    pub custom_address: bool,
}

impl DeliveryInfo {
    /// Check that a driver may still take or complete this delivery.
    ///
    /// # Errors
    /// Returns [`DomainError::DeliveryClosed`] once the delivery is delivered
    /// or canceled.
    pub const fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_closed() {
            return Err(DomainError::DeliveryClosed {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }
}

impl Located for DeliveryInfo {
    fn location(&self) -> Coord<f64> {
        self.location
    }
}

/// Which deliveries a driver query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverFilter {
    /// Deliveries with no driver.
    Unassigned,
    /// Deliveries assigned to this driver.
    Driver(u64),
}

impl From<u64> for DriverFilter {
    /// Driver id `0` selects unassigned deliveries.
    fn from(driver_id: u64) -> Self {
        if driver_id == 0 {
            Self::Unassigned
        } else {
            Self::Driver(driver_id)
        }
    }
}

impl From<Option<u64>> for DriverFilter {
    fn from(driver_id: Option<u64>) -> Self {
        driver_id.map_or(Self::Unassigned, Self::from)
    }
}

/// One stop on a driver's route with its order and customer profile.
///
/// `order` and `profile` are `None` when the related record could not be
/// loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeliveryStop {
    /// The delivery.
    pub delivery: DeliveryInfo,
    /// Order being delivered.
    pub order: Option<Order>,
    /// Profile of the ordering user.
    pub profile: Option<UserProfile>,
}

impl Located for DeliveryStop {
    fn location(&self) -> Coord<f64> {
        self.delivery.location
    }
}

/// Join deliveries with their orders and profiles, then order them from
/// `start` with [`optimize_route`].
///
/// `orders` is keyed by order id and `profiles` by profile id. Missing
/// entries leave the corresponding field empty rather than dropping the stop.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use geo::Coord;
/// use mealdrop_core::{assemble_route, test_support::delivery_at};
///
/// let deliveries = vec![delivery_at(1, 10, 0.0, 3.0), delivery_at(2, 11, 0.0, 1.0)];
/// let stops = assemble_route(deliveries, &HashMap::new(), &HashMap::new(), Coord { x: 0.0, y: 0.0 });
///
/// let order: Vec<_> = stops.iter().map(|stop| stop.delivery.id).collect();
/// assert_eq!(order, vec![2, 1]);
/// assert!(stops.iter().all(|stop| stop.order.is_none()));
/// ```
#[must_use]
pub fn assemble_route<S>(
    deliveries: Vec<DeliveryInfo>,
    orders: &HashMap<u64, Order, S>,
    profiles: &HashMap<u64, UserProfile, S>,
    start: Coord<f64>,
) -> Vec<DeliveryStop>
where
    S: std::hash::BuildHasher,
{
    let stops: Vec<DeliveryStop> = deliveries
        .into_iter()
        .map(|delivery| {
            let order = orders.get(&delivery.order_id).cloned();
            if order.is_none() {
                warn!(
                    "order {} for delivery {} could not be loaded",
                    delivery.order_id, delivery.id
                );
            }
            let profile = order
                .as_ref()
                .and_then(|o| profiles.get(&o.user_profile_id))
                .cloned();
            DeliveryStop {
                delivery,
                order,
                profile,
            }
        })
        .collect();
    optimize_route(&stops, start)
}
