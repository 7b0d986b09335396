//! Core domain types and operations for the mealdrop delivery service.
//!
//! The crate covers the catalog of meal centers, plans and options, user
//! delivery profiles, the inventory-aware order ledger and the assembly of
//! driver routes. Route ordering uses a nearest-neighbour heuristic over
//! Haversine distances. Persistent operations live on [`SqliteStore`] behind
//! the `store-sqlite` feature.

#![forbid(unsafe_code)]

mod catalog;
mod delivery;
mod distance;
mod error;
pub mod geocode;
mod order;
mod profile;
mod route;
#[cfg(feature = "store-sqlite")]
pub mod store;
#[doc(hidden)]
pub mod test_support;
mod validation;

pub use catalog::{
    DaysMeals, DietaryRestriction, MealCenter, MealOption, NewMealCenter, NewMealOption,
    NewMealPlan,
};
pub use delivery::{DeliveryInfo, DeliveryStatus, DeliveryStop, DriverFilter, assemble_route};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use error::{DomainError, Entity};
pub use geocode::{GeocodeError, Geocoder};
pub use order::{
    DeliveryAddress, Order, OrderDetails, OrderItem, OrderStatus, ParseStatusError,
    PurchaseRequest,
};
pub use profile::{NewProfile, UserProfile};
pub use route::{Located, optimize_route, route_distance_km};
pub use validation::{ValidationError, validate_location};

#[cfg(feature = "store-sqlite")]
pub use store::{DEFAULT_BUSY_TIMEOUT, SqliteStore, StoreError, StoreOptions};
