//! Facade crate for the mealdrop delivery service.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! and the HTTP geocoder behind feature flags.

#![forbid(unsafe_code)]

pub use mealdrop_core::{
    DaysMeals, DeliveryAddress, DeliveryInfo, DeliveryStatus, DeliveryStop, DietaryRestriction,
    DomainError, DriverFilter, EARTH_RADIUS_KM, Entity, GeocodeError, Geocoder, Located,
    MealCenter, MealOption, NewMealCenter, NewMealOption, NewMealPlan, NewProfile, Order,
    OrderDetails, OrderItem, OrderStatus, PurchaseRequest, UserProfile, ValidationError,
    assemble_route, haversine_km, optimize_route, route_distance_km,
};

#[cfg(feature = "store-sqlite")]
pub use mealdrop_core::{SqliteStore, StoreError, StoreOptions};

#[cfg(feature = "geocode-http")]
pub use mealdrop_data::geocoding::{NominatimConfig, NominatimGeocoder, ProviderBuildError};
