//! Resolve free-text addresses to coordinates.
//!
//! The [`Geocoder`] trait abstracts the external lookup used when profiles
//! and meal centers are registered. Implementations are synchronous and may
//! block on network I/O.

mod error;
mod provider;

pub use error::GeocodeError;
pub use provider::Geocoder;
