//! HTTP geocoding against a Nominatim-compatible search API.
//!
//! [`NominatimGeocoder`] implements [`mealdrop_core::Geocoder`] by issuing
//! `GET {base_url}/search?q={address}&format=json&limit=1` and reading the
//! first match. The synchronous trait is served by blocking on an internal
//! Tokio runtime.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use mealdrop_core::Geocoder;
//! use mealdrop_data::geocoding::{NominatimConfig, NominatimGeocoder};
//!
//! let config = NominatimConfig::new("https://nominatim.openstreetmap.org")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-kitchen/1.0");
//! let geocoder = NominatimGeocoder::with_config(config)?;
//!
//! let location = geocoder.lookup("10 Downing Street, London")?;
//! println!("{}, {}", location.y, location.x);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod nominatim;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, NominatimConfig, NominatimGeocoder,
    ProviderBuildError,
};
