//! Test utilities for geocoding.
//!
//! [`StubGeocoder`] returns one pre-configured answer for every non-blank
//! address without making HTTP requests.

use geo::Coord;
use mealdrop_core::{GeocodeError, Geocoder};

/// Stub `Geocoder` for testing.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use mealdrop_core::{GeocodeError, Geocoder};
/// use mealdrop_data::geocoding::test_support::StubGeocoder;
///
/// let geocoder = StubGeocoder::with_location(Coord { x: -1.55, y: 53.8 });
/// assert_eq!(geocoder.lookup("Leeds"), Ok(Coord { x: -1.55, y: 53.8 }));
/// assert_eq!(geocoder.lookup(" "), Err(GeocodeError::EmptyAddress));
/// ```
#[derive(Debug, Clone)]
pub struct StubGeocoder {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Location(Coord<f64>),
    Error(GeocodeError),
}

impl StubGeocoder {
    /// Create a geocoder that resolves every address to `location`.
    #[must_use]
    pub const fn with_location(location: Coord<f64>) -> Self {
        Self {
            response: StubResponse::Location(location),
        }
    }

    /// Create a geocoder that fails every lookup with `error`.
    ///
    /// Blank addresses still fail with [`GeocodeError::EmptyAddress`].
    #[must_use]
    pub const fn with_error(error: GeocodeError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }
}

impl Geocoder for StubGeocoder {
    fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        match &self.response {
            StubResponse::Location(location) => Ok(*location),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
