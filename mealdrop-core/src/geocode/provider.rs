//! Geocoder trait.

use geo::Coord;

use super::error::GeocodeError;

/// Look up the position of a street address.
///
/// Implementations return `x = longitude`, `y = latitude` in WGS84 degrees.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use mealdrop_core::{GeocodeError, Geocoder};
///
/// struct Everywhere;
///
/// impl Geocoder for Everywhere {
///     fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
///         if address.trim().is_empty() {
///             return Err(GeocodeError::EmptyAddress);
///         }
///         Ok(Coord { x: 0.0, y: 0.0 })
///     }
/// }
///
/// assert_eq!(Everywhere.lookup("1 High St")?, Coord { x: 0.0, y: 0.0 });
/// assert_eq!(Everywhere.lookup(" "), Err(GeocodeError::EmptyAddress));
/// # Ok::<(), GeocodeError>(())
/// ```
pub trait Geocoder {
    /// Resolve `address` to a coordinate.
    ///
    /// Implementations must return `Err(GeocodeError::EmptyAddress)` when
    /// `address` is blank.
    fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn lookup(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        (**self).lookup(address)
    }
}
