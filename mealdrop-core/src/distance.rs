//! Great-circle distance between WGS84 coordinates.
//!
//! Distances use the Haversine formula over a spherical Earth with a fixed
//! radius of 6371 km. Altitude and ellipsoidal corrections are ignored.

use geo::Coord;

/// Mean Earth radius in kilometres used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Return the great-circle distance between two points in kilometres.
///
/// Coordinates use `x = longitude` and `y = latitude` in degrees.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mealdrop_core::haversine_km;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let north = Coord { x: 0.0, y: 1.0 };
///
/// assert_eq!(haversine_km(origin, origin), 0.0);
/// assert!((haversine_km(origin, north) - 111.195).abs() < 1e-3);
/// ```
#[must_use]
pub fn haversine_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let from_lat = from.y.to_radians();
    let from_lon = from.x.to_radians();
    let to_lat = to.y.to_radians();
    let to_lon = to.x.to_radians();

    let half_dlat = ((to_lat - from_lat) / 2.0).sin();
    let half_dlon = ((to_lon - from_lon) / 2.0).sin();

    // Rounding can push `a` fractionally above one for antipodal points.
    // `clamp` keeps NaN input as NaN.
    let a = (half_dlat * half_dlat + from_lat.cos() * to_lat.cos() * half_dlon * half_dlon)
        .clamp(0.0, 1.0);
    let central_angle = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * central_angle
}
