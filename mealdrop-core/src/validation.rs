//! Field checks applied when constructing new records.
//!
//! Limits are counted in characters, not bytes.

use geo::Coord;
use thiserror::Error;

/// Rejected input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field was blank.
    #[error("{field} is required")]
    Required {
        /// Name of the field.
        field: &'static str,
    },
    /// A text field exceeded its length limit.
    #[error("{field} must be at most {max} characters, got {len}")]
    TooLong {
        /// Name of the field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
        /// Length that was supplied.
        len: usize,
    },
    /// A monetary amount was negative or not finite.
    #[error("{field} must be a non-negative amount, got {value}")]
    NegativeAmount {
        /// Name of the field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A coordinate component lay outside WGS84 bounds.
    #[error("{field} {value} is outside the valid range")]
    InvalidLocation {
        /// `latitude` or `longitude`.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

pub(crate) fn required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    at_most(field, value, max)
}

pub(crate) fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, max, len });
    }
    Ok(())
}

pub(crate) fn amount(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NegativeAmount { field, value })
    }
}

/// Check that `location` is a finite WGS84 position.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mealdrop_core::{ValidationError, validate_location};
///
/// assert!(validate_location(Coord { x: -0.12, y: 51.5 }).is_ok());
/// assert!(matches!(
///     validate_location(Coord { x: 0.0, y: 91.0 }),
///     Err(ValidationError::InvalidLocation { field: "latitude", .. })
/// ));
/// ```
pub fn validate_location(location: Coord<f64>) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&location.y) {
        return Err(ValidationError::InvalidLocation {
            field: "latitude",
            value: location.y,
        });
    }
    if !(-180.0..=180.0).contains(&location.x) {
        return Err(ValidationError::InvalidLocation {
            field: "longitude",
            value: location.x,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_text_is_required(#[case] value: &str) {
        assert_eq!(
            required("name", value, 10),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[rstest]
    fn length_counts_characters() {
        assert!(required("name", "ééééé", 5).is_ok());
        assert_eq!(
            at_most("name", "ééééé!", 5),
            Err(ValidationError::TooLong {
                field: "name",
                max: 5,
                len: 6
            })
        );
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(12.5, true)]
    #[case(-0.01, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn amounts_must_be_finite_and_non_negative(#[case] value: f64, #[case] ok: bool) {
        assert_eq!(amount("price", value).is_ok(), ok);
    }

    #[rstest]
    #[case(Coord { x: 180.0, y: 90.0 }, None)]
    #[case(Coord { x: -180.0, y: -90.0 }, None)]
    #[case(Coord { x: 0.0, y: 90.5 }, Some("latitude"))]
    #[case(Coord { x: 181.0, y: 0.0 }, Some("longitude"))]
    #[case(Coord { x: 0.0, y: f64::NAN }, Some("latitude"))]
    fn location_bounds(#[case] location: Coord<f64>, #[case] failing: Option<&str>) {
        let result = validate_location(location);
        match failing {
            None => assert!(result.is_ok()),
            Some(name) => assert!(matches!(
                result,
                Err(ValidationError::InvalidLocation { field, .. }) if field == name
            )),
        }
    }
}
