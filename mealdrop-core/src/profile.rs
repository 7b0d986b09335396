//! Delivery profiles of registered users.

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    catalog::DietaryRestriction,
    route::Located,
    validation::{ValidationError, at_most, required},
};

const ADDRESS_MAX: usize = 255;
const PHONE_MAX: usize = 20;
const NOTES_MAX: usize = 255;

/// Where and how a user receives deliveries. Each user has at most one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserProfile {
    /// Unique identifier.
    pub id: u64,
    /// Owning user, supplied by the authentication layer.
    pub user_id: u64,
    /// Delivery address.
    pub address: String,
    /// Geocoded position of `address`.
    pub location: Coord<f64>,
    /// Contact phone number.
    pub phone_number: String,
    /// Instructions for the driver.
    pub delivery_notes: String,
    /// Free-text dietary preferences.
    pub dietary_notes: String,
    /// Linked dietary restrictions.
    pub dietary_restrictions: Vec<DietaryRestriction>,
}

impl Located for UserProfile {
    fn location(&self) -> Coord<f64> {
        self.location
    }
}

/// Validated profile fields awaiting geocoding and storage.
///
/// # Examples
/// ```
/// use mealdrop_core::NewProfile;
///
/// let profile = NewProfile::new("1 High St", "0123 456", "Ring twice", "No nuts")?
///     .with_restrictions([1, 3]);
/// assert_eq!(profile.dietary_restriction_ids, Some(vec![1, 3]));
/// # Ok::<(), mealdrop_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Delivery address, also used for geocoding.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Instructions for the driver, may be empty.
    pub delivery_notes: String,
    /// Free-text dietary preferences.
    pub dietary_notes: String,
    /// Replacement set of restriction links. `None` keeps existing links.
    pub dietary_restriction_ids: Option<Vec<u64>>,
}

impl NewProfile {
    /// Validate and construct a [`NewProfile`].
    ///
    /// # Errors
    /// Returns [`ValidationError`] when a required field is blank or any
    /// field is too long.
    pub fn new(
        address: impl Into<String>,
        phone_number: impl Into<String>,
        delivery_notes: impl Into<String>,
        dietary_notes: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let profile = Self {
            address: address.into(),
            phone_number: phone_number.into(),
            delivery_notes: delivery_notes.into(),
            dietary_notes: dietary_notes.into(),
            dietary_restriction_ids: None,
        };
        required("address", &profile.address, ADDRESS_MAX)?;
        required("phone_number", &profile.phone_number, PHONE_MAX)?;
        at_most("delivery_notes", &profile.delivery_notes, NOTES_MAX)?;
        required("dietary_notes", &profile.dietary_notes, NOTES_MAX)?;
        Ok(profile)
    }

    /// Replace the profile's dietary restriction links with `ids`.
    #[must_use]
    pub fn with_restrictions(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.dietary_restriction_ids = Some(ids.into_iter().collect());
        self
    }
}
