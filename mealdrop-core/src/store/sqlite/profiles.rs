//! Delivery profiles and their dietary restriction links.

use geo::Coord;
use log::info;
use rusqlite::params;

use crate::{
    error::{DomainError, Entity},
    geocode::Geocoder,
    profile::{NewProfile, UserProfile},
    validation::validate_location,
};

use super::{
    SqliteStore, StoreError,
    catalog::link_restrictions,
    rows::{load_profile, load_profile_by_user},
};

impl SqliteStore {
    /// Create or replace the delivery profile of `user_id`.
    ///
    /// When `profile.dietary_restriction_ids` is `Some`, the user's
    /// restriction links are replaced by that set. `None` leaves them as
    /// they are.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] for an out-of-range location and
    /// [`DomainError::NotFound`] for an unknown restriction. Nothing is
    /// written in either case.
    pub fn upsert_profile(
        &mut self,
        user_id: u64,
        profile: &NewProfile,
        location: Coord<f64>,
    ) -> Result<UserProfile, StoreError> {
        validate_location(location)?;
        let transaction = self.write_transaction()?;
        let id: u64 = transaction.query_row(
            "INSERT INTO user_profiles (user_id, address, longitude, latitude, phone_number,
                                        delivery_notes, dietary_notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id) DO UPDATE SET
                 address = excluded.address,
                 longitude = excluded.longitude,
                 latitude = excluded.latitude,
                 phone_number = excluded.phone_number,
                 delivery_notes = excluded.delivery_notes,
                 dietary_notes = excluded.dietary_notes
             RETURNING id",
            params![
                user_id,
                profile.address,
                location.x,
                location.y,
                profile.phone_number,
                profile.delivery_notes,
                profile.dietary_notes
            ],
            |row| row.get(0),
        )?;
        if let Some(restriction_ids) = &profile.dietary_restriction_ids {
            transaction.execute(
                "DELETE FROM user_dietary_restrictions WHERE user_profile_id = ?1",
                [id],
            )?;
            link_restrictions(
                &transaction,
                "user_dietary_restrictions",
                "user_profile_id",
                id,
                restriction_ids,
            )?;
        }
        let saved = load_profile(&transaction, id)?
            .ok_or(DomainError::not_found(Entity::Profile, id))?;
        transaction.commit()?;
        info!("saved profile {id} for user {user_id}");
        Ok(saved)
    }

    /// Geocode the profile address, then save it.
    ///
    /// Nothing is written when the lookup fails.
    ///
    /// # Errors
    /// Returns [`StoreError::Geocode`] when the address cannot be resolved,
    /// otherwise as [`SqliteStore::upsert_profile`].
    pub fn register_profile<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        user_id: u64,
        profile: &NewProfile,
    ) -> Result<UserProfile, StoreError> {
        let location = geocoder.lookup(&profile.address)?;
        self.upsert_profile(user_id, profile, location)
    }

    /// Delivery profile of `user_id`, if one has been saved.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn profile_for_user(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
        load_profile_by_user(&self.connection, user_id)
    }
}
