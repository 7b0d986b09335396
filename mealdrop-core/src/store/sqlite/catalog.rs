//! Meal centers, plans, options and dietary restrictions.

use geo::Coord;
use log::info;
use rusqlite::{Connection, params};

use crate::{
    catalog::{DaysMeals, DietaryRestriction, MealCenter, MealOption, NewMealCenter, NewMealOption, NewMealPlan},
    error::{DomainError, Entity},
    geocode::Geocoder,
    validation::{at_most, required, validate_location},
};

use super::{
    SqliteStore, StoreError,
    rows::{
        self, DAYS_MEALS_COLUMNS, MEAL_CENTER_COLUMNS, ensure_exists, load_days_meals,
        load_meal_center, load_meal_option, load_meal_options,
    },
};

impl SqliteStore {
    /// Store a new, active meal center at `location`.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] for an out-of-range location.
    pub fn create_meal_center(
        &mut self,
        center: &NewMealCenter,
        location: Coord<f64>,
    ) -> Result<MealCenter, StoreError> {
        validate_location(location)?;
        let id: u64 = self.connection.query_row(
            "INSERT INTO meal_centers (name, address, phone_number, longitude, latitude, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1) RETURNING id",
            params![
                center.name,
                center.address,
                center.phone_number,
                location.x,
                location.y
            ],
            |row| row.get(0),
        )?;
        info!("created meal center {id}");
        self.meal_center(id)
    }

    /// Geocode the center's address, then store it.
    ///
    /// Nothing is written when the lookup fails.
    ///
    /// # Errors
    /// Returns [`StoreError::Geocode`] when the address cannot be resolved.
    pub fn register_meal_center<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        center: &NewMealCenter,
    ) -> Result<MealCenter, StoreError> {
        let location = geocoder.lookup(&center.address)?;
        self.create_meal_center(center, location)
    }

    /// All meal centers ordered by id.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn meal_centers(&self) -> Result<Vec<MealCenter>, StoreError> {
        let mut statement = self
            .connection
            .prepare(&format!("SELECT {MEAL_CENTER_COLUMNS} FROM meal_centers ORDER BY id"))?;
        let centers = statement
            .query_map([], rows::meal_center)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(centers)
    }

    /// Look up a meal center.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `id` is unknown.
    pub fn meal_center(&self, id: u64) -> Result<MealCenter, StoreError> {
        load_meal_center(&self.connection, id)?
            .ok_or_else(|| DomainError::not_found(Entity::MealCenter, id).into())
    }

    /// Store a new, active meal plan.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when the meal center does not exist.
    pub fn create_meal_plan(&mut self, plan: &NewMealPlan) -> Result<DaysMeals, StoreError> {
        let transaction = self.write_transaction()?;
        ensure_exists(&transaction, Entity::MealCenter, plan.meal_center_id)?;
        let id: u64 = transaction.query_row(
            "INSERT INTO days_meals (meal_center_id, name, description, meal_date, is_active)
             VALUES (?1, ?2, ?3, ?4, 1) RETURNING id",
            params![plan.meal_center_id, plan.name, plan.description, plan.meal_date],
            |row| row.get(0),
        )?;
        transaction.commit()?;
        info!("created meal plan {id} for center {}", plan.meal_center_id);
        self.meal_plan(id)
    }

    /// Look up a meal plan.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `id` is unknown.
    pub fn meal_plan(&self, id: u64) -> Result<DaysMeals, StoreError> {
        load_days_meals(&self.connection, id)?
            .ok_or_else(|| DomainError::not_found(Entity::MealPlan, id).into())
    }

    /// Meal plans ordered by date, optionally limited to one center.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn meal_plans(&self, meal_center_id: Option<u64>) -> Result<Vec<DaysMeals>, StoreError> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {DAYS_MEALS_COLUMNS} FROM days_meals
             WHERE ?1 IS NULL OR meal_center_id = ?1
             ORDER BY meal_date, id"
        ))?;
        let plans = statement
            .query_map([meal_center_id], rows::days_meals)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }

    /// Store a new meal option with its dietary restriction links.
    ///
    /// The option starts available with nothing sold.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when the plan or any restriction
    /// does not exist. Nothing is written in that case.
    pub fn create_meal_option(&mut self, option: &NewMealOption) -> Result<MealOption, StoreError> {
        let transaction = self.write_transaction()?;
        ensure_exists(&transaction, Entity::MealPlan, option.days_meals_id)?;
        let id: u64 = transaction.query_row(
            "INSERT INTO meal_options (days_meals_id, name, description, price, nutritional_info,
                                       is_available, max_daily_quantity, current_daily_quantity)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, 0) RETURNING id",
            params![
                option.days_meals_id,
                option.name,
                option.description,
                option.price,
                option.nutritional_info,
                option.max_daily_quantity
            ],
            |row| row.get(0),
        )?;
        link_restrictions(
            &transaction,
            "meal_dietary_restrictions",
            "meal_option_id",
            id,
            &option.dietary_restriction_ids,
        )?;
        transaction.commit()?;
        info!("created meal option {id} in plan {}", option.days_meals_id);
        self.meal_option(id)
    }

    /// Look up a meal option with its dietary restrictions.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `id` is unknown.
    pub fn meal_option(&self, id: u64) -> Result<MealOption, StoreError> {
        load_meal_option(&self.connection, id)?
            .ok_or_else(|| DomainError::not_found(Entity::MealOption, id).into())
    }

    /// Options of a meal plan ordered by id. Unknown plans have no options.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn meal_options_for_plan(&self, days_meals_id: u64) -> Result<Vec<MealOption>, StoreError> {
        load_meal_options(&self.connection, "days_meals_id", days_meals_id)
    }

    /// Withdraw a meal option from sale or put it back.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `id` is unknown.
    pub fn set_meal_option_availability(
        &mut self,
        id: u64,
        is_available: bool,
    ) -> Result<MealOption, StoreError> {
        let changed = self.connection.execute(
            "UPDATE meal_options SET is_available = ?1 WHERE id = ?2",
            params![is_available, id],
        )?;
        if changed == 0 {
            return Err(DomainError::not_found(Entity::MealOption, id).into());
        }
        self.meal_option(id)
    }

    /// Store a new dietary restriction.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] when the name is blank or a field
    /// is too long.
    pub fn create_dietary_restriction(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<DietaryRestriction, StoreError> {
        required("name", name, 255)?;
        at_most("description", description, 1000)?;
        let restriction = self.connection.query_row(
            "INSERT INTO dietary_restrictions (name, description) VALUES (?1, ?2)
             RETURNING id, name, description",
            params![name, description],
            rows::dietary_restriction,
        )?;
        Ok(restriction)
    }

    /// All dietary restrictions ordered by id.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn dietary_restrictions(&self) -> Result<Vec<DietaryRestriction>, StoreError> {
        let mut statement = self
            .connection
            .prepare("SELECT id, name, description FROM dietary_restrictions ORDER BY id")?;
        let restrictions = statement
            .query_map([], rows::dietary_restriction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(restrictions)
    }
}

/// Insert links from `owner_id` to each restriction, failing on unknown ids.
pub(super) fn link_restrictions(
    connection: &Connection,
    link_table: &str,
    owner_column: &str,
    owner_id: u64,
    restriction_ids: &[u64],
) -> Result<(), StoreError> {
    let sql = format!(
        "INSERT OR IGNORE INTO {link_table} ({owner_column}, dietary_restriction_id) VALUES (?1, ?2)"
    );
    for restriction_id in restriction_ids {
        ensure_exists(connection, Entity::DietaryRestriction, *restriction_id)?;
        connection.execute(&sql, params![owner_id, restriction_id])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedGeocoder, tomorrow};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open store")
    }

    fn center(store: &mut SqliteStore) -> MealCenter {
        store
            .create_meal_center(
                &NewMealCenter::new("Central", "1 High St", "0123").expect("valid center"),
                Coord { x: -1.0, y: 52.0 },
            )
            .expect("create center")
    }

    #[rstest]
    fn centers_are_created_active(mut store: SqliteStore) {
        let created = center(&mut store);
        assert!(created.is_active);
        assert_eq!(created.location, Coord { x: -1.0, y: 52.0 });
        assert_eq!(store.meal_centers().expect("list"), vec![created]);
    }

    #[rstest]
    fn center_location_is_validated(mut store: SqliteStore) {
        let err = store
            .create_meal_center(
                &NewMealCenter::new("Central", "1 High St", "0123").expect("valid center"),
                Coord { x: 0.0, y: 123.0 },
            )
            .expect_err("latitude out of range");
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.meal_centers().expect("list").is_empty());
    }

    #[rstest]
    fn registration_geocodes_the_address(mut store: SqliteStore) {
        let geocoder = FixedGeocoder::default().with_address("1 High St", Coord { x: 2.0, y: 48.0 });
        let center = store
            .register_meal_center(
                &geocoder,
                &NewMealCenter::new("Central", "1 High St", "0123").expect("valid center"),
            )
            .expect("register center");
        assert_eq!(center.location, Coord { x: 2.0, y: 48.0 });
    }

    #[rstest]
    fn failed_geocoding_writes_nothing(mut store: SqliteStore) {
        let err = store
            .register_meal_center(
                &FixedGeocoder::default(),
                &NewMealCenter::new("Central", "1 High St", "0123").expect("valid center"),
            )
            .expect_err("unknown address");
        assert!(matches!(err, StoreError::Geocode(_)));
        assert!(store.meal_centers().expect("list").is_empty());
    }

    #[rstest]
    fn meal_center_lookup_misses(store: SqliteStore) {
        let err = store.meal_center(42).expect_err("no such center");
        assert_eq!(
            err.domain(),
            Some(&DomainError::not_found(Entity::MealCenter, 42))
        );
    }

    #[rstest]
    fn plans_require_an_existing_center(mut store: SqliteStore) {
        let plan = NewMealPlan::new(9, "Monday", "", Utc::now()).expect("valid plan");
        let err = store.create_meal_plan(&plan).expect_err("no such center");
        assert_eq!(
            err.domain(),
            Some(&DomainError::not_found(Entity::MealCenter, 9))
        );
    }

    #[rstest]
    fn plans_are_filtered_by_center(mut store: SqliteStore) {
        let first = center(&mut store);
        let second = center(&mut store);
        let date = tomorrow();
        store
            .create_meal_plan(&NewMealPlan::new(first.id, "A", "", date).expect("valid plan"))
            .expect("plan A");
        store
            .create_meal_plan(&NewMealPlan::new(second.id, "B", "", date).expect("valid plan"))
            .expect("plan B");

        let all = store.meal_plans(None).expect("all plans");
        let only_second = store.meal_plans(Some(second.id)).expect("filtered plans");
        assert_eq!(all.len(), 2);
        assert_eq!(only_second.len(), 1);
        assert!(only_second.iter().all(|plan| plan.meal_center_id == second.id));
    }

    #[rstest]
    fn plan_dates_survive_storage(mut store: SqliteStore) {
        let owner = center(&mut store);
        let date = tomorrow();
        let plan = store
            .create_meal_plan(&NewMealPlan::new(owner.id, "A", "Soup day", date).expect("valid"))
            .expect("plan");
        assert_eq!(plan.meal_date, date);
        assert_eq!(plan.description, "Soup day");
    }

    #[rstest]
    fn options_link_restrictions(mut store: SqliteStore) {
        let owner = center(&mut store);
        let plan = store
            .create_meal_plan(&NewMealPlan::new(owner.id, "A", "", tomorrow()).expect("valid"))
            .expect("plan");
        let vegan = store
            .create_dietary_restriction("Vegan", "")
            .expect("restriction");
        let option = store
            .create_meal_option(
                &NewMealOption::new(plan.id, "Stew", "Bean stew", 5.0, "400 kcal", 10)
                    .expect("valid option")
                    .with_restrictions([vegan.id]),
            )
            .expect("option");

        assert!(option.is_available);
        assert_eq!(option.current_daily_quantity, 0);
        assert_eq!(option.dietary_restrictions, vec![vegan]);
        assert_eq!(store.meal_options_for_plan(plan.id).expect("list"), vec![option]);
    }

    #[rstest]
    fn unknown_restriction_rolls_back_the_option(mut store: SqliteStore) {
        let owner = center(&mut store);
        let plan = store
            .create_meal_plan(&NewMealPlan::new(owner.id, "A", "", tomorrow()).expect("valid"))
            .expect("plan");
        let err = store
            .create_meal_option(
                &NewMealOption::new(plan.id, "Stew", "Bean stew", 5.0, "400 kcal", 10)
                    .expect("valid option")
                    .with_restrictions([77]),
            )
            .expect_err("unknown restriction");
        assert_eq!(
            err.domain(),
            Some(&DomainError::not_found(Entity::DietaryRestriction, 77))
        );
        assert!(store.meal_options_for_plan(plan.id).expect("list").is_empty());
    }

    #[rstest]
    fn availability_can_be_toggled(mut store: SqliteStore) {
        let owner = center(&mut store);
        let plan = store
            .create_meal_plan(&NewMealPlan::new(owner.id, "A", "", tomorrow()).expect("valid"))
            .expect("plan");
        let option = store
            .create_meal_option(
                &NewMealOption::new(plan.id, "Stew", "Bean stew", 5.0, "400 kcal", 10)
                    .expect("valid option"),
            )
            .expect("option");
        let withdrawn = store
            .set_meal_option_availability(option.id, false)
            .expect("withdraw");
        assert!(!withdrawn.is_available);
        assert!(store.set_meal_option_availability(999, true).is_err());
    }

    #[rstest]
    fn restriction_names_are_required(mut store: SqliteStore) {
        let err = store
            .create_dietary_restriction(" ", "anything")
            .expect_err("blank name");
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
