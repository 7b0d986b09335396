//! Column lists, row decoding and shared lookups.

use std::collections::HashMap;

use geo::Coord;
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    catalog::{DaysMeals, DietaryRestriction, MealCenter, MealOption},
    delivery::{DeliveryInfo, DeliveryStatus},
    error::{DomainError, Entity},
    order::{Order, OrderDetails, OrderItem, OrderStatus},
    profile::UserProfile,
};

use super::StoreError;

/// SQLite limits bound parameters per statement to 999 by default. Lookups
/// by id chunk their `IN` lists to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

pub(super) const MEAL_CENTER_COLUMNS: &str =
    "id, name, address, phone_number, longitude, latitude, is_active";
pub(super) const DAYS_MEALS_COLUMNS: &str =
    "id, meal_center_id, name, description, meal_date, is_active";
pub(super) const MEAL_OPTION_COLUMNS: &str = "id, days_meals_id, name, description, price, \
     nutritional_info, is_available, max_daily_quantity, current_daily_quantity";
pub(super) const PROFILE_COLUMNS: &str = "id, user_id, address, longitude, latitude, \
     phone_number, delivery_notes, dietary_notes";
pub(super) const ORDER_COLUMNS: &str =
    "id, user_id, user_profile_id, status, delivery_date, note, total_price";
pub(super) const DELIVERY_COLUMNS: &str = "id, order_id, driver_id, scheduled_time, actual_time, \
     status, notes, address, longitude, latitude, custom_address";

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrderStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for DeliveryStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DeliveryStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

fn coord(row: &Row<'_>, longitude: usize, latitude: usize) -> rusqlite::Result<Coord<f64>> {
    Ok(Coord {
        x: row.get(longitude)?,
        y: row.get(latitude)?,
    })
}

pub(super) fn meal_center(row: &Row<'_>) -> rusqlite::Result<MealCenter> {
    Ok(MealCenter {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        phone_number: row.get(3)?,
        location: coord(row, 4, 5)?,
        is_active: row.get(6)?,
    })
}

pub(super) fn days_meals(row: &Row<'_>) -> rusqlite::Result<DaysMeals> {
    Ok(DaysMeals {
        id: row.get(0)?,
        meal_center_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        meal_date: row.get(4)?,
        is_active: row.get(5)?,
    })
}

pub(super) fn dietary_restriction(row: &Row<'_>) -> rusqlite::Result<DietaryRestriction> {
    Ok(DietaryRestriction {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn meal_option(row: &Row<'_>) -> rusqlite::Result<MealOption> {
    Ok(MealOption {
        id: row.get(0)?,
        days_meals_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        nutritional_info: row.get(5)?,
        is_available: row.get(6)?,
        max_daily_quantity: row.get(7)?,
        current_daily_quantity: row.get(8)?,
        dietary_restrictions: Vec::new(),
    })
}

fn profile(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        address: row.get(2)?,
        location: coord(row, 3, 4)?,
        phone_number: row.get(5)?,
        delivery_notes: row.get(6)?,
        dietary_notes: row.get(7)?,
        dietary_restrictions: Vec::new(),
    })
}

pub(super) fn order(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_profile_id: row.get(2)?,
        status: row.get(3)?,
        delivery_date: row.get(4)?,
        note: row.get(5)?,
        total_price: row.get(6)?,
    })
}

fn order_item(row: &Row<'_>) -> rusqlite::Result<OrderItem> {
    Ok(OrderItem {
        id: row.get(0)?,
        order_id: row.get(1)?,
        meal_option_id: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
    })
}

pub(super) fn delivery(row: &Row<'_>) -> rusqlite::Result<DeliveryInfo> {
    Ok(DeliveryInfo {
        id: row.get(0)?,
        order_id: row.get(1)?,
        driver_id: row.get(2)?,
        scheduled_time: row.get(3)?,
        actual_time: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        address: row.get(7)?,
        location: coord(row, 8, 9)?,
        custom_address: row.get(10)?,
    })
}

/// Run `sql` once per chunk of `ids`, substituting `{ids}` with placeholders.
pub(super) fn query_by_ids<T, F>(
    connection: &Connection,
    sql: &str,
    ids: &[u64],
    mut map: F,
) -> Result<Vec<T>, StoreError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut found = Vec::new();
    for chunk in unique.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let query = sql.replace("{ids}", &placeholders);
        let mut statement = connection.prepare(&query)?;
        let rows = statement.query_map(params_from_iter(chunk.iter()), &mut map)?;
        for row in rows {
            found.push(row?);
        }
    }
    Ok(found)
}

pub(super) fn ensure_exists(
    connection: &Connection,
    entity: Entity,
    id: u64,
) -> Result<(), StoreError> {
    let table = match entity {
        Entity::MealCenter => "meal_centers",
        Entity::MealPlan => "days_meals",
        Entity::MealOption => "meal_options",
        Entity::DietaryRestriction => "dietary_restrictions",
        Entity::Profile => "user_profiles",
        Entity::Order => "orders",
        Entity::Delivery => "delivery_infos",
    };
    let found = connection
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id], |_| {
            Ok(())
        })
        .optional()?;
    found.ok_or_else(|| DomainError::not_found(entity, id).into())
}

pub(super) fn load_meal_center(
    connection: &Connection,
    id: u64,
) -> Result<Option<MealCenter>, StoreError> {
    Ok(connection
        .query_row(
            &format!("SELECT {MEAL_CENTER_COLUMNS} FROM meal_centers WHERE id = ?1"),
            [id],
            meal_center,
        )
        .optional()?)
}

pub(super) fn load_days_meals(
    connection: &Connection,
    id: u64,
) -> Result<Option<DaysMeals>, StoreError> {
    Ok(connection
        .query_row(
            &format!("SELECT {DAYS_MEALS_COLUMNS} FROM days_meals WHERE id = ?1"),
            [id],
            days_meals,
        )
        .optional()?)
}

/// Load restriction links for the given owners, keyed by owner id.
///
/// `link_table` and `owner_column` name the many-to-many table.
fn load_restrictions(
    connection: &Connection,
    link_table: &str,
    owner_column: &str,
    owner_ids: &[u64],
) -> Result<HashMap<u64, Vec<DietaryRestriction>>, StoreError> {
    let sql = format!(
        "SELECT l.{owner_column}, r.id, r.name, r.description
         FROM {link_table} l
         JOIN dietary_restrictions r ON r.id = l.dietary_restriction_id
         WHERE l.{owner_column} IN ({{ids}})
         ORDER BY r.id"
    );
    let links = query_by_ids(connection, &sql, owner_ids, |row| {
        Ok((
            row.get::<_, u64>(0)?,
            DietaryRestriction {
                id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
            },
        ))
    })?;

    let mut by_owner: HashMap<u64, Vec<DietaryRestriction>> = HashMap::new();
    for (owner, restriction) in links {
        by_owner.entry(owner).or_default().push(restriction);
    }
    Ok(by_owner)
}

fn attach_option_restrictions(
    connection: &Connection,
    mut options: Vec<MealOption>,
) -> Result<Vec<MealOption>, StoreError> {
    let ids: Vec<u64> = options.iter().map(|option| option.id).collect();
    let mut links = load_restrictions(
        connection,
        "meal_dietary_restrictions",
        "meal_option_id",
        &ids,
    )?;
    for option in &mut options {
        option.dietary_restrictions = links.remove(&option.id).unwrap_or_default();
    }
    Ok(options)
}

fn attach_profile_restrictions(
    connection: &Connection,
    mut profiles: Vec<UserProfile>,
) -> Result<Vec<UserProfile>, StoreError> {
    let ids: Vec<u64> = profiles.iter().map(|profile| profile.id).collect();
    let mut links = load_restrictions(
        connection,
        "user_dietary_restrictions",
        "user_profile_id",
        &ids,
    )?;
    for profile in &mut profiles {
        profile.dietary_restrictions = links.remove(&profile.id).unwrap_or_default();
    }
    Ok(profiles)
}

pub(super) fn load_meal_options(
    connection: &Connection,
    filter: &str,
    param: u64,
) -> Result<Vec<MealOption>, StoreError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {MEAL_OPTION_COLUMNS} FROM meal_options WHERE {filter} = ?1 ORDER BY id"
    ))?;
    let options = statement
        .query_map([param], meal_option)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_option_restrictions(connection, options)
}

pub(super) fn load_meal_option(
    connection: &Connection,
    id: u64,
) -> Result<Option<MealOption>, StoreError> {
    Ok(load_meal_options(connection, "id", id)?.into_iter().next())
}

fn load_profiles(
    connection: &Connection,
    filter: &str,
    param: u64,
) -> Result<Vec<UserProfile>, StoreError> {
    let mut statement = connection.prepare(&format!(
        "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE {filter} = ?1"
    ))?;
    let profiles = statement
        .query_map([param], profile)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    attach_profile_restrictions(connection, profiles)
}

pub(super) fn load_profile_by_user(
    connection: &Connection,
    user_id: u64,
) -> Result<Option<UserProfile>, StoreError> {
    Ok(load_profiles(connection, "user_id", user_id)?.into_iter().next())
}

pub(super) fn load_profile(
    connection: &Connection,
    id: u64,
) -> Result<Option<UserProfile>, StoreError> {
    Ok(load_profiles(connection, "id", id)?.into_iter().next())
}

pub(super) fn load_profiles_by_ids(
    connection: &Connection,
    ids: &[u64],
) -> Result<HashMap<u64, UserProfile>, StoreError> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id IN ({{ids}})");
    let profiles = query_by_ids(connection, &sql, ids, profile)?;
    Ok(attach_profile_restrictions(connection, profiles)?
        .into_iter()
        .map(|profile| (profile.id, profile))
        .collect())
}

pub(super) fn load_order(connection: &Connection, id: u64) -> Result<Option<Order>, StoreError> {
    Ok(connection
        .query_row(
            &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
            [id],
            order,
        )
        .optional()?)
}

pub(super) fn load_orders_by_ids(
    connection: &Connection,
    ids: &[u64],
) -> Result<HashMap<u64, Order>, StoreError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id IN ({{ids}})");
    Ok(query_by_ids(connection, &sql, ids, order)?
        .into_iter()
        .map(|order| (order.id, order))
        .collect())
}

pub(super) fn load_order_items(
    connection: &Connection,
    order_id: u64,
) -> Result<Vec<OrderItem>, StoreError> {
    let mut statement = connection.prepare(
        "SELECT id, order_id, meal_option_id, quantity, price
         FROM order_items WHERE order_id = ?1 ORDER BY id",
    )?;
    let items = statement
        .query_map([order_id], order_item)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(items)
}

pub(super) fn load_delivery(
    connection: &Connection,
    filter: &str,
    param: u64,
) -> Result<Option<DeliveryInfo>, StoreError> {
    Ok(connection
        .query_row(
            &format!("SELECT {DELIVERY_COLUMNS} FROM delivery_infos WHERE {filter} = ?1"),
            [param],
            delivery,
        )
        .optional()?)
}

/// Load the items, profile and delivery belonging to `order`.
pub(super) fn load_order_details(
    connection: &Connection,
    order: Order,
) -> Result<OrderDetails, StoreError> {
    let items = load_order_items(connection, order.id)?;
    let profile = load_profile(connection, order.user_profile_id)?
        .ok_or(DomainError::not_found(Entity::Profile, order.user_profile_id))?;
    let delivery = load_delivery(connection, "order_id", order.id)?;
    Ok(OrderDetails {
        order,
        items,
        profile,
        delivery,
    })
}
