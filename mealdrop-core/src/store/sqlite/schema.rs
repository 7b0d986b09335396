//! Table definitions applied when a store is opened.

use rusqlite::Connection;

use super::StoreError;

/// Tables are created on first open. Coordinates are stored as separate
/// longitude and latitude columns in WGS84 degrees.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS meal_centers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    phone_number TEXT NOT NULL,
    longitude REAL NOT NULL,
    latitude REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS days_meals (
    id INTEGER PRIMARY KEY,
    meal_center_id INTEGER NOT NULL REFERENCES meal_centers(id),
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    meal_date TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);
CREATE INDEX IF NOT EXISTS days_meals_center ON days_meals(meal_center_id);

CREATE TABLE IF NOT EXISTS dietary_restrictions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meal_options (
    id INTEGER PRIMARY KEY,
    days_meals_id INTEGER NOT NULL REFERENCES days_meals(id),
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    nutritional_info TEXT NOT NULL,
    is_available INTEGER NOT NULL DEFAULT 1,
    max_daily_quantity INTEGER NOT NULL CHECK (max_daily_quantity >= 0),
    current_daily_quantity INTEGER NOT NULL DEFAULT 0
        CHECK (current_daily_quantity BETWEEN 0 AND max_daily_quantity)
);
CREATE INDEX IF NOT EXISTS meal_options_plan ON meal_options(days_meals_id);

CREATE TABLE IF NOT EXISTS meal_dietary_restrictions (
    meal_option_id INTEGER NOT NULL REFERENCES meal_options(id),
    dietary_restriction_id INTEGER NOT NULL REFERENCES dietary_restrictions(id),
    PRIMARY KEY (meal_option_id, dietary_restriction_id)
);

CREATE TABLE IF NOT EXISTS user_profiles (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL UNIQUE,
    address TEXT NOT NULL,
    longitude REAL NOT NULL,
    latitude REAL NOT NULL,
    phone_number TEXT NOT NULL,
    delivery_notes TEXT NOT NULL,
    dietary_notes TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_dietary_restrictions (
    user_profile_id INTEGER NOT NULL REFERENCES user_profiles(id),
    dietary_restriction_id INTEGER NOT NULL REFERENCES dietary_restrictions(id),
    PRIMARY KEY (user_profile_id, dietary_restriction_id)
);

CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    user_profile_id INTEGER NOT NULL REFERENCES user_profiles(id),
    status TEXT NOT NULL DEFAULT 'pending',
    delivery_date TEXT NOT NULL,
    note TEXT NOT NULL DEFAULT '',
    total_price REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS orders_user ON orders(user_id);

CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY,
    order_id INTEGER NOT NULL REFERENCES orders(id),
    meal_option_id INTEGER NOT NULL REFERENCES meal_options(id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    price REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS order_items_order ON order_items(order_id);
CREATE INDEX IF NOT EXISTS order_items_option ON order_items(meal_option_id);

CREATE TABLE IF NOT EXISTS delivery_infos (
    id INTEGER PRIMARY KEY,
    order_id INTEGER NOT NULL UNIQUE REFERENCES orders(id),
    driver_id INTEGER,
    scheduled_time TEXT NOT NULL,
    actual_time TEXT,
    status TEXT NOT NULL,
    notes TEXT NOT NULL,
    address TEXT NOT NULL,
    longitude REAL NOT NULL,
    latitude REAL NOT NULL,
    custom_address INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS delivery_infos_schedule ON delivery_infos(scheduled_time);
";

pub(super) fn apply(connection: &Connection) -> Result<(), StoreError> {
    connection
        .execute_batch(SCHEMA)
        .map_err(|source| StoreError::Schema { source })
}
