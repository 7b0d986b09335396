//! Order placement and cancellation against the daily quantity counters.

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::params;

use crate::{
    delivery::DeliveryStatus,
    error::{DomainError, Entity},
    order::{Order, OrderDetails, OrderStatus, PurchaseRequest},
    validation::validate_location,
};

use super::{
    SqliteStore, StoreError,
    rows::{
        self, ORDER_COLUMNS, load_days_meals, load_meal_option, load_order, load_order_details,
        load_order_items, load_profile_by_user,
    },
};

impl SqliteStore {
    /// Buy one unit of a meal option for delivery to the user's profile
    /// address.
    ///
    /// # Errors
    /// See [`SqliteStore::purchase`].
    pub fn purchase_meal_option(
        &mut self,
        user_id: u64,
        meal_option_id: u64,
    ) -> Result<OrderDetails, StoreError> {
        self.purchase(&PurchaseRequest::new(user_id, meal_option_id), Utc::now())
    }

    /// Place a single-unit order as of `now`.
    ///
    /// The order, its item and its delivery are written together with the
    /// counter increment under the database write lock. Checks run in this
    /// order: option exists, option available, capacity left, profile on
    /// file, plan exists, plan date not before `now`.
    ///
    /// # Errors
    /// Returns the first failing check as [`StoreError::Domain`]. An address
    /// override with an out-of-range location fails with
    /// [`StoreError::Validation`]. Nothing is written on failure.
    pub fn purchase(
        &mut self,
        request: &PurchaseRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderDetails, StoreError> {
        if let Some(address) = &request.delivery_address {
            validate_location(address.location)?;
        }

        let transaction = self.write_transaction()?;
        let option = load_meal_option(&transaction, request.meal_option_id)?
            .ok_or(DomainError::not_found(Entity::MealOption, request.meal_option_id))?;
        option.ensure_orderable()?;
        let profile = load_profile_by_user(&transaction, request.user_id)?.ok_or(
            DomainError::ProfileRequired {
                user_id: request.user_id,
            },
        )?;
        let plan = load_days_meals(&transaction, option.days_meals_id)?
            .ok_or(DomainError::not_found(Entity::MealPlan, option.days_meals_id))?;
        plan.ensure_deliverable(now)?;

        let reserved = transaction.execute(
            "UPDATE meal_options
             SET current_daily_quantity = current_daily_quantity + 1
             WHERE id = ?1 AND current_daily_quantity < max_daily_quantity",
            [option.id],
        )?;
        if reserved == 0 {
            return Err(DomainError::CapacityExceeded {
                id: option.id,
                max: option.max_daily_quantity,
            }
            .into());
        }

        let order_id: u64 = transaction.query_row(
            "INSERT INTO orders (user_id, user_profile_id, status, delivery_date, note, total_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
            params![
                request.user_id,
                profile.id,
                OrderStatus::Pending,
                plan.meal_date,
                request.note,
                option.price
            ],
            |row| row.get(0),
        )?;
        transaction.execute(
            "INSERT INTO order_items (order_id, meal_option_id, quantity, price)
             VALUES (?1, ?2, 1, ?3)",
            params![order_id, option.id, option.price],
        )?;

        let (address, location, custom_address) = match &request.delivery_address {
            Some(custom) => (custom.address.as_str(), custom.location, true),
            None => (profile.address.as_str(), profile.location, false),
        };
        transaction.execute(
            "INSERT INTO delivery_infos (order_id, scheduled_time, status, notes, address,
                                         longitude, latitude, custom_address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                order_id,
                plan.meal_date,
                DeliveryStatus::Scheduled,
                profile.delivery_notes,
                address,
                location.x,
                location.y,
                custom_address
            ],
        )?;
        transaction.commit()?;

        info!(
            "user {} ordered meal option {} as order {order_id}",
            request.user_id, option.id
        );
        self.order(order_id)
    }

    /// Cancel a pending or confirmed order owned by `user_id`.
    ///
    /// The delivery is marked canceled and each item's quantity is returned
    /// to its meal option, never taking a counter below zero.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] for an unknown order,
    /// [`DomainError::Forbidden`] for another user's order and
    /// [`DomainError::InvalidState`] once the order has progressed.
    pub fn cancel_order(&mut self, order_id: u64, user_id: u64) -> Result<Order, StoreError> {
        let transaction = self.write_transaction()?;
        let mut order = load_order(&transaction, order_id)?
            .ok_or(DomainError::not_found(Entity::Order, order_id))?;
        order.ensure_cancelable_by(user_id)?;

        transaction.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![OrderStatus::Canceled, order_id],
        )?;
        transaction.execute(
            "UPDATE delivery_infos SET status = ?1 WHERE order_id = ?2",
            params![DeliveryStatus::Canceled, order_id],
        )?;
        for item in load_order_items(&transaction, order_id)? {
            transaction.execute(
                "UPDATE meal_options
                 SET current_daily_quantity = MAX(current_daily_quantity - ?1, 0)
                 WHERE id = ?2",
                params![item.quantity, item.meal_option_id],
            )?;
        }
        transaction.commit()?;

        info!("user {user_id} canceled order {order_id}");
        order.status = OrderStatus::Canceled;
        Ok(order)
    }

    /// Zero the daily counter of every available meal option.
    ///
    /// Returns the number of options touched.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn reset_daily_quantities(&mut self) -> Result<usize, StoreError> {
        let reset = self.connection.execute(
            "UPDATE meal_options SET current_daily_quantity = 0 WHERE is_available = 1",
            [],
        )?;
        info!("reset daily quantities on {reset} meal options");
        Ok(reset)
    }

    /// Load an order with its items, profile and delivery.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `order_id` is unknown.
    pub fn order(&self, order_id: u64) -> Result<OrderDetails, StoreError> {
        let order = load_order(&self.connection, order_id)?
            .ok_or(DomainError::not_found(Entity::Order, order_id))?;
        load_order_details(&self.connection, order)
    }

    /// Orders placed by `user_id`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn orders_for_user(&self, user_id: u64) -> Result<Vec<Order>, StoreError> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY id"
        ))?;
        let orders = statement
            .query_map([user_id], rows::order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(orders)
    }

    /// Orders with at least one item from the meal plan, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::Database`] on SQLite failures.
    pub fn orders_for_meal_plan(&self, days_meals_id: u64) -> Result<Vec<Order>, StoreError> {
        let mut statement = self.connection.prepare(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE id IN (
                 SELECT i.order_id FROM order_items i
                 JOIN meal_options m ON m.id = i.meal_option_id
                 WHERE m.days_meals_id = ?1
             )
             ORDER BY id"
        ))?;
        let orders = statement
            .query_map([days_meals_id], rows::order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("meal plan {days_meals_id} has {} orders", orders.len());
        Ok(orders)
    }
}
