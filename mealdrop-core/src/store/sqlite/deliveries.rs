//! Delivery lookups, the driver route query and driver-side status updates.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use rusqlite::params;

use crate::{
    delivery::{DeliveryInfo, DeliveryStatus, DeliveryStop, DriverFilter, assemble_route},
    error::{DomainError, Entity},
    order::OrderStatus,
};

use super::{
    SqliteStore, StoreError,
    rows::{
        self, DELIVERY_COLUMNS, load_delivery, load_meal_center, load_order, load_orders_by_ids,
        load_profiles_by_ids,
    },
};

impl SqliteStore {
    /// Deliveries scheduled on `date` for `driver`, in driving order from
    /// the meal center.
    ///
    /// Orders and profiles are loaded after the deliveries and joined in
    /// memory. A stop whose order is missing is kept with empty order and
    /// profile fields.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when the meal center does not exist.
    pub fn deliveries_for_driver(
        &self,
        driver: DriverFilter,
        date: NaiveDate,
        meal_center_id: u64,
    ) -> Result<Vec<DeliveryStop>, StoreError> {
        let deliveries = self.scheduled_deliveries(driver, date)?;
        let (orders, profiles) = if deliveries.is_empty() {
            Default::default()
        } else {
            let order_ids: Vec<u64> = deliveries.iter().map(|delivery| delivery.order_id).collect();
            let orders = load_orders_by_ids(&self.connection, &order_ids)?;
            let profile_ids: Vec<u64> = orders.values().map(|order| order.user_profile_id).collect();
            let profiles = load_profiles_by_ids(&self.connection, &profile_ids)?;
            (orders, profiles)
        };

        let center = load_meal_center(&self.connection, meal_center_id)?
            .ok_or(DomainError::not_found(Entity::MealCenter, meal_center_id))?;
        debug!(
            "planning {} deliveries on {date} from meal center {meal_center_id}",
            deliveries.len()
        );
        Ok(assemble_route(deliveries, &orders, &profiles, center.location))
    }

    fn scheduled_deliveries(
        &self,
        driver: DriverFilter,
        date: NaiveDate,
    ) -> Result<Vec<DeliveryInfo>, StoreError> {
        let base = format!(
            "SELECT {DELIVERY_COLUMNS} FROM delivery_infos WHERE DATE(scheduled_time) = ?1"
        );
        let deliveries = match driver {
            DriverFilter::Unassigned => {
                let mut statement = self
                    .connection
                    .prepare(&format!("{base} AND driver_id IS NULL ORDER BY id"))?;
                statement
                    .query_map(params![date], rows::delivery)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
            DriverFilter::Driver(driver_id) => {
                let mut statement = self
                    .connection
                    .prepare(&format!("{base} AND driver_id = ?2 ORDER BY id"))?;
                statement
                    .query_map(params![date, driver_id], rows::delivery)?
                    .collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(deliveries)
    }

    /// Look up a delivery.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when `id` is unknown.
    pub fn delivery(&self, id: u64) -> Result<DeliveryInfo, StoreError> {
        load_delivery(&self.connection, "id", id)?
            .ok_or_else(|| DomainError::not_found(Entity::Delivery, id).into())
    }

    /// Hand a delivery to `driver_id` and mark it assigned.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when the delivery does not exist and
    /// [`DomainError::DeliveryClosed`] once it is delivered or canceled.
    pub fn assign_driver(
        &mut self,
        delivery_id: u64,
        driver_id: u64,
    ) -> Result<DeliveryInfo, StoreError> {
        let transaction = self.write_transaction()?;
        let delivery = load_delivery(&transaction, "id", delivery_id)?
            .ok_or(DomainError::not_found(Entity::Delivery, delivery_id))?;
        delivery.ensure_open()?;
        transaction.execute(
            "UPDATE delivery_infos SET driver_id = ?1, status = ?2 WHERE id = ?3",
            params![driver_id, DeliveryStatus::Assigned, delivery_id],
        )?;
        transaction.commit()?;
        info!("assigned delivery {delivery_id} to driver {driver_id}");
        self.delivery(delivery_id)
    }

    /// Record completion of a delivery at `at` and mark its order delivered.
    ///
    /// # Errors
    /// Returns [`DomainError::NotFound`] when the delivery does not exist and
    /// [`DomainError::DeliveryClosed`] when it, or its order, is already
    /// delivered or canceled.
    pub fn mark_delivered(
        &mut self,
        delivery_id: u64,
        at: DateTime<Utc>,
    ) -> Result<DeliveryInfo, StoreError> {
        let transaction = self.write_transaction()?;
        let delivery = load_delivery(&transaction, "id", delivery_id)?
            .ok_or(DomainError::not_found(Entity::Delivery, delivery_id))?;
        delivery.ensure_open()?;
        let closed = match load_order(&transaction, delivery.order_id)?.map(|order| order.status) {
            Some(OrderStatus::Canceled) => Some(DeliveryStatus::Canceled),
            Some(OrderStatus::Delivered) => Some(DeliveryStatus::Delivered),
            _ => None,
        };
        if let Some(status) = closed {
            return Err(DomainError::DeliveryClosed {
                id: delivery_id,
                status,
            }
            .into());
        }
        transaction.execute(
            "UPDATE delivery_infos SET status = ?1, actual_time = ?2 WHERE id = ?3",
            params![DeliveryStatus::Delivered, at, delivery_id],
        )?;
        transaction.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2",
            params![OrderStatus::Delivered, delivery.order_id],
        )?;
        transaction.commit()?;
        info!("delivery {delivery_id} completed");
        self.delivery(delivery_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Seeded, seed_meal_option, seed_profile_at, tomorrow};
    use geo::Coord;
    use rstest::{fixture, rstest};

    const FAR: u64 = 1;
    const NEAR: u64 = 2;

    struct Fixture {
        store: SqliteStore,
        seeded: Seeded,
        date: NaiveDate,
    }

    #[fixture]
    fn route() -> Fixture {
        let mut store = SqliteStore::open_in_memory().expect("open store");
        let meal_date = tomorrow();
        let seeded = seed_meal_option(&mut store, 10, meal_date).expect("seed option");
        let center = seeded.center.location;
        seed_profile_at(&mut store, FAR, Coord { x: center.x, y: center.y + 0.3 })
            .expect("far profile");
        seed_profile_at(&mut store, NEAR, Coord { x: center.x, y: center.y + 0.1 })
            .expect("near profile");
        store
            .purchase_meal_option(FAR, seeded.option.id)
            .expect("far purchase");
        store
            .purchase_meal_option(NEAR, seeded.option.id)
            .expect("near purchase");
        Fixture {
            store,
            seeded,
            date: meal_date.date_naive(),
        }
    }

    fn users(stops: &[DeliveryStop]) -> Vec<Option<u64>> {
        stops
            .iter()
            .map(|stop| stop.order.as_ref().map(|order| order.user_id))
            .collect()
    }

    #[rstest]
    fn unassigned_deliveries_start_nearest_the_center(route: Fixture) {
        let stops = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, route.seeded.center.id)
            .expect("query");
        assert_eq!(users(&stops), vec![Some(NEAR), Some(FAR)]);
        assert!(stops.iter().all(|stop| stop.profile.is_some()));
    }

    #[rstest]
    fn assigned_deliveries_are_filtered_by_driver(mut route: Fixture) {
        let first = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, route.seeded.center.id)
            .expect("query");
        let far_id = first
            .iter()
            .find(|stop| stop.order.as_ref().map(|order| order.user_id) == Some(FAR))
            .map(|stop| stop.delivery.id)
            .expect("far stop");
        let assigned = route.store.assign_driver(far_id, 30).expect("assign");
        assert_eq!(assigned.status, DeliveryStatus::Assigned);
        assert_eq!(assigned.driver_id, Some(30));

        let driver = route
            .store
            .deliveries_for_driver(DriverFilter::Driver(30), route.date, route.seeded.center.id)
            .expect("driver query");
        let unassigned = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, route.seeded.center.id)
            .expect("unassigned query");
        assert_eq!(users(&driver), vec![Some(FAR)]);
        assert_eq!(users(&unassigned), vec![Some(NEAR)]);
    }

    #[rstest]
    fn other_dates_have_no_deliveries(route: Fixture) {
        let next_day = route.date.succ_opt().expect("valid date");
        let stops = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, next_day, route.seeded.center.id)
            .expect("query");
        assert!(stops.is_empty());
    }

    #[rstest]
    fn unknown_center_is_not_found(route: Fixture) {
        let err = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, 404)
            .expect_err("no such center");
        assert_eq!(
            err.domain(),
            Some(&DomainError::not_found(Entity::MealCenter, 404))
        );
    }

    #[rstest]
    fn delivered_orders_leave_the_cancelable_states(mut route: Fixture) {
        let stop = route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, route.seeded.center.id)
            .expect("query")
            .into_iter()
            .next()
            .expect("one stop");
        let at = Utc::now();
        let delivered = route
            .store
            .mark_delivered(stop.delivery.id, at)
            .expect("deliver");
        assert_eq!(delivered.status, DeliveryStatus::Delivered);
        assert_eq!(delivered.actual_time, Some(at));

        let order = route
            .store
            .order(stop.delivery.order_id)
            .expect("reload order");
        assert_eq!(order.order.status, OrderStatus::Delivered);
    }

    fn first_stop(route: &Fixture) -> DeliveryStop {
        route
            .store
            .deliveries_for_driver(DriverFilter::Unassigned, route.date, route.seeded.center.id)
            .expect("query")
            .into_iter()
            .next()
            .expect("one stop")
    }

    #[rstest]
    fn canceled_deliveries_cannot_be_reassigned(mut route: Fixture) {
        let stop = first_stop(&route);
        let user_id = stop.order.as_ref().map(|order| order.user_id).expect("order");
        route
            .store
            .cancel_order(stop.delivery.order_id, user_id)
            .expect("cancel");

        let err = route
            .store
            .assign_driver(stop.delivery.id, 30)
            .expect_err("canceled delivery");
        assert_eq!(
            err.domain(),
            Some(&DomainError::DeliveryClosed {
                id: stop.delivery.id,
                status: DeliveryStatus::Canceled
            })
        );
        let unchanged = route.store.delivery(stop.delivery.id).expect("reload");
        assert_eq!(unchanged.status, DeliveryStatus::Canceled);
        assert_eq!(unchanged.driver_id, None);
        let driver = route
            .store
            .deliveries_for_driver(DriverFilter::Driver(30), route.date, route.seeded.center.id)
            .expect("driver query");
        assert!(driver.is_empty());
    }

    #[rstest]
    fn canceled_orders_cannot_be_delivered(mut route: Fixture) {
        let stop = first_stop(&route);
        let user_id = stop.order.as_ref().map(|order| order.user_id).expect("order");
        route
            .store
            .cancel_order(stop.delivery.order_id, user_id)
            .expect("cancel");

        let err = route
            .store
            .mark_delivered(stop.delivery.id, Utc::now())
            .expect_err("canceled delivery");
        assert_eq!(
            err.domain(),
            Some(&DomainError::DeliveryClosed {
                id: stop.delivery.id,
                status: DeliveryStatus::Canceled
            })
        );
        let order = route
            .store
            .order(stop.delivery.order_id)
            .expect("reload order");
        assert_eq!(order.order.status, OrderStatus::Canceled);
    }

    #[rstest]
    fn delivered_deliveries_are_final(mut route: Fixture) {
        let stop = first_stop(&route);
        route
            .store
            .mark_delivered(stop.delivery.id, Utc::now())
            .expect("deliver");

        let closed = Some(DomainError::DeliveryClosed {
            id: stop.delivery.id,
            status: DeliveryStatus::Delivered,
        });
        let reassign = route.store.assign_driver(stop.delivery.id, 30).expect_err("delivered");
        assert_eq!(reassign.domain().cloned(), closed);
        let redeliver = route
            .store
            .mark_delivered(stop.delivery.id, Utc::now())
            .expect_err("delivered");
        assert_eq!(redeliver.domain().cloned(), closed);
    }

    #[rstest]
    fn unknown_deliveries_are_reported(mut route: Fixture) {
        assert!(route.store.delivery(404).is_err());
        assert!(route.store.assign_driver(404, 1).is_err());
        assert!(route.store.mark_delivered(404, Utc::now()).is_err());
    }
}
