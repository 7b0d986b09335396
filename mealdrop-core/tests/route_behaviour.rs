//! Behavioural tests for the nearest-neighbour route planner.

use std::cell::RefCell;

use geo::Coord;
use mealdrop_core::{DeliveryInfo, optimize_route, test_support::delivery_at};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug)]
struct RouteWorld {
    start: RefCell<Coord<f64>>,
    deliveries: RefCell<Vec<(&'static str, DeliveryInfo)>>,
    route: RefCell<Vec<&'static str>>,
}

impl RouteWorld {
    fn add(&self, label: &'static str, longitude: f64, latitude: f64) {
        let mut deliveries = self.deliveries.borrow_mut();
        let id = u64::try_from(deliveries.len()).expect("small delivery count") + 1;
        deliveries.push((label, delivery_at(id, id, longitude, latitude)));
    }

    fn label_of(&self, id: u64) -> &'static str {
        self.deliveries
            .borrow()
            .iter()
            .find(|(_, delivery)| delivery.id == id)
            .map(|(label, _)| *label)
            .expect("route only contains known deliveries")
    }
}

#[fixture]
fn world() -> RouteWorld {
    RouteWorld {
        start: RefCell::new(Coord { x: 0.0, y: 0.0 }),
        deliveries: RefCell::new(Vec::new()),
        route: RefCell::new(Vec::new()),
    }
}

#[given("a start point at the origin")]
fn start_at_origin(world: &RouteWorld) {
    world.start.replace(Coord { x: 0.0, y: 0.0 });
}

#[given("a start point far from every delivery")]
fn start_far_away(world: &RouteWorld) {
    world.start.replace(Coord { x: 120.0, y: -45.0 });
}

#[given("a delivery C at longitude 0 and latitude 3")]
fn delivery_c(world: &RouteWorld) {
    world.add("C", 0.0, 3.0);
}

#[given("a delivery B at longitude 0 and latitude 1")]
fn delivery_b(world: &RouteWorld) {
    world.add("B", 0.0, 1.0);
}

#[when("I plan the route")]
fn plan(world: &RouteWorld) {
    let deliveries: Vec<DeliveryInfo> = world
        .deliveries
        .borrow()
        .iter()
        .map(|(_, delivery)| delivery.clone())
        .collect();
    let planned = optimize_route(&deliveries, *world.start.borrow());
    let labels = planned
        .iter()
        .map(|delivery| world.label_of(delivery.id))
        .collect();
    world.route.replace(labels);
}

#[then("the route visits B then C")]
fn visits_b_then_c(world: &RouteWorld) {
    assert_eq!(*world.route.borrow(), vec!["B", "C"]);
}

#[then("the route is empty")]
fn route_is_empty(world: &RouteWorld) {
    assert!(world.route.borrow().is_empty());
}

#[then("the route visits B only")]
fn visits_b_only(world: &RouteWorld) {
    assert_eq!(*world.route.borrow(), vec!["B"]);
}

#[scenario(path = "tests/features/route_planner.feature", index = 0)]
fn nearest_first(world: RouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 1)]
fn empty_route(world: RouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_planner.feature", index = 2)]
fn single_delivery(world: RouteWorld) {
    let _ = world;
}
