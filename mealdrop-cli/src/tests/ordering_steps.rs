//! Behaviour-driven step definitions driving the ordering CLI scenarios.

use super::helpers::Workspace;
use super::*;
use mealdrop_core::{DomainError, Entity};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

const CUSTOMER: u64 = 7;
const RIVAL: u64 = 8;
const UNKNOWN_OPTION: u64 = 404;

#[derive(Debug)]
struct OrderingWorld {
    workspace: Workspace,
    option_id: RefCell<Option<u64>>,
    stdout: RefCell<String>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl OrderingWorld {
    fn option_arg(&self) -> String {
        self.option_id
            .borrow()
            .expect("meal option should be seeded")
            .to_string()
    }

    fn purchase_argv(&self, user_id: u64) -> Vec<String> {
        vec![
            "purchase".to_owned(),
            "--user".to_owned(),
            user_id.to_string(),
            "--option".to_owned(),
            self.option_arg(),
        ]
    }

    fn buy(&self, user_id: u64) {
        let argv = self.purchase_argv(user_id);
        let args: Vec<&str> = argv.iter().map(String::as_str).collect();
        let result = self.workspace.invoke(&args).map(|stdout| {
            self.stdout.replace(stdout);
        });
        self.result.replace(Some(result));
    }

    fn domain_error(&self) -> DomainError {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        match error {
            CliError::Store(err) => err.domain().cloned().expect("domain error"),
            other => panic!("expected CliError::Store, found {other:?}"),
        }
    }
}

#[fixture]
fn world() -> OrderingWorld {
    OrderingWorld {
        workspace: Workspace::new(),
        option_id: RefCell::new(None),
        stdout: RefCell::new(String::new()),
        result: RefCell::new(None),
    }
}

#[given("a meal option with one unit left")]
fn meal_option_with_one_unit(#[from(world)] world: &OrderingWorld) {
    let (_, _, option_id) = world.workspace.seed_option(1);
    world.option_id.replace(Some(option_id));
}

#[given("a customer with a delivery profile")]
fn customer_with_profile(#[from(world)] world: &OrderingWorld) {
    world.workspace.seed_profile(CUSTOMER, 0.05);
}

#[given("another customer has bought the option")]
fn another_customer_bought(#[from(world)] world: &OrderingWorld) {
    world.workspace.seed_profile(RIVAL, 0.2);
    let argv = world.purchase_argv(RIVAL);
    let args: Vec<&str> = argv.iter().map(String::as_str).collect();
    world.workspace.json(&args);
}

#[when("the customer buys the option")]
fn customer_buys(#[from(world)] world: &OrderingWorld) {
    world.buy(CUSTOMER);
}

#[when("the customer buys an option that does not exist")]
fn customer_buys_unknown_option(#[from(world)] world: &OrderingWorld) {
    world.option_id.replace(Some(UNKNOWN_OPTION));
    world.buy(CUSTOMER);
}

#[then("the command prints a pending order")]
fn prints_pending_order(#[from(world)] world: &OrderingWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let order: serde_json::Value =
        serde_json::from_str(&world.stdout.borrow()).expect("output should be JSON");
    assert_eq!(order["order"]["status"], "pending");
    assert_eq!(order["order"]["user_id"], CUSTOMER);
    assert_eq!(order["items"][0]["quantity"], 1);
}

#[then("the command fails because the option is sold out")]
fn fails_sold_out(#[from(world)] world: &OrderingWorld) {
    assert!(matches!(
        world.domain_error(),
        DomainError::CapacityExceeded { max: 1, .. }
    ));
}

#[then("the command fails because a profile is required")]
fn fails_profile_required(#[from(world)] world: &OrderingWorld) {
    assert_eq!(
        world.domain_error(),
        DomainError::ProfileRequired { user_id: CUSTOMER }
    );
}

#[then("the command fails because the option is unknown")]
fn fails_unknown_option(#[from(world)] world: &OrderingWorld) {
    assert_eq!(
        world.domain_error(),
        DomainError::NotFound {
            entity: Entity::MealOption,
            id: UNKNOWN_OPTION
        }
    );
}

macro_rules! register_ordering_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/ordering_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: OrderingWorld) {
            let _ = world;
        }
    };
}

register_ordering_scenario!(ordering_last_unit, "buying the last unit of an option");
register_ordering_scenario!(ordering_sold_out, "rejecting a sold-out option");
register_ordering_scenario!(ordering_without_profile, "rejecting a customer without a profile");
register_ordering_scenario!(ordering_unknown_option, "rejecting an unknown meal option");
