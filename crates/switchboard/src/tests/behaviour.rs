//! Behaviour-driven tests for request dispatch.

use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::{Calc, call, envelope};
use crate::context::BufferedResponse;
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::DispatchError;
use crate::presets;
use crate::registry::ServiceRegistry;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    registry: Option<ServiceRegistry>,
    dispatcher: Option<Dispatcher>,
    outcome: Option<Result<DispatchOutcome, DispatchError>>,
    response: BufferedResponse,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dispatcher(world: &mut TestWorld) -> &Dispatcher {
    if world.dispatcher.is_none() {
        let registry = world.registry.take().unwrap_or_default();
        world.dispatcher = Some(Dispatcher::new(Arc::new(registry)));
    }
    world.dispatcher.as_ref().expect("dispatcher initialised")
}

fn outcome(world: &TestWorld) -> &Result<DispatchOutcome, DispatchError> {
    world.outcome.as_ref().expect("no request dispatched")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a registry with the calc service named {name}")]
fn given_calc(world: &mut TestWorld, name: String) {
    let service = name.trim_matches('"');
    let registry = ServiceRegistry::builder()
        .with_service(presets::json_shared_service::<Calc>(service))
        .expect("register calc")
        .build();
    world.registry = Some(registry);
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("{path} is requested with arguments {arguments}")]
fn when_requested(world: &mut TestWorld, path: String, arguments: String) {
    let (outcome, response) = call(
        dispatcher(world),
        path.trim_matches('"'),
        arguments.trim_matches('"'),
    );
    world.outcome = Some(outcome);
    world.response = response;
}

#[when("the service listing is requested")]
fn when_listing(world: &mut TestWorld) {
    let (outcome, response) = call(dispatcher(world), "", "");
    world.outcome = Some(outcome);
    world.response = response;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the response returns {value}")]
fn then_returns(world: &mut TestWorld, value: String) {
    let expected: serde_json::Value =
        serde_json::from_str(value.trim_matches('"')).expect("expected value is JSON");
    assert!(
        matches!(outcome(world), Ok(DispatchOutcome::Rendered)),
        "expected a rendered result"
    );
    assert_eq!(envelope(&world.response)["return"], expected);
}

#[then("the selected method is {signature}")]
fn then_selected(world: &mut TestWorld, signature: String) {
    assert_eq!(
        envelope(&world.response)["method"],
        signature.trim_matches('"')
    );
}

#[then("the response reports exception {class}")]
fn then_reports_exception(world: &mut TestWorld, class: String) {
    assert!(
        matches!(outcome(world), Ok(DispatchOutcome::Faulted)),
        "expected a rendered fault"
    );
    assert_eq!(
        envelope(&world.response)["exception"]["class"],
        class.trim_matches('"')
    );
}

#[then("the dispatch fails with {message}")]
fn then_fails(world: &mut TestWorld, message: String) {
    let error = outcome(world)
        .as_ref()
        .expect_err("expected dispatch failure");
    assert_eq!(error.to_string(), message.trim_matches('"'));
    assert!(world.response.body().is_empty(), "no body should be written");
}

#[then("the listing contains {count} service(s)")]
fn then_listing(world: &mut TestWorld, count: usize) {
    match outcome(world) {
        Ok(DispatchOutcome::ServiceListing(names)) => assert_eq!(names.len(), count),
        other => panic!("expected a service listing, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/dispatch.feature")]
fn dispatch_behaviour(world: TestWorld) {
    let _ = world;
}
