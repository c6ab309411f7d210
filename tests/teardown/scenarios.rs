//! BDD scenarios for the teardown workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{TeardownContext, teardown_context};

#[scenario(
    path = "tests/features/teardown.feature",
    name = "Keep the bucket when auto-delete is off"
)]
fn scenario_bucket_retained(teardown_context: TeardownContext) {
    drop(teardown_context);
}

#[scenario(
    path = "tests/features/teardown.feature",
    name = "Delete the bucket using the persisted endpoints"
)]
fn scenario_bucket_deleted(teardown_context: TeardownContext) {
    drop(teardown_context);
}

#[scenario(
    path = "tests/features/teardown.feature",
    name = "Surface bucket deletion failures"
)]
fn scenario_delete_failure(teardown_context: TeardownContext) {
    drop(teardown_context);
}

#[scenario(
    path = "tests/features/teardown.feature",
    name = "Surface missing credentials during teardown"
)]
fn scenario_missing_credentials(teardown_context: TeardownContext) {
    drop(teardown_context);
}

#[scenario(
    path = "tests/features/teardown.feature",
    name = "Reject a corrupted descriptor"
)]
fn scenario_corrupted_descriptor(teardown_context: TeardownContext) {
    drop(teardown_context);
}
