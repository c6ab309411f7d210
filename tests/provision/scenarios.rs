//! BDD scenarios for the provisioning workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ProvisionContext, provision_context};

#[scenario(
    path = "tests/features/provision.feature",
    name = "Create a generated bucket for an auto-delete claim"
)]
fn scenario_generated_bucket(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Validate an existing bucket and object path"
)]
fn scenario_existing_bucket(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Reject an object path on an auto-created bucket"
)]
fn scenario_object_path_with_create(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Reject auto-delete without auto-create"
)]
fn scenario_delete_without_create(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Reject a claim without a bucket"
)]
fn scenario_missing_bucket(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Report a missing object path"
)]
fn scenario_missing_object_path(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Refuse to create a bucket with an API key lacking a service instance"
)]
fn scenario_api_key_without_service_instance(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Stop after a failed bucket creation"
)]
fn scenario_create_failure(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Stop after a failed access check"
)]
fn scenario_access_failure(provision_context: ProvisionContext) {
    drop(provision_context);
}

#[scenario(
    path = "tests/features/provision.feature",
    name = "Skip the session when validation is disabled"
)]
fn scenario_validation_disabled(provision_context: ProvisionContext) {
    drop(provision_context);
}
