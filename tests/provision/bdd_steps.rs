//! BDD step definitions for the provisioning workflow.

use rstest_bdd_macros::{given, then, when};
use s3fs_provisioner::annotations::keys;
use s3fs_provisioner::descriptor::option_keys;
use s3fs_provisioner::test_support::SequenceTokenGenerator;
use s3fs_provisioner::{PersistentVolume, Provisioner, ProvisionerConfig, S3fsProvisioner};
use tokio::runtime::Runtime;

use super::test_helpers::{ProvisionContext, ProvisionOutcome, call_label};
use crate::test_constants::CLAIM_NAMESPACE;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a provisioner with HMAC credentials in secret \"{name}\"")]
fn provisioner_with_hmac_secret(provision_context: &ProvisionContext, name: String) {
    provision_context.secrets.insert(
        CLAIM_NAMESPACE,
        &name,
        &[("access-key", "ak"), ("secret-key", "sk")],
    );
    provision_context.set_claim(keys::SECRET_NAME, &name);
}

#[given("the secret holds an API key without a service instance")]
fn secret_holds_bare_api_key(provision_context: &ProvisionContext) {
    let name = provision_context
        .claim_value(keys::SECRET_NAME)
        .unwrap_or_default();
    provision_context
        .secrets
        .insert(CLAIM_NAMESPACE, &name, &[("api-key", "key")]);
}

#[given("the claim names bucket \"{bucket}\"")]
fn claim_names_bucket(provision_context: &ProvisionContext, bucket: String) {
    provision_context.set_claim(keys::BUCKET, &bucket);
}

#[given("the claim names object path \"{path}\"")]
fn claim_names_object_path(provision_context: &ProvisionContext, path: String) {
    provision_context.set_claim(keys::OBJECT_PATH, &path);
}

#[given("the claim enables bucket auto-create")]
fn claim_enables_auto_create(provision_context: &ProvisionContext) {
    provision_context.set_claim(keys::AUTO_CREATE_BUCKET, "true");
}

#[given("the claim enables bucket auto-delete")]
fn claim_enables_auto_delete(provision_context: &ProvisionContext) {
    provision_context.set_claim(keys::AUTO_DELETE_BUCKET, "true");
}

#[given("the claim disables bucket validation")]
fn claim_disables_validation(provision_context: &ProvisionContext) {
    provision_context.set_claim(keys::VALIDATE_BUCKET, "no");
}

#[given("the object path does not exist")]
fn object_path_missing(provision_context: &ProvisionContext) {
    provision_context.sessions.object_path_missing();
}

#[given("bucket creation fails")]
fn bucket_creation_fails(provision_context: &ProvisionContext) {
    provision_context.sessions.fail_create();
}

#[given("the bucket access check fails")]
fn bucket_access_fails(provision_context: &ProvisionContext) {
    provision_context.sessions.fail_access();
}

#[when("I provision the claim")]
fn provision_claim(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provisioner = S3fsProvisioner::new(
        &ProvisionerConfig::default(),
        provision_context.secrets.clone(),
        provision_context.sessions.clone(),
        SequenceTokenGenerator::new(["abc"]),
    );

    let request = provision_context.request();
    let outcome = match runtime.block_on(provisioner.provision(&request)) {
        Ok(volume) => ProvisionOutcome::Provisioned(Box::new(volume)),
        Err(err) => ProvisionOutcome::Failed {
            stage: err.stage.to_string(),
            message: err.to_string(),
        },
    };
    provision_context.record(outcome);
    Ok(())
}

fn provisioned_volume(provision_context: &ProvisionContext) -> Result<PersistentVolume, StepError> {
    match provision_context.outcome() {
        Some(ProvisionOutcome::Provisioned(volume)) => Ok(*volume),
        Some(ProvisionOutcome::Failed { message, .. }) => Err(StepError::Assertion(format!(
            "expected success, got failure: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

fn failure(provision_context: &ProvisionContext) -> Result<(String, String), StepError> {
    let Some(ProvisionOutcome::Failed { stage, message }) = provision_context.outcome() else {
        return Err(StepError::Assertion(String::from("expected failure outcome")));
    };
    Ok((stage, message))
}

#[then("provisioning succeeds")]
fn provisioning_succeeds(provision_context: &ProvisionContext) -> Result<(), StepError> {
    provisioned_volume(provision_context).map(drop)
}

#[then("the volume bucket is \"{bucket}\"")]
fn volume_bucket_is(provision_context: &ProvisionContext, bucket: String) -> Result<(), StepError> {
    let volume = provisioned_volume(provision_context)?;
    let persisted = volume.annotations.get(keys::BUCKET);
    let mounted = volume.flex_volume.options.get(option_keys::BUCKET);
    if persisted == Some(&bucket) && mounted == Some(&bucket) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected bucket {bucket}, got descriptor {persisted:?} and mount option {mounted:?}"
        )))
    }
}

#[then("the volume deletes its bucket on removal")]
fn volume_deletes_bucket(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let volume = provisioned_volume(provision_context)?;
    match volume.annotations.get(keys::AUTO_DELETE_BUCKET).map(String::as_str) {
        Some("true") => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected auto-delete flag \"true\", got {other:?}"
        ))),
    }
}

#[then("the bucket operations are \"{operations}\"")]
fn bucket_operations_are(
    provision_context: &ProvisionContext,
    operations: String,
) -> Result<(), StepError> {
    let actual = provision_context
        .sessions
        .calls()
        .iter()
        .filter_map(call_label)
        .collect::<Vec<_>>()
        .join(",");
    if actual == operations {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected operations '{operations}', got '{actual}'"
        )))
    }
}

#[then("no bucket operations were made")]
fn no_bucket_operations(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let calls = provision_context.sessions.bucket_calls();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no bucket operations, got {calls:?}"
        )))
    }
}

#[then("no external calls were made")]
fn no_external_calls(provision_context: &ProvisionContext) -> Result<(), StepError> {
    let lookups = provision_context.secrets.lookups();
    let calls = provision_context.sessions.calls();
    if lookups.is_empty() && calls.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no external calls, got lookups {lookups:?} and session calls {calls:?}"
        )))
    }
}

#[then("provisioning fails at stage \"{stage}\"")]
fn provisioning_fails_at(
    provision_context: &ProvisionContext,
    stage: String,
) -> Result<(), StepError> {
    let (actual, message) = failure(provision_context)?;
    if actual == stage {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure at '{stage}', got '{actual}': {message}"
        )))
    }
}

#[then("the failure mentions \"{snippet}\"")]
fn failure_mentions(provision_context: &ProvisionContext, snippet: String) -> Result<(), StepError> {
    let (_, message) = failure(provision_context)?;
    if message.contains(&snippet) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure to mention '{snippet}', got: {message}"
        )))
    }
}
