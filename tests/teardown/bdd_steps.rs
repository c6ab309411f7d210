//! BDD step definitions for the teardown workflow.

use rstest_bdd_macros::{given, then, when};
use s3fs_provisioner::annotations::keys;
use s3fs_provisioner::test_support::{SequenceTokenGenerator, SessionCall};
use s3fs_provisioner::{Provisioner, ProvisionerConfig, S3fsProvisioner};
use tokio::runtime::Runtime;

use super::test_helpers::{TeardownContext, TeardownOutcome};
use crate::test_constants::CLAIM_NAMESPACE;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a provisioner with HMAC credentials in secret \"{name}\"")]
fn provisioner_with_hmac_secret(teardown_context: &TeardownContext, name: String) {
    teardown_context.secrets.insert(
        CLAIM_NAMESPACE,
        &name,
        &[("access-key", "ak"), ("secret-key", "sk")],
    );
    teardown_context.use_secret(&name);
}

#[given("a provisioned volume for bucket \"{bucket}\"")]
fn provisioned_volume(teardown_context: &TeardownContext, bucket: String) {
    teardown_context.persist_descriptor(&bucket, false);
}

#[given("a provisioned auto-delete volume for bucket \"{bucket}\"")]
fn provisioned_auto_delete_volume(teardown_context: &TeardownContext, bucket: String) {
    teardown_context.persist_descriptor(&bucket, true);
}

#[given("a volume whose auto-delete flag is \"{flag}\"")]
fn volume_with_flag(teardown_context: &TeardownContext, flag: String) {
    teardown_context.set_annotation(keys::AUTO_DELETE_BUCKET, &flag);
}

#[given("the volume references secret \"{name}\"")]
fn volume_references_secret(teardown_context: &TeardownContext, name: String) {
    teardown_context.set_annotation(keys::SECRET_NAME, &name);
}

#[given("bucket deletion fails")]
fn bucket_deletion_fails(teardown_context: &TeardownContext) {
    teardown_context.sessions.fail_delete();
}

#[when("I delete the volume")]
fn delete_volume(teardown_context: &TeardownContext) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provisioner = S3fsProvisioner::new(
        &ProvisionerConfig::default(),
        teardown_context.secrets.clone(),
        teardown_context.sessions.clone(),
        SequenceTokenGenerator::new(Vec::<String>::new()),
    );

    let volume = teardown_context.volume();
    let outcome = match runtime.block_on(provisioner.delete(&volume)) {
        Ok(()) => TeardownOutcome::Deleted,
        Err(err) => TeardownOutcome::Failed {
            stage: err.stage.to_string(),
            message: err.to_string(),
        },
    };
    teardown_context.record(outcome);
    Ok(())
}

#[then("teardown succeeds")]
fn teardown_succeeds(teardown_context: &TeardownContext) -> Result<(), StepError> {
    match teardown_context.outcome() {
        Some(TeardownOutcome::Deleted) => Ok(()),
        Some(TeardownOutcome::Failed { message, .. }) => Err(StepError::Assertion(format!(
            "expected success, got failure: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("teardown fails at stage \"{stage}\"")]
fn teardown_fails_at(teardown_context: &TeardownContext, stage: String) -> Result<(), StepError> {
    let Some(TeardownOutcome::Failed {
        stage: actual,
        message,
    }) = teardown_context.outcome()
    else {
        return Err(StepError::Assertion(String::from("expected failure outcome")));
    };
    if actual == stage {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected failure at '{stage}', got '{actual}': {message}"
        )))
    }
}

#[then("no bucket was deleted")]
fn no_bucket_deleted(teardown_context: &TeardownContext) -> Result<(), StepError> {
    let calls = teardown_context.sessions.calls();
    if calls
        .iter()
        .any(|call| matches!(call, SessionCall::DeleteBucket(_)))
    {
        return Err(StepError::Assertion(format!(
            "expected no bucket deletion, got {calls:?}"
        )));
    }
    Ok(())
}

#[then("bucket \"{bucket}\" was deleted via endpoint \"{endpoint}\"")]
fn bucket_deleted_via(
    teardown_context: &TeardownContext,
    bucket: String,
    endpoint: String,
) -> Result<(), StepError> {
    let calls = teardown_context.sessions.calls();
    match calls.as_slice() {
        [
            SessionCall::Open {
                endpoint: opened, ..
            },
            SessionCall::DeleteBucket(deleted),
        ] if *opened == endpoint && *deleted == bucket => Ok(()),
        _ => Err(StepError::Assertion(format!(
            "expected delete of {bucket} via {endpoint}, got {calls:?}"
        ))),
    }
}
