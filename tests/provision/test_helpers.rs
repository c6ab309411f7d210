//! Shared fixtures for provisioning BDD scenarios.
//!
//! Steps receive the context by reference, so the claim and the outcome sit
//! behind shared cells in the same way the scripted doubles share theirs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rstest::fixture;
use s3fs_provisioner::annotations::keys;
use s3fs_provisioner::test_support::{ScriptedSecretStore, ScriptedSessionFactory, SessionCall};
use s3fs_provisioner::{Annotations, PersistentVolume, ProvisionRequest};

use crate::test_constants::{
    CLAIM_NAMESPACE, IAM_ENDPOINT, OBJECT_STORE_ENDPOINT, OBJECT_STORE_STORAGE_CLASS,
};

#[derive(Clone, Debug)]
pub struct ProvisionContext {
    pub secrets: ScriptedSecretStore,
    pub sessions: ScriptedSessionFactory,
    claim: Arc<Mutex<Annotations>>,
    outcome: Arc<Mutex<Option<ProvisionOutcome>>>,
}

#[derive(Clone, Debug)]
pub enum ProvisionOutcome {
    Provisioned(Box<PersistentVolume>),
    Failed { stage: String, message: String },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProvisionContext {
    pub fn set_claim(&self, key: &str, value: &str) {
        lock(&self.claim).insert(key.to_owned(), value.to_owned());
    }

    pub fn claim_value(&self, key: &str) -> Option<String> {
        lock(&self.claim).get(key).cloned()
    }

    pub fn request(&self) -> ProvisionRequest {
        ProvisionRequest::new("pv-data", "data", CLAIM_NAMESPACE)
            .with_claim_annotations(lock(&self.claim).clone())
            .with_class_parameters(class_parameters())
    }

    pub fn record(&self, outcome: ProvisionOutcome) {
        *lock(&self.outcome) = Some(outcome);
    }

    pub fn outcome(&self) -> Option<ProvisionOutcome> {
        lock(&self.outcome).clone()
    }
}

fn class_parameters() -> Annotations {
    [
        (keys::OBJECT_STORE_ENDPOINT, OBJECT_STORE_ENDPOINT),
        (keys::OBJECT_STORE_STORAGE_CLASS, OBJECT_STORE_STORAGE_CLASS),
        (keys::IAM_ENDPOINT, IAM_ENDPOINT),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), value.to_owned()))
    .collect()
}

#[fixture]
pub fn provision_context() -> ProvisionContext {
    ProvisionContext {
        secrets: ScriptedSecretStore::new(),
        sessions: ScriptedSessionFactory::new(),
        claim: Arc::new(Mutex::new(Annotations::new())),
        outcome: Arc::new(Mutex::new(None)),
    }
}

/// Short label used by feature files to describe a bucket operation.
pub const fn call_label(call: &SessionCall) -> Option<&'static str> {
    match call {
        SessionCall::Open { .. } => None,
        SessionCall::CreateBucket(_) => Some("create"),
        SessionCall::CheckBucketAccess(_) => Some("access"),
        SessionCall::CheckObjectPath { .. } => Some("object-path"),
        SessionCall::DeleteBucket(_) => Some("delete"),
    }
}
