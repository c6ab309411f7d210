//! Test support utilities shared across unit and integration tests.
//!
//! The doubles here record every call so tests can assert on ordering, and
//! expose switches that make individual operations fail.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::backend::{
    BackendFuture, ObjectStorageSession, SecretData, SecretStore, SessionFactory,
};
use crate::credentials::ObjectStorageCredentials;
use crate::naming::{TokenError, TokenGenerator};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Failure injected by a scripted double.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{0}")]
pub struct ScriptedError(pub String);

/// In-memory secret store keyed by namespace and name.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSecretStore {
    secrets: Arc<Mutex<BTreeMap<(String, String), SecretData>>>,
    lookups: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedSecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret built from UTF-8 key/value pairs.
    pub fn insert(&self, namespace: &str, name: &str, pairs: &[(&str, &str)]) {
        let data = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.as_bytes().to_vec()))
            .collect();
        lock(&self.secrets).insert((namespace.to_owned(), name.to_owned()), data);
    }

    /// Returns every `(namespace, name)` lookup made so far.
    #[must_use]
    pub fn lookups(&self) -> Vec<(String, String)> {
        lock(&self.lookups).clone()
    }
}

impl SecretStore for ScriptedSecretStore {
    type Error = ScriptedError;

    fn get_secret<'a>(
        &'a self,
        name: &'a str,
        namespace: &'a str,
    ) -> BackendFuture<'a, SecretData, Self::Error> {
        Box::pin(async move {
            let key = (namespace.to_owned(), name.to_owned());
            lock(&self.lookups).push(key.clone());
            lock(&self.secrets)
                .get(&key)
                .cloned()
                .ok_or_else(|| ScriptedError(format!("secrets \"{name}\" not found")))
        })
    }
}

/// Call observed by a [`ScriptedSessionFactory`] or one of its sessions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionCall {
    /// A session was opened.
    Open {
        /// Object-store endpoint.
        endpoint: String,
        /// Storage class (region).
        region: String,
        /// IAM endpoint carried by the credentials.
        iam_endpoint: String,
    },
    /// `create_bucket` was called.
    CreateBucket(String),
    /// `check_bucket_access` was called.
    CheckBucketAccess(String),
    /// `check_object_path_existence` was called.
    CheckObjectPath {
        /// Bucket checked.
        bucket: String,
        /// Object path checked.
        object_path: String,
    },
    /// `delete_bucket` was called.
    DeleteBucket(String),
}

#[derive(Debug)]
struct SessionState {
    calls: Vec<SessionCall>,
    fail_create: bool,
    fail_access: bool,
    fail_object_path_check: bool,
    object_path_exists: bool,
    fail_delete: bool,
    create_message: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            fail_create: false,
            fail_access: false,
            fail_object_path_check: false,
            object_path_exists: true,
            fail_delete: false,
            create_message: None,
        }
    }
}

/// Session factory whose sessions succeed unless told otherwise.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSessionFactory {
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedSessionFactory {
    /// Creates a factory whose operations all succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_bucket` fail.
    pub fn fail_create(&self) {
        lock(&self.state).fail_create = true;
    }

    /// Makes `check_bucket_access` fail.
    pub fn fail_access(&self) {
        lock(&self.state).fail_access = true;
    }

    /// Makes `check_object_path_existence` fail.
    pub fn fail_object_path_check(&self) {
        lock(&self.state).fail_object_path_check = true;
    }

    /// Makes `check_object_path_existence` report the path as absent.
    pub fn object_path_missing(&self) {
        lock(&self.state).object_path_exists = false;
    }

    /// Makes `delete_bucket` fail.
    pub fn fail_delete(&self) {
        lock(&self.state).fail_delete = true;
    }

    /// Sets the informational message returned by `create_bucket`.
    pub fn create_message(&self, message: &str) {
        lock(&self.state).create_message = Some(message.to_owned());
    }

    /// Returns every call, session opens included.
    #[must_use]
    pub fn calls(&self) -> Vec<SessionCall> {
        lock(&self.state).calls.clone()
    }

    /// Returns bucket operations only.
    #[must_use]
    pub fn bucket_calls(&self) -> Vec<SessionCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, SessionCall::Open { .. }))
            .collect()
    }

    /// Returns the number of sessions opened.
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SessionCall::Open { .. }))
            .count()
    }
}

impl SessionFactory for ScriptedSessionFactory {
    type Session = ScriptedSession;

    fn new_session(
        &self,
        endpoint: &str,
        region: &str,
        credentials: &ObjectStorageCredentials,
    ) -> Self::Session {
        lock(&self.state).calls.push(SessionCall::Open {
            endpoint: endpoint.to_owned(),
            region: region.to_owned(),
            iam_endpoint: credentials.iam_endpoint.clone(),
        });
        ScriptedSession {
            state: Arc::clone(&self.state),
        }
    }
}

/// Session produced by [`ScriptedSessionFactory`].
#[derive(Clone, Debug)]
pub struct ScriptedSession {
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedSession {
    fn record(&self, call: SessionCall) -> MutexGuard<'_, SessionState> {
        let mut state = lock(&self.state);
        state.calls.push(call);
        state
    }
}

fn outcome(failed: bool, operation: &str) -> Result<(), ScriptedError> {
    if failed {
        return Err(ScriptedError(format!("simulated {operation} failure")));
    }
    Ok(())
}

impl ObjectStorageSession for ScriptedSession {
    type Error = ScriptedError;

    fn create_bucket<'a>(
        &'a self,
        bucket: &'a str,
    ) -> BackendFuture<'a, Option<String>, Self::Error> {
        Box::pin(async move {
            let state = self.record(SessionCall::CreateBucket(bucket.to_owned()));
            outcome(state.fail_create, "create")?;
            Ok(state.create_message.clone())
        })
    }

    fn check_bucket_access<'a>(&'a self, bucket: &'a str) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let state = self.record(SessionCall::CheckBucketAccess(bucket.to_owned()));
            outcome(state.fail_access, "access")
        })
    }

    fn check_object_path_existence<'a>(
        &'a self,
        bucket: &'a str,
        object_path: &'a str,
    ) -> BackendFuture<'a, bool, Self::Error> {
        Box::pin(async move {
            let state = self.record(SessionCall::CheckObjectPath {
                bucket: bucket.to_owned(),
                object_path: object_path.to_owned(),
            });
            outcome(state.fail_object_path_check, "object-path check")?;
            Ok(state.object_path_exists)
        })
    }

    fn delete_bucket<'a>(&'a self, bucket: &'a str) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let state = self.record(SessionCall::DeleteBucket(bucket.to_owned()));
            outcome(state.fail_delete, "delete")
        })
    }
}

/// Token generator that hands out a fixed sequence, then fails.
#[derive(Debug, Default)]
pub struct SequenceTokenGenerator {
    tokens: Mutex<VecDeque<String>>,
    issued: Mutex<usize>,
}

impl SequenceTokenGenerator {
    /// Creates a generator yielding `tokens` in order.
    #[must_use]
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: Mutex::new(tokens.into_iter().map(Into::into).collect()),
            issued: Mutex::new(0),
        }
    }

    /// Returns how many tokens have been handed out.
    #[must_use]
    pub fn issued(&self) -> usize {
        *lock(&self.issued)
    }
}

impl TokenGenerator for SequenceTokenGenerator {
    fn new_token(&self) -> Result<String, TokenError> {
        let token = lock(&self.tokens)
            .pop_front()
            .ok_or_else(|| TokenError(String::from("token sequence exhausted")))?;
        *lock(&self.issued) += 1;
        Ok(token)
    }
}
