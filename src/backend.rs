//! Collaborator interfaces for secret lookup and object-storage sessions.
//!
//! The provisioning core never talks to the network itself. Hosts supply a
//! [`SecretStore`] and a [`SessionFactory`]; the workflows open one session
//! per call and drop it when the call returns.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::credentials::ObjectStorageCredentials;

/// Future returned by collaborator operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Raw secret payload keyed by data field.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Read access to credential secrets.
pub trait SecretStore: Send + Sync {
    /// Error returned by the store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the data of secret `name` in `namespace`.
    fn get_secret<'a>(
        &'a self,
        name: &'a str,
        namespace: &'a str,
    ) -> BackendFuture<'a, SecretData, Self::Error>;
}

/// Bucket operations available on an authenticated session.
pub trait ObjectStorageSession: Send + Sync {
    /// Error returned by the session.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Creates `bucket`. The optional message is informational only, for
    /// example a note that the bucket already existed.
    fn create_bucket<'a>(&'a self, bucket: &'a str)
    -> BackendFuture<'a, Option<String>, Self::Error>;

    /// Verifies the session can access `bucket`.
    fn check_bucket_access<'a>(&'a self, bucket: &'a str) -> BackendFuture<'a, (), Self::Error>;

    /// Reports whether `object_path` exists inside `bucket`.
    fn check_object_path_existence<'a>(
        &'a self,
        bucket: &'a str,
        object_path: &'a str,
    ) -> BackendFuture<'a, bool, Self::Error>;

    /// Deletes `bucket`.
    fn delete_bucket<'a>(&'a self, bucket: &'a str) -> BackendFuture<'a, (), Self::Error>;
}

/// Builds sessions scoped to a single workflow call.
pub trait SessionFactory: Send + Sync {
    /// Session type produced by the factory.
    type Session: ObjectStorageSession;

    /// Opens a session against `endpoint` in `region` using `credentials`.
    fn new_session(
        &self,
        endpoint: &str,
        region: &str,
        credentials: &ObjectStorageCredentials,
    ) -> Self::Session;
}
