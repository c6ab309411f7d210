//! Credential resolution from the secret store.
//!
//! A secret holds either an API key (with an optional service instance id) or
//! an access/secret key pair. The API-key branch tolerates a missing service
//! instance id; the create step enforces it later because an access check on
//! its own does not need one.

use std::fmt;

use tracing::debug;

use crate::TRACING_TARGET_CREDENTIALS;
use crate::backend::{SecretData, SecretStore};
use crate::error::CredentialError;

/// Secret data key holding an API key.
pub const SECRET_API_KEY: &str = "api-key";
/// Secret data key holding the service instance id.
pub const SECRET_SERVICE_INSTANCE_ID: &str = "service-instance-id";
/// Secret data key holding an HMAC access key.
pub const SECRET_ACCESS_KEY: &str = "access-key";
/// Secret data key holding an HMAC secret key.
pub const SECRET_SECRET_KEY: &str = "secret-key";

/// Reference to a credential secret.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecretRef {
    /// Secret name.
    pub name: String,
    /// Secret namespace.
    pub namespace: String,
}

impl SecretRef {
    /// Creates a reference.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// The two credential shapes a secret may hold.
#[derive(Clone, Eq, PartialEq)]
pub enum CredentialKind {
    /// IAM API key.
    ApiKey {
        /// API key value.
        api_key: String,
        /// Service instance id; required only for bucket creation.
        service_instance_id: Option<String>,
    },
    /// HMAC key pair.
    AccessKeys {
        /// Access key id.
        access_key: String,
        /// Secret access key.
        secret_key: String,
    },
}

impl fmt::Debug for CredentialKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey {
                service_instance_id,
                ..
            } => formatter
                .debug_struct("ApiKey")
                .field("api_key", &"<redacted>")
                .field("service_instance_id", service_instance_id)
                .finish(),
            Self::AccessKeys { access_key, .. } => formatter
                .debug_struct("AccessKeys")
                .field("access_key", access_key)
                .field("secret_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Normalised credentials handed to the session factory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectStorageCredentials {
    /// Credential shape and values.
    pub kind: CredentialKind,
    /// IAM endpoint used to exchange API keys for tokens.
    pub iam_endpoint: String,
}

impl ObjectStorageCredentials {
    /// Normalises raw secret data.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingField`] when neither an API key nor
    /// both halves of an HMAC key pair are present.
    pub fn from_secret(
        data: &SecretData,
        iam_endpoint: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let kind = if let Some(api_key) = read_field(data, SECRET_API_KEY) {
            CredentialKind::ApiKey {
                api_key,
                service_instance_id: read_field(data, SECRET_SERVICE_INSTANCE_ID),
            }
        } else {
            CredentialKind::AccessKeys {
                access_key: require_field(data, SECRET_ACCESS_KEY)?,
                secret_key: require_field(data, SECRET_SECRET_KEY)?,
            }
        };
        Ok(Self {
            kind,
            iam_endpoint: iam_endpoint.into(),
        })
    }

    /// Returns `true` for API-key credentials lacking a service instance id.
    #[must_use]
    pub fn api_key_without_service_instance(&self) -> bool {
        matches!(
            &self.kind,
            CredentialKind::ApiKey { service_instance_id, .. }
                if service_instance_id.as_deref().is_none_or(str::is_empty)
        )
    }
}

fn read_field(data: &SecretData, key: &str) -> Option<String> {
    data.get(key)
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

fn require_field(data: &SecretData, key: &str) -> Result<String, CredentialError> {
    read_field(data, key).ok_or_else(|| CredentialError::MissingField {
        field: key.to_owned(),
    })
}

/// Resolves [`SecretRef`]s into credentials through a [`SecretStore`].
#[derive(Debug)]
pub struct CredentialResolver<'a, S> {
    store: &'a S,
}

impl<'a, S: SecretStore> CredentialResolver<'a, S> {
    /// Creates a resolver over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetches and normalises the credentials named by `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Lookup`] when the store fails and
    /// [`CredentialError::MissingField`] when the secret is incomplete.
    pub async fn resolve(
        &self,
        secret: &SecretRef,
        iam_endpoint: &str,
    ) -> Result<ObjectStorageCredentials, CredentialError> {
        debug!(
            target: TRACING_TARGET_CREDENTIALS,
            secret = %secret.name,
            namespace = %secret.namespace,
            "fetching credential secret"
        );
        let data = self
            .store
            .get_secret(&secret.name, &secret.namespace)
            .await
            .map_err(|err| CredentialError::Lookup {
                name: secret.name.clone(),
                namespace: secret.namespace.clone(),
                source: Box::new(err),
            })?;
        ObjectStorageCredentials::from_secret(&data, iam_endpoint)
    }
}
