//! Error taxonomy for the provisioning and teardown workflows.
//!
//! [`ProvisionerError`] classifies what went wrong; [`WorkflowError`] adds
//! the claim or volume being processed and the workflow stage that failed.

use std::fmt;

use thiserror::Error;

/// Boxed error used to carry collaborator failures without leaking their
/// concrete types into the workflow signatures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bucket operation that was being attempted when a backend call failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BucketOperation {
    /// Creating a bucket.
    Create,
    /// Verifying the credentials can reach the bucket.
    CheckAccess,
    /// Probing for an object path inside the bucket.
    CheckObjectPath,
    /// Deleting a bucket during teardown.
    Delete,
}

impl fmt::Display for BucketOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Create => "create",
            Self::CheckAccess => "access",
            Self::CheckObjectPath => "check object-path inside",
            Self::Delete => "delete",
        })
    }
}

/// Coarse category of a [`ProvisionerError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A numeric or boolean string could not be parsed.
    ConfigParse,
    /// A cross-field policy or well-formedness rule was violated.
    Validation,
    /// The credential secret was missing or incomplete.
    Credential,
    /// The object-storage backend rejected or failed an operation.
    Backend,
    /// The persisted volume descriptor could not be read.
    Marshal,
    /// The unique token for a generated bucket name was unavailable.
    NameGeneration,
}

/// Errors raised while resolving credentials from the secret store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Raised when the secret store lookup fails.
    #[error("cannot get secret {name} in namespace {namespace}: {source}")]
    Lookup {
        /// Secret name.
        name: String,
        /// Namespace the secret was looked up in.
        namespace: String,
        /// Error reported by the secret store.
        #[source]
        source: BoxError,
    },
    /// Raised when a required key is absent from the secret.
    #[error("{field} secret missing")]
    MissingField {
        /// Secret data key that was not found.
        field: String,
    },
}

/// Errors raised by the provisioning core.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    /// Raised when a string value cannot be parsed into its typed form.
    #[error("cannot parse value of {field}: {message}")]
    ConfigParse {
        /// Annotation or parameter key holding the malformed value.
        field: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when a policy or well-formedness rule is violated.
    #[error("{0}")]
    Validation(String),
    /// Raised when credentials cannot be resolved.
    #[error("cannot get credentials: {0}")]
    Credential(#[from] CredentialError),
    /// Raised when a backend bucket operation fails.
    #[error("cannot {operation} bucket {bucket}: {source}")]
    Backend {
        /// Operation being attempted.
        operation: BucketOperation,
        /// Bucket the operation targeted.
        bucket: String,
        /// Error reported by the backend session.
        #[source]
        source: BoxError,
    },
    /// Raised when the persisted descriptor cannot be read back.
    #[error("cannot unmarshal volume descriptor: {0}")]
    Marshal(String),
    /// Raised when the bucket name token cannot be generated.
    #[error("cannot create unique token for bucket name: {0}")]
    NameGeneration(String),
}

impl ProvisionerError {
    /// Builds a [`ProvisionerError::Validation`] from any displayable message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a [`ProvisionerError::ConfigParse`] for the given key.
    #[must_use]
    pub fn config_parse(field: &str, message: impl fmt::Display) -> Self {
        Self::ConfigParse {
            field: field.to_owned(),
            message: message.to_string(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse { .. } => ErrorKind::ConfigParse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Credential(_) => ErrorKind::Credential,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Marshal(_) => ErrorKind::Marshal,
            Self::NameGeneration(_) => ErrorKind::NameGeneration,
        }
    }
}

/// Workflow stage, used both for progress logging and error context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Parsing annotations and parameters and merging them.
    Resolving,
    /// Enforcing cross-field policy and planning the bucket.
    Validating,
    /// Fetching credentials from the secret store.
    CredentialResolution,
    /// Running create / access-check / object-path operations.
    LifecycleExecution,
    /// Rendering the persisted descriptor and mount options.
    DescriptorBuilding,
    /// Reading the descriptor back from a persisted volume.
    ParsingDescriptor,
    /// Deleting the bucket during teardown.
    BucketDelete,
}

impl fmt::Display for Stage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Resolving => "resolving configuration",
            Self::Validating => "validating configuration",
            Self::CredentialResolution => "resolving credentials",
            Self::LifecycleExecution => "executing bucket lifecycle",
            Self::DescriptorBuilding => "building volume descriptor",
            Self::ParsingDescriptor => "parsing volume descriptor",
            Self::BucketDelete => "deleting bucket",
        })
    }
}

/// Error returned by the public workflows, carrying the identity of the claim
/// or volume and the stage that failed.
#[derive(Debug, Error)]
#[error("{subject}: {stage}: {source}")]
pub struct WorkflowError {
    /// Claim name (provisioning) or volume name (teardown).
    pub subject: String,
    /// Stage in which the failure happened.
    pub stage: Stage,
    /// Underlying failure.
    #[source]
    pub source: ProvisionerError,
}

impl WorkflowError {
    /// Wraps `source` with its subject and stage.
    #[must_use]
    pub fn new(subject: impl Into<String>, stage: Stage, source: ProvisionerError) -> Self {
        Self {
            subject: subject.into(),
            stage,
            source,
        }
    }

    /// Returns the category of the underlying failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Returns a mapper that attaches `subject` and `stage` to an error.
pub(crate) fn at<E>(subject: &str, stage: Stage) -> impl FnOnce(E) -> WorkflowError + '_
where
    E: Into<ProvisionerError>,
{
    move |err| WorkflowError::new(subject, stage, err.into())
}
