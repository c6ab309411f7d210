//! Cross-field policy checks and bucket planning.
//!
//! [`validate`] runs before any credential lookup or backend call. Rules are
//! checked in a fixed order so the most specific message wins.

use crate::annotations::ClaimRequest;
use crate::error::ProvisionerError;
use crate::naming::{TokenGenerator, generated_bucket_name};

/// Enforces the mutual-exclusion rules between bucket flags and names.
///
/// # Errors
///
/// Returns [`ProvisionerError::Validation`] when:
/// - an object path is combined with auto-create;
/// - auto-delete is set without auto-create;
/// - auto-delete is set together with an explicit bucket name;
/// - auto-delete is unset and no bucket name is given.
pub fn validate(claim: &ClaimRequest) -> Result<(), ProvisionerError> {
    if claim.auto_create_bucket && !claim.object_path.is_empty() {
        return Err(ProvisionerError::validation(format!(
            "object-path cannot be set when auto-create is enabled, got: {}",
            claim.object_path
        )));
    }
    if claim.auto_delete_bucket {
        if !claim.auto_create_bucket {
            return Err(ProvisionerError::validation(
                "bucket auto-create must be enabled when bucket auto-delete is enabled",
            ));
        }
        if !claim.bucket.is_empty() {
            return Err(ProvisionerError::validation(format!(
                "bucket cannot be set when auto-delete is enabled, got: {}",
                claim.bucket
            )));
        }
    } else if claim.bucket.is_empty() {
        return Err(ProvisionerError::validation("bucket name not specified"));
    }
    Ok(())
}

/// Bucket name and the lifecycle intents derived from a validated claim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BucketSpec {
    /// Explicit or generated bucket name.
    pub name: String,
    /// Object path that must already exist inside the bucket.
    pub object_path: Option<String>,
    /// Whether the bucket must be created.
    pub create: bool,
    /// Whether the bucket is deleted with the volume.
    pub delete_on_removal: bool,
    /// Whether access to the bucket must be verified.
    pub validate_access: bool,
}

impl BucketSpec {
    /// Plans the bucket for a claim that already passed [`validate`].
    ///
    /// A name is generated only for auto-deleted buckets, which are always
    /// auto-created and never carry an explicit name.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::NameGeneration`] when the generator fails.
    pub fn plan<G>(claim: &ClaimRequest, tokens: &G) -> Result<Self, ProvisionerError>
    where
        G: TokenGenerator + ?Sized,
    {
        let name = if claim.auto_delete_bucket {
            let token = tokens
                .new_token()
                .map_err(|err| ProvisionerError::NameGeneration(err.to_string()))?;
            generated_bucket_name(&token)
        } else {
            claim.bucket.clone()
        };
        Ok(Self {
            name,
            object_path: Some(claim.object_path.clone()).filter(|path| !path.is_empty()),
            create: claim.auto_create_bucket,
            delete_on_removal: claim.auto_delete_bucket,
            validate_access: requires_access_check(claim),
        })
    }

    /// Returns `true` when any lifecycle step needs a backend session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        self.create || self.validate_access || self.object_path.is_some()
    }
}

/// Access is checked unless the claim disabled it and the bucket is not being
/// created by this call.
#[must_use]
pub fn requires_access_check(claim: &ClaimRequest) -> bool {
    !(claim.validation_disabled() && !claim.auto_create_bucket)
}
