//! Merges claim and class configuration into a single [`ResolvedConfig`].
//!
//! Each merge rule is a small pure function so it can be tested in
//! isolation. A non-empty claim value always wins over the class value.

use crate::annotations::{ClaimRequest, ClassParameters, keys};
use crate::error::ProvisionerError;

/// Fully typed configuration after merging claim and class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedConfig {
    /// Object-store endpoint, including its scheme.
    pub endpoint: String,
    /// IAM endpoint, including its scheme.
    pub iam_endpoint: String,
    /// Object-store storage class (region).
    pub region: String,
    /// Retry count handed to the mount driver.
    pub s3fs_fuse_retry_count: i64,
    /// Multipart chunk size in megabytes.
    pub chunk_size_mb: i64,
    /// Parallel request count.
    pub parallel_count: i64,
    /// Maximum parallel requests per multipart operation.
    pub multireq_max: i64,
    /// Stat cache entry count.
    pub stat_cache_size: i64,
    /// Stat cache expiry, kept as the validated claim string.
    pub stat_cache_expire_seconds: String,
    /// TLS cipher suite.
    pub tls_cipher_suite: String,
    /// Mount driver debug level.
    pub debug_level: String,
    /// Whether curl debugging is enabled.
    pub curl_debug: bool,
    /// Whether the kernel cache is enabled.
    pub kernel_cache: bool,
}

/// Resolves the effective configuration for a claim.
///
/// # Errors
///
/// Returns [`ProvisionerError::Validation`] when an endpoint lacks an
/// `http://` or `https://` scheme or the stat cache expiry is negative, and
/// [`ProvisionerError::ConfigParse`] when a numeric override is malformed.
pub fn resolve(
    claim: &ClaimRequest,
    class: &ClassParameters,
) -> Result<ResolvedConfig, ProvisionerError> {
    let endpoint = override_text(&claim.endpoint, &class.object_store_endpoint);
    let region = override_text(&claim.region, &class.object_store_storage_class);
    require_http_scheme(keys::OBJECT_STORE_ENDPOINT, &endpoint)?;

    let iam_endpoint = override_text(&claim.iam_endpoint, &class.iam_endpoint);
    require_http_scheme(keys::IAM_ENDPOINT, &iam_endpoint)?;

    Ok(ResolvedConfig {
        endpoint,
        iam_endpoint,
        region,
        s3fs_fuse_retry_count: override_integer(
            keys::S3FS_FUSE_RETRY_COUNT,
            &claim.s3fs_fuse_retry_count,
            class.s3fs_fuse_retry_count,
        )?,
        chunk_size_mb: override_integer(
            keys::CHUNK_SIZE_MB,
            &claim.chunk_size_mb,
            class.chunk_size_mb,
        )?,
        parallel_count: override_integer(
            keys::PARALLEL_COUNT,
            &claim.parallel_count,
            class.parallel_count,
        )?,
        multireq_max: override_integer(keys::MULTIREQ_MAX, &claim.multireq_max, class.multireq_max)?,
        stat_cache_size: override_integer(
            keys::STAT_CACHE_SIZE,
            &claim.stat_cache_size,
            class.stat_cache_size,
        )?,
        stat_cache_expire_seconds: stat_cache_expire_seconds(&claim.stat_cache_expire_seconds)?,
        tls_cipher_suite: class.tls_cipher_suite.clone(),
        debug_level: class.debug_level.clone(),
        curl_debug: class.curl_debug,
        kernel_cache: class.kernel_cache,
    })
}

/// Picks the claim value when it is non-empty, else the class value.
#[must_use]
pub fn override_text(claim: &str, class: &str) -> String {
    let winner = if claim.is_empty() { class } else { claim };
    winner.to_owned()
}

/// Requires `value` to start with `http://` or `https://`.
///
/// # Errors
///
/// Returns [`ProvisionerError::Validation`] naming `field` otherwise.
pub fn require_http_scheme(field: &str, value: &str) -> Result<(), ProvisionerError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        return Ok(());
    }
    Err(ProvisionerError::validation(format!(
        "bad value for {field} {value:?}: scheme is missing, expected http://<hostname> or https://<hostname>"
    )))
}

/// Parses a non-empty claim string over the class's typed value.
///
/// # Errors
///
/// Returns [`ProvisionerError::ConfigParse`] naming `field` when the claim
/// string is not a decimal integer.
pub fn override_integer(field: &str, claim: &str, class: i64) -> Result<i64, ProvisionerError> {
    if claim.is_empty() {
        return Ok(class);
    }
    claim
        .parse::<i64>()
        .map_err(|err| ProvisionerError::config_parse(field, err))
}

/// Validates the claim-only stat cache expiry and passes it through.
///
/// # Errors
///
/// Returns [`ProvisionerError::ConfigParse`] when the value is not an
/// integer and [`ProvisionerError::Validation`] when it is negative.
pub fn stat_cache_expire_seconds(claim: &str) -> Result<String, ProvisionerError> {
    if claim.is_empty() {
        return Ok(String::new());
    }
    let seconds = claim
        .parse::<i64>()
        .map_err(|err| ProvisionerError::config_parse(keys::STAT_CACHE_EXPIRE_SECONDS, err))?;
    if seconds < 0 {
        return Err(ProvisionerError::validation(format!(
            "value of {} should be >= 0, got {seconds}",
            keys::STAT_CACHE_EXPIRE_SECONDS
        )));
    }
    Ok(claim.to_owned())
}
