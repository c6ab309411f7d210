//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Mount driver registered on provisioned volumes unless overridden.
pub const DEFAULT_DRIVER_NAME: &str = "ibm/ibmc-s3fs";

/// Environment variable consulted when no cluster id is configured.
pub const CLUSTER_ID_ENV: &str = "CLUSTER_ID";

/// Provisioner settings derived from environment variables, configuration
/// files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "S3FS_PROVISIONER")]
pub struct ProvisionerConfig {
    /// Mount driver written onto provisioned volumes. Defaults to
    /// `ibm/ibmc-s3fs`.
    #[ortho_config(default = "ibm/ibmc-s3fs".to_owned())]
    pub driver_name: String,
    /// Cluster identifier attached to log events. Falls back to the
    /// `CLUSTER_ID` environment variable.
    pub cluster_id: Option<String>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            driver_name: DEFAULT_DRIVER_NAME.to_owned(),
            cluster_id: None,
        }
    }
}

impl ProvisionerConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files and environment variables in that
    /// order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("s3fs-provisioner")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Rejects an empty driver name with guidance on where to set it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the driver name is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver_name.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "missing mount driver name: set S3FS_PROVISIONER_DRIVER_NAME or add \
                 driver_name to s3fs-provisioner.toml",
            )));
        }
        Ok(())
    }

    /// Returns the cluster id used in log events, or an empty string.
    #[must_use]
    pub fn cluster_id(&self) -> String {
        self.cluster_id
            .clone()
            .or_else(|| std::env::var(CLUSTER_ID_ENV).ok())
            .unwrap_or_default()
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
