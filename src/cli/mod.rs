//! Command-line interface definitions for the `s3fs-provisioner` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `s3fs-provisioner` binary.
#[derive(Debug, Parser)]
#[command(
    name = "s3fs-provisioner",
    about = "Preview how s3fs object-storage volumes are provisioned and torn down",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Resolve and validate a claim, then print the volume it would produce.
    #[command(
        name = "plan",
        about = "Resolve and validate a claim, then print the volume it would produce"
    )]
    Plan(PlanCommand),
    /// Read a persisted volume and print what teardown would do.
    #[command(name = "inspect", about = "Read a persisted volume and print what teardown would do")]
    Inspect(InspectCommand),
}

/// Arguments for the `s3fs-provisioner plan` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct PlanCommand {
    /// Path to a JSON file holding the claim annotations.
    #[arg(long, value_name = "PATH")]
    pub(crate) claim: String,
    /// Path to a JSON file holding the storage-class parameters.
    #[arg(long, value_name = "PATH")]
    pub(crate) class: String,
    /// Namespace of the claim and of its credential secret.
    #[arg(long, value_name = "NAMESPACE", default_value = "default")]
    pub(crate) namespace: String,
    /// Name of the claim, used in log events and errors.
    #[arg(long, value_name = "NAME", default_value = "claim")]
    pub(crate) claim_name: String,
    /// Name given to the planned volume.
    #[arg(long, value_name = "NAME", default_value = "volume")]
    pub(crate) volume_name: String,
}

/// Arguments for the `s3fs-provisioner inspect` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct InspectCommand {
    /// JSON document of a volume produced by provisioning.
    #[arg(long, value_name = "PATH")]
    pub(crate) volume: String,
}
