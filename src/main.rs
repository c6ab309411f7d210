//! Binary entry point for the s3fs provisioner CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use clap::Parser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use s3fs_provisioner::{
    Annotations, ConfigError, PersistentVolume, ProvisionPlan, ProvisionRequest,
    ProvisionerConfig, TeardownReport, UuidTokenGenerator, WorkflowError,
};

mod cli;

use cli::{Cli, InspectCommand, PlanCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read {path}: {message}")]
    Read { path: String, message: String },
    #[error("invalid JSON in {path}: {message}")]
    Json { path: String, message: String },
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
    #[error("cannot initialise logging: {0}")]
    Tracing(String),
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match init_tracing().and_then(|()| dispatch(&cli)) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

/// Installs a stderr subscriber so JSON on stdout stays machine-readable.
fn init_tracing() -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| CliError::Tracing(err.to_string()))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|err| CliError::Tracing(err.to_string()))
}

fn dispatch(cli: &Cli) -> Result<(), CliError> {
    match cli {
        Cli::Plan(command) => plan(command),
        Cli::Inspect(command) => inspect(command),
    }
}

fn plan(args: &PlanCommand) -> Result<(), CliError> {
    let config = ProvisionerConfig::load_without_cli_args()?;
    config.validate()?;

    let claim: Annotations = read_json(&args.claim)?;
    let class: Annotations = read_json(&args.class)?;
    let request = ProvisionRequest::new(&args.volume_name, &args.claim_name, &args.namespace)
        .with_claim_annotations(claim)
        .with_class_parameters(class);

    let plan = ProvisionPlan::prepare(&request, &UuidTokenGenerator)?;
    write_json(&plan.report(&request, &config.driver_name))
}

fn inspect(args: &InspectCommand) -> Result<(), CliError> {
    let volume: PersistentVolume = read_json(&args.volume)?;
    write_json(&TeardownReport::from_volume(&volume)?)
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let content = read_to_string_ambient(path).map_err(|message| CliError::Read {
        path: path.to_owned(),
        message,
    })?;
    serde_json::from_str(&content).map_err(|err| CliError::Json {
        path: path.to_owned(),
        message: err.to_string(),
    })
}

fn read_to_string_ambient(path: &str) -> Result<String, String> {
    let path_buf = Utf8Path::new(path);
    let file_name = path_buf
        .file_name()
        .ok_or_else(|| format!("path has no file name: {path_buf}"))?;
    let dir_path = match path_buf.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };

    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_name).map_err(|err| err.to_string())
}

fn write_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(io::stdout(), "{rendered}")?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
