//! hostpath-provisioner binary
//!
//! Thin process wrapper around [`libhostpath`]: clears the umask, installs
//! logging, loads the configuration from the environment and exposes the
//! provisioner capabilities as subcommands exchanging JSON on stdio.
//!
//! ```bash
//! NODE_NAME=node-7 hostpath-provisioner provision --request pvc.json > pv.json
//! NODE_NAME=node-7 hostpath-provisioner delete --volume pv.json
//! ```

mod cli;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use libhostpath::{
    CancellationToken, HostPathProvisioner, Provisioner, ProvisionerConfig, ProvisionerIdentity,
    ProvisioningOutcome, VolumeAsset, VolumeRequest,
};
use nix::sys::stat::{Mode, umask};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, LogFormat};

/// Output of the `provision` subcommand.
#[derive(Debug, Serialize)]
struct ProvisionResult {
    asset: VolumeAsset,
    outcome: ProvisioningOutcome,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays machine-readable.
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

/// Read a JSON document from `path`, or from stdin when `path` is `-`.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn run(command: Command, provisioner: HostPathProvisioner) -> Result<ExitCode> {
    let ctx = CancellationToken::new();

    match command {
        Command::Provision { request } => {
            let request: VolumeRequest = read_json(&request)?;
            let (asset, outcome) = provisioner
                .provision(&ctx, request)
                .await
                .context("Failed to provision volume")?;
            let out = serde_json::to_string_pretty(&ProvisionResult { asset, outcome })?;
            println!("{out}");
        }
        Command::Delete { volume } => {
            let asset: VolumeAsset = read_json(&volume)?;
            match provisioner.delete(&ctx, &asset).await {
                Ok(()) => {}
                Err(e) if e.is_ignored() => info!(reason = %e, "volume ignored"),
                Err(e) => return Err(e).context("Failed to delete volume"),
            }
        }
        Command::Probe => {
            let healthy = provisioner.probe().await;
            println!("{healthy}");
            if !healthy {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Info => {
            let config = provisioner.config();
            println!("name: {}", provisioner.provisioner_name());
            println!("identity: {}", provisioner.identity());
            println!("storage root: {}", config.storage_root.display());
            println!("override annotation: {}", config.override_annotation);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Created directories must get exactly the requested mode.
    umask(Mode::empty());

    let cli = Cli::parse();
    init_logging(cli.log_format);

    let config = match ProvisionerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        name = %config.name,
        identity = %config.identity,
        storage_root = %config.storage_root.display(),
        "hostpath provisioner configured",
    );

    match run(cli.command, HostPathProvisioner::new(config)).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
