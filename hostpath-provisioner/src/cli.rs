use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Host-path volume provisioner.
///
/// Configuration is read from the environment: `NODE_NAME` (required),
/// `NODE_HOST_PATH`, `NODE_HOST_PATH_ANNOTATION`, `HOSTPATH_PROVISIONER_NAME`.
#[derive(Parser, Debug)]
#[command(name = "hostpath-provisioner", version, about)]
pub struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Provision a volume from a JSON `VolumeRequest` and print the asset.
    Provision {
        /// Request file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        request: PathBuf,
    },
    /// Delete the storage behind a JSON `VolumeAsset`.
    Delete {
        /// Volume file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        volume: PathBuf,
    },
    /// Check that the storage root is usable.
    Probe,
    /// Print the provisioner name, identity and storage root.
    Info,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}
