//! Provisioner error types.
//!
//! Request-time failures are represented by [`ProvisionError`]; startup
//! failures by [`ConfigError`].  Filesystem failures keep the original
//! [`std::io::Error`] as their source so the external controller sees the
//! exact cause.  Nothing in this crate retries: every error is handed back
//! to the caller, which owns backoff and alerting.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for provisioning and deletion.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The requested location would not be a descendant of the storage root.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending name or override, as supplied.
        path: String,
        /// Human-readable rejection reason.
        reason: &'static str,
    },

    /// Creating the backing directory failed.
    #[error("create dir {}: {source}", path.display())]
    ProvisionIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The volume carries no ownership annotation and cannot be attributed.
    #[error("identity annotation not found on volume {volume}")]
    MissingIdentity {
        /// Name of the volume object.
        volume: String,
    },

    /// The volume belongs to another provisioner instance.
    ///
    /// This is not a failure: the caller must neither retry nor alert.
    #[error("ignored volume {volume}: owned by {owner:?}, not by this provisioner")]
    Ignored {
        /// Name of the volume object.
        volume: String,
        /// Identity recorded on the volume.
        owner: String,
    },

    /// Removing the backing directory failed.
    #[error("remove dir {}: {source}", path.display())]
    DeleteIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The caller cancelled the operation before a filesystem call started.
    #[error("operation cancelled")]
    Cancelled,
}

impl ProvisionError {
    /// `true` for the distinguished "not my volume" signal.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    /// Whether repeating the same call could succeed.
    ///
    /// Malformed requests and ownership decisions fail identically every
    /// time; filesystem errors and cancellation may be transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProvisionIo { .. } | Self::DeleteIo { .. } | Self::Cancelled => true,
            Self::InvalidPath { .. } | Self::MissingIdentity { .. } | Self::Ignored { .. } => {
                false
            }
        }
    }

    pub(crate) fn invalid_path(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_owned(),
            reason,
        }
    }
}

/// Startup configuration errors.  Any of these aborts the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The plugin identity was not provided.
    #[error("env variable {var} must be set so that this provisioner can identify itself")]
    MissingIdentity { var: &'static str },

    /// The storage root must be an absolute path.
    #[error("storage root {} is not an absolute path", path.display())]
    RelativeStorageRoot { path: PathBuf },
}
