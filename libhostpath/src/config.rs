//! Provisioner startup configuration.
//!
//! Read once at process start and passed explicitly into every component;
//! nothing re-reads the environment afterwards.
//!
//! Environment variables:
//! - `HOSTPATH_PROVISIONER_NAME`: provisioner name storage classes refer to.
//!   Defaults to `hostpath`.
//! - `NODE_NAME`: identity stamped onto provisioned volumes. Required.
//! - `NODE_HOST_PATH`: storage root for backing directories.
//!   Defaults to `/mnt/hostpath`.
//! - `NODE_HOST_PATH_ANNOTATION`: claim annotation carrying a location
//!   override. Defaults to `hostPath`.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const ENV_PROVISIONER_NAME: &str = "HOSTPATH_PROVISIONER_NAME";
pub const ENV_NODE_NAME: &str = "NODE_NAME";
pub const ENV_NODE_HOST_PATH: &str = "NODE_HOST_PATH";
pub const ENV_NODE_HOST_PATH_ANNOTATION: &str = "NODE_HOST_PATH_ANNOTATION";

pub const DEFAULT_PROVISIONER_NAME: &str = "hostpath";
pub const DEFAULT_STORAGE_ROOT: &str = "/mnt/hostpath";
pub const DEFAULT_OVERRIDE_ANNOTATION: &str = "hostPath";

/// Immutable, process-wide provisioner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerConfig {
    /// Name the external controller registers this provisioner under.
    pub name: String,
    /// Identity of this instance, set to the node name.
    pub identity: String,
    /// Directory under which every backing directory is created.
    pub storage_root: PathBuf,
    /// Claim annotation key that requests a specific location in the tree.
    pub override_annotation: String,
}

impl ProvisionerConfig {
    /// Configuration with defaults for everything but the identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_PROVISIONER_NAME.to_owned(),
            identity: identity.into(),
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            override_annotation: DEFAULT_OVERRIDE_ANNOTATION.to_owned(),
        }
    }

    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let identity = get(ENV_NODE_NAME).ok_or(ConfigError::MissingIdentity {
            var: ENV_NODE_NAME,
        })?;
        let storage_root = get(ENV_NODE_HOST_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT));
        if !storage_root.is_absolute() {
            return Err(ConfigError::RelativeStorageRoot { path: storage_root });
        }

        Ok(Self {
            name: get(ENV_PROVISIONER_NAME)
                .unwrap_or_else(|| DEFAULT_PROVISIONER_NAME.to_owned()),
            identity,
            storage_root,
            override_annotation: get(ENV_NODE_HOST_PATH_ANNOTATION)
                .unwrap_or_else(|| DEFAULT_OVERRIDE_ANNOTATION.to_owned()),
        })
    }
}
