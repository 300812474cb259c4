//! Host-path provisioner backend.
//!
//! [`HostPathProvisioner`] implements [`Provisioner`] and
//! [`ProvisionerIdentity`] by creating one directory per volume under a
//! node-local storage root.
//!
//! # On-disk layout
//!
//! ```text
//! <storage_root>/
//!   <volume-name>/          # default location
//!   <override>/             # location requested by the claim annotation
//! ```
//!
//! No state is kept between calls: ownership and location travel on the
//! volume object the controller persists.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::asset::VolumeAssetBuilder;
use crate::config::ProvisionerConfig;
use crate::error::ProvisionError;
use crate::guard::DeletionGuard;
use crate::identity::ProvisionerIdentity;
use crate::path;
use crate::provisioner::Provisioner;
use crate::types::{DeletionOutcome, ProvisioningOutcome, VolumeAsset, VolumeRequest};

/// Provisioner backed by directories on the host filesystem.
///
/// # Thread safety
///
/// Holds only the immutable startup configuration, so a single instance can
/// be shared across any number of controller worker tasks.
#[derive(Debug, Clone)]
pub struct HostPathProvisioner {
    config: ProvisionerConfig,
    builder: VolumeAssetBuilder,
    guard: DeletionGuard,
}

impl HostPathProvisioner {
    pub fn new(config: ProvisionerConfig) -> Self {
        Self {
            builder: VolumeAssetBuilder::new(config.identity.as_str()),
            guard: DeletionGuard::new(config.identity.as_str(), config.storage_root.as_path()),
            config,
        }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }
}

#[async_trait]
impl ProvisionerIdentity for HostPathProvisioner {
    fn provisioner_name(&self) -> &str {
        &self.config.name
    }

    fn identity(&self) -> &str {
        &self.config.identity
    }

    async fn probe(&self) -> bool {
        // Healthy when the storage root exists and is a directory.
        tokio::fs::metadata(&self.config.storage_root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Provisioner for HostPathProvisioner {
    #[instrument(skip_all, fields(name = %request.name))]
    async fn provision(
        &self,
        ctx: &CancellationToken,
        request: VolumeRequest,
    ) -> Result<(VolumeAsset, ProvisioningOutcome), ProvisionError> {
        let location = request
            .annotations
            .get(&self.config.override_annotation)
            .map(String::as_str);
        if let Some(location) = location {
            debug!(location, "claim requests a specific location");
        }

        let resolved = path::resolve(&self.config.storage_root, &request.name, location)?;
        path::reject_symlinks(&self.config.storage_root, &resolved).await?;
        self.builder.build(ctx, &request, resolved).await
    }

    #[instrument(skip_all, fields(name = %asset.name))]
    async fn delete(
        &self,
        ctx: &CancellationToken,
        asset: &VolumeAsset,
    ) -> Result<(), ProvisionError> {
        match self.guard.prepare_and_delete(ctx, asset).await? {
            DeletionOutcome::Ignored { owner } => Err(ProvisionError::Ignored {
                volume: asset.name.clone(),
                owner,
            }),
            DeletionOutcome::Removed(_) | DeletionOutcome::AlreadyAbsent(_) => Ok(()),
        }
    }
}
