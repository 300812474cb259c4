//! Backing directory creation and volume asset construction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::ProvisionError;
use crate::types::{
    Ownership, ProvisioningOutcome, RESOURCE_STORAGE, ResourceList, VolumeAsset, VolumeRequest,
};

/// Mode of every created backing directory.  The process umask must be
/// cleared at startup for the mode to be applied unmasked.
pub const VOLUME_DIR_MODE: u32 = 0o777;

/// Creates backing directories and stamps the resulting [`VolumeAsset`]
/// with this provisioner's ownership metadata.
#[derive(Debug, Clone)]
pub struct VolumeAssetBuilder {
    identity: String,
}

impl VolumeAssetBuilder {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    /// Create `path` (and missing ancestors) and describe it as a volume.
    ///
    /// Idempotent: an existing directory is success.  Any other filesystem
    /// error is returned as-is.  Provisioning is always reported as
    /// [`ProvisioningOutcome::Finished`].
    #[instrument(skip(self, ctx, request), fields(name = %request.name, path = %path.display()))]
    pub async fn build(
        &self,
        ctx: &CancellationToken,
        request: &VolumeRequest,
        path: PathBuf,
    ) -> Result<(VolumeAsset, ProvisioningOutcome), ProvisionError> {
        if ctx.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }

        create_volume_dir(&path).await?;

        let mut annotations = BTreeMap::new();
        Ownership::new(self.identity.as_str(), path.as_path()).write_annotations(&mut annotations);

        let capacity: ResourceList = request
            .storage()
            .map(|q| ResourceList::from([(RESOURCE_STORAGE.to_owned(), q.to_owned())]))
            .unwrap_or_default();

        let asset = VolumeAsset {
            name: request.name.clone(),
            annotations,
            reclaim_policy: request.reclaim_policy,
            access_modes: request.access_modes.clone(),
            capacity,
            host_path: path,
        };

        info!(identity = %self.identity, "volume provisioned");
        Ok((asset, ProvisioningOutcome::Finished))
    }
}

async fn create_volume_dir(path: &Path) -> Result<(), ProvisionError> {
    if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) {
        debug!("backing directory already exists, assuming idempotent retry");
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true).mode(VOLUME_DIR_MODE);
    builder
        .create(path)
        .await
        .map_err(|source| ProvisionError::ProvisionIo {
            path: path.to_path_buf(),
            source,
        })
}
