//! Ownership check and idempotent removal of backing directories.
//!
//! Resolution order for a volume handed back by the controller:
//!
//! 1. No identity annotation → [`ProvisionError::MissingIdentity`].
//! 2. Identity of another instance → [`DeletionOutcome::Ignored`].
//! 3. Recorded path → remove it; legacy volume without a path →
//!    remove `<root>/<volume name>`.

use std::io;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::ProvisionError;
use crate::types::{BackingLocation, DeletionOutcome, VolumeAsset};

/// What deleting a volume would touch.
enum Target {
    /// Ours; remove this directory.
    Owned(PathBuf),
    /// Created by the named instance; leave it alone.
    Foreign(String),
}

/// Decides whether this instance owns a volume and removes its directory.
#[derive(Debug, Clone)]
pub struct DeletionGuard {
    identity: String,
    storage_root: PathBuf,
}

impl DeletionGuard {
    pub fn new(identity: impl Into<String>, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            storage_root: storage_root.into(),
        }
    }

    fn target(&self, asset: &VolumeAsset) -> Result<Target, ProvisionError> {
        let ownership = asset
            .ownership()
            .ok_or_else(|| ProvisionError::MissingIdentity {
                volume: asset.name.clone(),
            })?;

        if ownership.identity != self.identity {
            return Ok(Target::Foreign(ownership.identity));
        }

        let path = match ownership.location {
            BackingLocation::Recorded(path) => path,
            BackingLocation::Legacy => {
                let path = crate::path::resolve(&self.storage_root, &asset.name, None)?;
                debug!(path = %path.display(), "no path annotation, using legacy location");
                path
            }
        };
        Ok(Target::Owned(path))
    }

    /// Check ownership of `asset` and remove its backing directory.
    #[instrument(skip(self, ctx, asset), fields(name = %asset.name))]
    pub async fn prepare_and_delete(
        &self,
        ctx: &CancellationToken,
        asset: &VolumeAsset,
    ) -> Result<DeletionOutcome, ProvisionError> {
        let path = match self.target(asset)? {
            Target::Owned(path) => path,
            Target::Foreign(owner) => {
                warn!(%owner, identity = %self.identity, "identity annotation on volume does not match ours");
                return Ok(DeletionOutcome::Ignored { owner });
            }
        };

        if ctx.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }

        let outcome = remove_all(&path).await?;
        match &outcome {
            DeletionOutcome::Removed(_) => info!(%outcome, "volume deleted"),
            _ => debug!(%outcome, "backing directory gone, nothing to delete"),
        }
        Ok(outcome)
    }
}

/// Remove `path` and everything below it.  A missing path is success; a
/// non-directory at `path` is removed as a file.
async fn remove_all(path: &Path) -> Result<DeletionOutcome, ProvisionError> {
    let delete_err = |source: io::Error| ProvisionError::DeleteIo {
        path: path.to_path_buf(),
        source,
    };

    let meta = match tokio::fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(DeletionOutcome::AlreadyAbsent(path.to_path_buf()));
        }
        Err(e) => return Err(delete_err(e)),
    };

    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match removed {
        Ok(()) => Ok(DeletionOutcome::Removed(path.to_path_buf())),
        // Lost a race with another remover; the end state is the same.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(DeletionOutcome::AlreadyAbsent(path.to_path_buf()))
        }
        Err(e) => Err(delete_err(e)),
    }
}
