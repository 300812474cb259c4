//! Provisioner capability trait.
//!
//! This is the surface the external provisioning controller drives: it calls
//! [`Provisioner::provision`] once per unsatisfied claim and
//! [`Provisioner::delete`] once per released volume, from as many worker
//! tasks as it likes.  The controller must not run a `provision` and a
//! `delete` for the same volume name concurrently.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProvisionError;
use crate::types::{ProvisioningOutcome, VolumeAsset, VolumeRequest};

/// Volume lifecycle operations.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create the storage backing `request` and describe it as a volume.
    ///
    /// The returned [`VolumeAsset`] must be persisted by the caller; it is
    /// the only record of the volume.  On error the provisioning state is
    /// [`ProvisioningOutcome::Finished`] as well: no work is left running.
    async fn provision(
        &self,
        ctx: &CancellationToken,
        request: VolumeRequest,
    ) -> Result<(VolumeAsset, ProvisioningOutcome), ProvisionError>;

    /// Destroy the storage behind a volume previously returned by
    /// [`Provisioner::provision`].
    ///
    /// Fails with [`ProvisionError::Ignored`] when the volume belongs to
    /// another provisioner instance; see [`ProvisionError::is_ignored`].
    async fn delete(&self, ctx: &CancellationToken, asset: &VolumeAsset) -> Result<(), ProvisionError>;
}
