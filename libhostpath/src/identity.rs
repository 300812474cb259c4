//! Provisioner identity service trait.
//!
//! Lets the external controller discover which provisioner name to match
//! storage classes against and probe the plugin's health.

use async_trait::async_trait;

/// Identity service — provisioner discovery and health probing.
#[async_trait]
pub trait ProvisionerIdentity: Send + Sync {
    /// Name storage classes use to select this provisioner.
    fn provisioner_name(&self) -> &str;

    /// Identity stamped onto every volume this instance provisions.
    fn identity(&self) -> &str;

    /// Liveness probe.  Returns `true` when the plugin can serve requests.
    async fn probe(&self) -> bool;
}
