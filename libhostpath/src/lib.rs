//! # libhostpath — host-directory volume provisioning for RK8s
//!
//! `libhostpath` backs cluster-managed persistent volumes with plain
//! directories under a node-local storage root.  An external provisioning
//! controller owns the watch loop, retries and leader election; this crate
//! only decides *where* a volume lives, stamps ownership metadata onto the
//! resulting volume object, and guards deletion so a node never removes a
//! directory it does not own.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Data model: `VolumeRequest`, `VolumeAsset`, ownership metadata. |
//! | [`error`] | [`ProvisionError`] and [`ConfigError`]. |
//! | [`config`] | [`ProvisionerConfig`], read once at startup. |
//! | [`path`] | Backing path resolution confined to the storage root. |
//! | [`asset`] | [`VolumeAssetBuilder`] — directory creation + asset stamping. |
//! | [`guard`] | [`DeletionGuard`] — ownership check + idempotent removal. |
//! | [`identity`] | [`ProvisionerIdentity`] trait — name, identity, health. |
//! | [`provisioner`] | [`Provisioner`] trait consumed by the external controller. |
//! | [`backend`] | Concrete provisioners (host path). |

pub mod asset;
pub mod backend;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod path;
pub mod provisioner;
pub mod types;

pub use asset::VolumeAssetBuilder;
pub use backend::hostpath::HostPathProvisioner;
pub use config::ProvisionerConfig;
pub use error::{ConfigError, ProvisionError};
pub use guard::DeletionGuard;
pub use identity::ProvisionerIdentity;
pub use provisioner::Provisioner;
pub use types::*;

// Re-exported so callers do not need a direct tokio-util dependency to
// drive the capability traits.
pub use tokio_util::sync::CancellationToken;
