//! Core provisioning types: requests, volume assets, and ownership metadata.
//!
//! These types are shared by the path resolver, the asset builder, the
//! deletion guard and the binary.  They are all [`Serialize`]/[`Deserialize`]
//! so the external controller can hand them over as JSON.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Annotation recording which provisioner instance created a volume.
pub const ANN_PROVISIONER_IDENTITY: &str = "hostPathProvisionerIdentity";

/// Annotation recording the backing directory of a volume.
pub const ANN_PROVISIONER_PATH: &str = "hostPathProvisionerPath";

/// Resource name of the storage dimension in a [`ResourceList`].
pub const RESOURCE_STORAGE: &str = "storage";

/// Resource name to quantity string, e.g. `{"storage": "1Gi"}`.
pub type ResourceList = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Access mode & reclaim policy
// ---------------------------------------------------------------------------

/// Describes how a volume may be accessed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessMode {
    /// Single-node read-write.
    ReadWriteOnce,
    /// Multi-node read-only.
    ReadOnlyMany,
    /// Multi-node read-write.
    ReadWriteMany,
    /// Single-pod read-write.
    ReadWriteOncePod,
}

/// What the cluster does with a volume once its claim is released.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReclaimPolicy {
    Retain,
    #[default]
    Delete,
    Recycle,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Inbound ask for backing storage, scoped to a single `provision` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeRequest {
    /// Unique volume name chosen by the controller.
    pub name: String,
    /// Claim annotations; may carry the location override.
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// Reclaim policy of the storage class.
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
    /// Requested access modes.
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    /// Requested resources; only [`RESOURCE_STORAGE`] is carried through.
    #[serde(default)]
    pub resources: ResourceList,
}

impl VolumeRequest {
    /// Requested storage quantity, if any.
    pub fn storage(&self) -> Option<&str> {
        self.resources.get(RESOURCE_STORAGE).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Volume asset
// ---------------------------------------------------------------------------

/// Provisioned volume object, persisted by the external controller.
///
/// The plugin keeps no registry of these; the copy in the cluster store is
/// the only source of truth and is handed back verbatim on deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAsset {
    /// Same as the request name.
    pub name: String,
    /// Object annotations, including the ownership metadata.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
    #[serde(default)]
    pub access_modes: Vec<AccessMode>,
    /// Capacity; contains only the storage dimension.
    #[serde(default)]
    pub capacity: ResourceList,
    /// Host-path volume source pointing at the backing directory.
    pub host_path: PathBuf,
}

impl VolumeAsset {
    /// Typed view of the ownership annotations.
    pub fn ownership(&self) -> Option<Ownership> {
        Ownership::from_annotations(&self.annotations)
    }
}

// ---------------------------------------------------------------------------
// Ownership metadata
// ---------------------------------------------------------------------------

/// Where the backing directory of an owned volume lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackingLocation {
    /// Path recorded at provisioning time.
    Recorded(PathBuf),
    /// Volume predates the path annotation; the location is
    /// `<storage root>/<volume name>`.
    Legacy,
}

/// Ownership metadata stamped onto every provisioned volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    /// Identity of the provisioner instance that created the volume.
    pub identity: String,
    pub location: BackingLocation,
}

impl Ownership {
    /// Metadata for a freshly provisioned volume.
    pub fn new(identity: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            identity: identity.into(),
            location: BackingLocation::Recorded(path.into()),
        }
    }

    /// Parse the well-known annotation keys.
    ///
    /// Returns `None` when the identity annotation is absent.  A missing
    /// path annotation is the legacy case, not an error.
    pub fn from_annotations(annotations: &BTreeMap<String, String>) -> Option<Self> {
        let identity = annotations.get(ANN_PROVISIONER_IDENTITY)?.clone();
        let location = match annotations.get(ANN_PROVISIONER_PATH) {
            Some(path) => BackingLocation::Recorded(PathBuf::from(path)),
            None => BackingLocation::Legacy,
        };
        Some(Self { identity, location })
    }

    /// Write the metadata into an annotation map.
    pub fn write_annotations(&self, annotations: &mut BTreeMap<String, String>) {
        annotations.insert(ANN_PROVISIONER_IDENTITY.to_owned(), self.identity.clone());
        if let BackingLocation::Recorded(path) = &self.location {
            annotations.insert(
                ANN_PROVISIONER_PATH.to_owned(),
                path.to_string_lossy().into_owned(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Provisioning state reported back to the external controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    /// Terminal: provisioning finished (successfully or not).
    Finished,
    /// Work continues in the background; the controller must call again.
    InBackground,
    /// Nothing changed; the controller keeps its previous state.
    NoChange,
}

/// Result of a deletion attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The backing directory existed and was removed.
    Removed(PathBuf),
    /// Nothing was on disk at the resolved path.
    AlreadyAbsent(PathBuf),
    /// The volume belongs to another provisioner instance; left untouched.
    Ignored { owner: String },
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removed(path) => write!(f, "removed {}", path.display()),
            Self::AlreadyAbsent(path) => write!(f, "already absent {}", path.display()),
            Self::Ignored { owner } => write!(f, "ignored (owned by {owner})"),
        }
    }
}
