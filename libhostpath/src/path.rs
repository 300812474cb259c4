//! Backing path resolution.
//!
//! A volume lives at `<root>/<name>` unless the claim carries a location
//! override, in which case it lives at `<root>/<override>`.  Both inputs are
//! untrusted: they are normalized lexically (no filesystem access, no
//! symlink resolution) and rejected unless the result is a strict
//! descendant of the root.
//!
//! Lexical confinement alone does not stop a symlink planted inside the
//! root from redirecting creation elsewhere, so [`reject_symlinks`] checks
//! the existing components below the root before anything is created.  The
//! root itself may be a symlink.

use std::path::{Component, Path, PathBuf};

use crate::error::ProvisionError;

/// Resolve the backing directory for a volume.
///
/// * `root` — the configured storage root
/// * `name` — the volume name chosen by the controller
/// * `location` — optional relative location override from the claim
pub fn resolve(root: &Path, name: &str, location: Option<&str>) -> Result<PathBuf, ProvisionError> {
    let relative = confine(location.unwrap_or(name))?;
    Ok(root.join(relative))
}

/// Fail with [`ProvisionError::InvalidPath`] if any existing component of
/// `path` below `root` is a symlink.
///
/// Components that do not exist yet are fine: they will be created as real
/// directories.
pub async fn reject_symlinks(root: &Path, path: &Path) -> Result<(), ProvisionError> {
    let Ok(relative) = path.strip_prefix(root) else {
        return Err(ProvisionError::invalid_path(
            &path.to_string_lossy(),
            "path is outside the storage root",
        ));
    };

    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match tokio::fs::symlink_metadata(&current).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(ProvisionError::invalid_path(
                    &current.to_string_lossy(),
                    "symlink below the storage root",
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(ProvisionError::ProvisionIo {
                    path: current,
                    source,
                });
            }
        }
    }
    Ok(())
}

/// Lexically normalize `input` as a path relative to the storage root.
///
/// Fails when the input is absolute, when a `..` segment climbs above the
/// root, or when nothing is left after normalization (the root itself is
/// never a volume).
fn confine(input: &str) -> Result<PathBuf, ProvisionError> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(input).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(ProvisionError::invalid_path(
                        input,
                        "parent traversal escapes the storage root",
                    ));
                }
            }
            Component::Normal(part) => parts.push(part),
            Component::RootDir | Component::Prefix(_) => {
                return Err(ProvisionError::invalid_path(
                    input,
                    "absolute paths are not allowed",
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(ProvisionError::invalid_path(
            input,
            "path resolves to the storage root itself",
        ));
    }

    Ok(parts.into_iter().collect())
}
