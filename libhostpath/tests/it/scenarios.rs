//! Concrete resolution and deletion scenarios for a `node-7` provisioner.

use std::path::{Path, PathBuf};

use libhostpath::{
    ANN_PROVISIONER_IDENTITY, ANN_PROVISIONER_PATH, CancellationToken, Ownership, Provisioner,
    ProvisionError, VolumeAsset, path,
};

use crate::common::{IDENTITY, entries, init_logger, provisioner, request, request_at};

#[test]
fn default_location_under_root() {
    let resolved = path::resolve(Path::new("/data/vols"), "vol-001", None).unwrap();
    assert_eq!(resolved, PathBuf::from("/data/vols/vol-001"));
}

#[test]
fn override_location_under_root() {
    let resolved =
        path::resolve(Path::new("/data/vols"), "vol-001", Some("shared/team-a")).unwrap();
    assert_eq!(resolved, PathBuf::from("/data/vols/shared/team-a"));
}

#[tokio::test]
async fn default_location_annotations() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("data/vols");
    let prov = provisioner(&root, IDENTITY);

    let (asset, _) = prov
        .provision(&CancellationToken::new(), request("vol-001"))
        .await
        .unwrap();

    let expected = root.join("vol-001");
    assert_eq!(asset.host_path, expected);
    assert_eq!(
        asset.ownership(),
        Some(Ownership::new(IDENTITY, expected.clone()))
    );
    assert_eq!(asset.annotations.len(), 2);
    assert_eq!(asset.annotations[ANN_PROVISIONER_IDENTITY], IDENTITY);
    assert_eq!(
        asset.annotations[ANN_PROVISIONER_PATH],
        expected.to_string_lossy()
    );
}

#[tokio::test]
async fn traversal_override_creates_nothing() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("vols");
    std::fs::create_dir(&root).unwrap();
    let prov = provisioner(&root, IDENTITY);

    for location in ["../etc", "/etc", "shared/../../etc"] {
        let err = prov
            .provision(&CancellationToken::new(), request_at("vol-001", location))
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidPath { .. }), "{location}");
        assert!(!err.is_retryable());
    }

    assert_eq!(entries(&root), 0);
    assert_eq!(entries(tmp.path()), 1);
}

#[tokio::test]
async fn legacy_volume_removes_computed_location() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("vol-002");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(dir.join("payload"), b"data").unwrap();

    let legacy = VolumeAsset {
        name: "vol-002".into(),
        annotations: [(ANN_PROVISIONER_IDENTITY.to_owned(), IDENTITY.to_owned())].into(),
        reclaim_policy: Default::default(),
        access_modes: Vec::new(),
        capacity: Default::default(),
        host_path: dir.clone(),
    };

    provisioner(tmp.path(), IDENTITY)
        .delete(&CancellationToken::new(), &legacy)
        .await
        .unwrap();
    assert!(!dir.exists());
}
