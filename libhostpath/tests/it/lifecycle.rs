//! Provision / delete round trips through the public capability traits.

use libhostpath::{
    ANN_PROVISIONER_IDENTITY, AccessMode, CancellationToken, Provisioner, ProvisionError,
    RESOURCE_STORAGE, ReclaimPolicy, ResourceList, VolumeAsset, VolumeRequest,
};

use crate::common::{IDENTITY, init_logger, provisioner, request, request_at};

#[tokio::test]
async fn provision_twice_is_idempotent() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);
    let ctx = CancellationToken::new();

    let (first, _) = prov.provision(&ctx, request("vol-001")).await.unwrap();
    let (second, _) = prov.provision(&ctx, request("vol-001")).await.unwrap();

    assert_eq!(first.annotations, second.annotations);
    assert_eq!(first, second);
}

#[tokio::test]
async fn round_trip_recreates_from_scratch() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);
    let ctx = CancellationToken::new();

    let (asset, _) = prov.provision(&ctx, request("vol-001")).await.unwrap();
    std::fs::write(asset.host_path.join("payload"), b"data").unwrap();

    prov.delete(&ctx, &asset).await.unwrap();
    assert!(!asset.host_path.exists());

    let (again, _) = prov.provision(&ctx, request("vol-001")).await.unwrap();
    assert_eq!(again.host_path, asset.host_path);
    assert_eq!(again.annotations, asset.annotations);
    assert!(again.host_path.is_dir());
    assert!(!again.host_path.join("payload").exists());
}

#[tokio::test]
async fn delete_twice_succeeds() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);
    let ctx = CancellationToken::new();

    let (asset, _) = prov
        .provision(&ctx, request_at("vol-001", "shared/team-a"))
        .await
        .unwrap();
    prov.delete(&ctx, &asset).await.unwrap();
    prov.delete(&ctx, &asset).await.unwrap();
    assert!(!asset.host_path.exists());
    // Only the volume directory goes away, not the override's parents.
    assert!(tmp.path().join("shared").is_dir());
}

#[tokio::test]
async fn foreign_volume_survives_delete() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let ctx = CancellationToken::new();
    let owner = provisioner(tmp.path(), "node-8");
    let other = provisioner(tmp.path(), IDENTITY);

    let (asset, _) = owner.provision(&ctx, request("vol-001")).await.unwrap();
    std::fs::write(asset.host_path.join("payload"), b"data").unwrap();

    let err = other.delete(&ctx, &asset).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Ignored { ref owner, .. } if owner == "node-8"));
    assert_eq!(std::fs::read(asset.host_path.join("payload")).unwrap(), b"data");
}

#[tokio::test]
async fn volume_without_identity_is_not_deleted() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);
    let ctx = CancellationToken::new();

    let (mut asset, _) = prov.provision(&ctx, request("vol-001")).await.unwrap();
    asset.annotations.remove(ANN_PROVISIONER_IDENTITY);

    let err = prov.delete(&ctx, &asset).await.unwrap_err();
    assert!(matches!(err, ProvisionError::MissingIdentity { .. }));
    assert!(!err.is_ignored());
    assert!(asset.host_path.is_dir());
}

#[tokio::test]
async fn request_fields_are_carried_through() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);

    let req = VolumeRequest {
        name: "vol-003".into(),
        reclaim_policy: ReclaimPolicy::Retain,
        access_modes: vec![AccessMode::ReadWriteMany],
        resources: ResourceList::from([(RESOURCE_STORAGE.to_owned(), "10Gi".to_owned())]),
        ..Default::default()
    };
    let (asset, _) = prov.provision(&CancellationToken::new(), req).await.unwrap();

    assert_eq!(asset.reclaim_policy, ReclaimPolicy::Retain);
    assert_eq!(asset.access_modes, vec![AccessMode::ReadWriteMany]);
    assert_eq!(asset.capacity[RESOURCE_STORAGE], "10Gi");
}

#[tokio::test]
async fn asset_survives_json_persistence() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = provisioner(tmp.path(), IDENTITY);
    let ctx = CancellationToken::new();

    let (asset, _) = prov.provision(&ctx, request("vol-004")).await.unwrap();
    // The controller stores the object and hands it back later.
    let stored = serde_json::to_string(&asset).unwrap();
    let restored: VolumeAsset = serde_json::from_str(&stored).unwrap();

    prov.delete(&ctx, &restored).await.unwrap();
    assert!(!asset.host_path.exists());
}

#[tokio::test]
async fn concurrent_provisions_of_distinct_volumes() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();
    let prov = std::sync::Arc::new(provisioner(tmp.path(), IDENTITY));

    let mut handles = Vec::new();
    for i in 0..16 {
        let prov = std::sync::Arc::clone(&prov);
        handles.push(tokio::spawn(async move {
            prov.provision(&CancellationToken::new(), request(&format!("vol-{i:03}")))
                .await
        }));
    }
    for handle in handles {
        let (asset, _) = handle.await.unwrap().unwrap();
        assert!(asset.host_path.is_dir());
    }
    assert_eq!(crate::common::entries(tmp.path()), 16);
}
