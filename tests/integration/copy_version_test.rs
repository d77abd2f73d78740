//! Integration tests for copies and version history.

mod helpers;

use vaultshare_core::error::ErrorKind;
use vaultshare_core::types::id::FileId;
use vaultshare_entity::file::FileStatus;

#[tokio::test]
async fn test_copy_is_independently_encrypted() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let source = app.upload(&ctx, "ledger.txt", &[b"debits ", b"credits"]).await;

    let copy = app.services.copy.copy(&ctx, source.id).await.unwrap();
    assert_ne!(copy.id, source.id);
    assert_eq!(copy.status, FileStatus::Completed);
    assert_ne!(copy.encryption_key, source.encryption_key);
    assert_ne!(copy.iv, source.iv);
    assert_ne!(copy.storage_path, source.storage_path);
    assert_eq!(copy.checksum_sha256, source.checksum_sha256);
    assert_eq!(copy.size_bytes, source.size_bytes);

    let original = app.services.download.read(&ctx, source.id).await.unwrap();
    let copied = app.services.download.read(&ctx, copy.id).await.unwrap();
    assert_eq!(original.data, copied.data);

    let source_blob = std::fs::read(app.blob_path(&source.storage_path)).unwrap();
    let copy_blob = std::fs::read(app.blob_path(&copy.storage_path)).unwrap();
    assert_ne!(source_blob, copy_blob);
}

#[tokio::test]
async fn test_copy_carries_metadata_and_starts_history() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let source = app.upload(&ctx, "plan.txt", &[b"phase one"]).await;

    let copy = app.services.copy.copy(&ctx, source.id).await.unwrap();
    assert_eq!(copy.name, "Copy of plan.txt");
    assert_eq!(copy.original_name, source.original_name);
    assert_eq!(copy.mime_type, source.mime_type);
    assert_eq!(copy.tags, source.tags);
    assert_eq!(copy.metadata, source.metadata);
    assert_eq!(copy.current_version, 1);

    let versions = app
        .services
        .versions
        .list_versions(&ctx, copy.id)
        .await
        .unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version_number, 1);
    assert_eq!(versions[0].comment, "Initial version (copied from plan.txt)");
    assert_eq!(versions[0].storage_path, copy.storage_path);
}

#[tokio::test]
async fn test_copy_survives_source_blob_loss() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let source = app.upload(&ctx, "fragile.txt", &[b"keep me"]).await;
    let copy = app.services.copy.copy(&ctx, source.id).await.unwrap();

    std::fs::remove_file(app.blob_path(&source.storage_path)).unwrap();

    let copied = app.services.download.read(&ctx, copy.id).await.unwrap();
    assert_eq!(&copied.data[..], b"keep me");
}

#[tokio::test]
async fn test_copy_requires_completed_owned_file() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let pending = app.initialize(&ctx, "wip.txt", "text/plain", 3).await;

    let err = app.services.copy.copy(&ctx, pending.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let done = app.upload(&ctx, "done.txt", &[b"ok"]).await;
    let err = app.services.copy.copy(&app.user(), done.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_bulk_copy_skips_foreign_and_missing() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let other = app.user();
    let a = app.upload(&ctx, "a.txt", &[b"a"]).await;
    let b = app.upload(&ctx, "b.txt", &[b"b"]).await;
    let foreign = app.upload(&other, "c.txt", &[b"c"]).await;

    let copies = app
        .services
        .copy
        .bulk_copy(&ctx, &[a.id, foreign.id, FileId::new(), b.id])
        .await
        .unwrap();
    let names: Vec<&str> = copies.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Copy of a.txt", "Copy of b.txt"]);
    assert!(copies.iter().all(|f| f.owner_id == ctx.user_id));
}

#[tokio::test]
async fn test_create_version_snapshots_current_artifact() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "history.txt", &[b"v1 content"]).await;

    let v2 = app
        .services
        .versions
        .create_version(&ctx, file.id, "checkpoint")
        .await
        .unwrap();
    assert_eq!(v2.version_number, 2);
    assert_eq!(v2.comment, "checkpoint");
    assert_eq!(v2.storage_path, file.storage_path);
    assert_eq!(v2.created_by, ctx.user_id);

    let versions = app
        .services
        .versions
        .list_versions(&ctx, file.id)
        .await
        .unwrap();
    let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let fetched = app
        .services
        .versions
        .get_version(&ctx, file.id, 2)
        .await
        .unwrap();
    assert_eq!(fetched.id, v2.id);

    let current = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(current.current_version, 2);
}

#[tokio::test]
async fn test_read_version_decrypts_with_its_own_key() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "versioned.txt", &[b"first draft"]).await;

    let read = app
        .services
        .download
        .read_version(&ctx, file.id, 1)
        .await
        .unwrap();
    assert_eq!(&read.data[..], b"first draft");
    assert_eq!(read.version_number, Some(1));

    let err = app
        .services
        .download
        .read_version(&ctx, file.id, 7)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_version_operations_check_state_and_ownership() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let pending = app.initialize(&ctx, "open.txt", "text/plain", 1).await;

    let err = app
        .services
        .versions
        .create_version(&ctx, pending.id, "too early")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let file = app.upload(&ctx, "owned.txt", &[b"x"]).await;
    let err = app
        .services
        .versions
        .list_versions(&app.user(), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let err = app
        .services
        .versions
        .get_version(&ctx, file.id, 5)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
