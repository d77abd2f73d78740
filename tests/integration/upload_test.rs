//! Integration tests for the chunked upload pipeline.

mod helpers;

use std::sync::Arc;

use bytes::Bytes;

use vaultshare_core::error::{ErrorDetail, ErrorKind};
use vaultshare_core::types::id::FileId;
use vaultshare_crypto::hash_bytes;
use vaultshare_database::repositories::FileRepository;
use vaultshare_entity::file::{FileMetadata, FileStatus};
use vaultshare_service::InitializeUpload;

const HELLO_WORLD_SHA256: &str =
    "7509e5bda0c762d2bac7f90d758b5b2263fa01ccbc542ab5e3df163be08e6ca9";

#[tokio::test]
async fn test_hello_world_upload() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();

    let file = app.initialize(&ctx, "report.pdf", "application/pdf", 12).await;
    assert_eq!(file.status, FileStatus::Uploading);
    assert_eq!(file.name, "report.pdf");

    let upload = &app.services.upload;
    upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"hello "))
        .await
        .unwrap();
    upload
        .upload_chunk(&ctx, file.id, 1, Bytes::from_static(b"world!"))
        .await
        .unwrap();

    let done = upload.complete(&ctx, file.id).await.unwrap();
    assert_eq!(done.status, FileStatus::Completed);
    assert_eq!(done.checksum_sha256.as_deref(), Some(HELLO_WORLD_SHA256));
    assert_eq!(done.size_bytes, 12);
    assert!(done.upload_completed_at.is_some());

    let versions = app
        .services
        .versions
        .list_versions(&ctx, file.id)
        .await
        .unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version_number, 1);
    assert_eq!(versions[0].checksum_sha256, HELLO_WORLD_SHA256);
}

#[tokio::test]
async fn test_initialize_records_metadata_and_sanitizes_name() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();

    let mut metadata = FileMetadata::default();
    metadata.description = Some("Quarterly numbers".into());
    metadata.tags = vec!["finance".into(), "q3".into()];
    metadata.custom.insert("dept".into(), serde_json::json!("ops"));

    let file = app
        .services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name: "  q3<report>?.pdf ".into(),
                mime_type: "application/pdf".into(),
                size_bytes: 100,
                metadata,
            },
        )
        .await
        .unwrap();

    assert_eq!(file.name, "q3report.pdf");
    assert_eq!(file.original_name, "  q3<report>?.pdf ");
    assert_eq!(file.description.as_deref(), Some("Quarterly numbers"));
    assert_eq!(file.tags, serde_json::json!(["finance", "q3"]));
    assert_eq!(file.metadata, serde_json::json!({"dept": "ops"}));
    assert!(file.checksum_sha256.is_none());
    assert_eq!(file.owner_id, ctx.user_id);
}

#[tokio::test]
async fn test_initialize_rejects_unknown_mime_type() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();

    let err = app
        .services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name: "tool.exe".into(),
                mime_type: "application/x-msdownload".into(),
                size_bytes: 10,
                metadata: FileMetadata::default(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidFileType);
}

#[tokio::test]
async fn test_initialize_rejects_bad_name_and_oversize() {
    let app = helpers::TestApp::with_config(|c| c.upload.max_upload_size_bytes = 1024).await;
    let ctx = app.user();

    let bad_name = app
        .services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name: "<>?*".into(),
                mime_type: "text/plain".into(),
                size_bytes: 10,
                metadata: FileMetadata::default(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(bad_name.kind, ErrorKind::InvalidRequest);

    let too_big = app
        .services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name: "big.txt".into(),
                mime_type: "text/plain".into(),
                size_bytes: 4096,
                metadata: FileMetadata::default(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(too_big.kind, ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_missing_chunk_leaves_file_uploading() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "parts.txt", "text/plain", 5).await;

    for n in [0, 1, 3, 4] {
        app.services
            .upload
            .upload_chunk(&ctx, file.id, n, Bytes::from_static(b"x"))
            .await
            .unwrap();
    }

    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingChunks);
    match err.detail {
        Some(ErrorDetail::MissingChunks {
            file_id,
            missing,
            missing_count,
            received,
        }) => {
            assert_eq!(file_id, file.id);
            assert_eq!(missing, vec![2]);
            assert_eq!(missing_count, 1);
            assert_eq!(received, 4);
        }
        other => panic!("unexpected detail: {other:?}"),
    }

    let current = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(current.status, FileStatus::Uploading);

    // Filling the gap lets the upload finish.
    app.services
        .upload
        .upload_chunk(&ctx, file.id, 2, Bytes::from_static(b"x"))
        .await
        .unwrap();
    let done = app.services.upload.complete(&ctx, file.id).await.unwrap();
    assert_eq!(done.size_bytes, 5);
}

#[tokio::test]
async fn test_duplicate_chunk_is_rejected() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "dup.txt", "text/plain", 6).await;
    let upload = &app.services.upload;

    let original = upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"first "))
        .await
        .unwrap();
    let err = upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"second"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ChunkConflict);
    assert_eq!(
        err.detail,
        Some(ErrorDetail::ChunkConflict {
            file_id: file.id,
            chunk_number: 0
        })
    );

    let chunks = upload.list_chunks(&ctx, file.id).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].checksum_sha256, original.checksum_sha256);
    assert_eq!(chunks[0].checksum_sha256, hash_bytes(b"first "));
    assert_eq!(app.staged_chunk_files(&file), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_complete_has_one_winner() {
    let app = helpers::TestApp::file_backed().await;
    let ctx = app.user();

    for round in 0..5 {
        let file = app
            .initialize(&ctx, &format!("race-{round}.txt"), "text/plain", 8)
            .await;
        for (n, part) in [b"race", b"done"].iter().enumerate() {
            app.services
                .upload
                .upload_chunk(&ctx, file.id, n as i32, Bytes::copy_from_slice(*part))
                .await
                .unwrap();
        }

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let upload = app.services.upload.clone();
                let ctx = ctx.clone();
                let file_id = file.id;
                tokio::spawn(async move { upload.complete(&ctx, file_id).await })
            })
            .collect();
        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }

        let second = results.pop().unwrap();
        let first = results.pop().unwrap();
        let (winner, loser) = match (first, second) {
            (Ok(done), Err(e)) | (Err(e), Ok(done)) => (done, e),
            (a, b) => panic!("expected exactly one success, got {a:?} and {b:?}"),
        };
        assert_eq!(winner.status, FileStatus::Completed);
        assert_eq!(loser.kind, ErrorKind::InvalidState);

        let versions = app
            .services
            .versions
            .list_versions(&ctx, file.id)
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);
        let read = app.services.download.read(&ctx, file.id).await.unwrap();
        assert_eq!(read.data, Bytes::from_static(b"racedone"));
    }
}

#[tokio::test]
async fn test_complete_purges_chunks_and_creates_first_version() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "notes.txt", &[b"alpha ", b"beta ", b"gamma"]).await;

    let chunks = app.services.upload.list_chunks(&ctx, file.id).await.unwrap();
    assert!(chunks.is_empty());
    assert_eq!(app.staged_chunk_files(&file), 0);

    let versions = app
        .services
        .versions
        .list_versions(&ctx, file.id)
        .await
        .unwrap();
    assert_eq!(versions.len(), 1);
    let v1 = &versions[0];
    assert_eq!(v1.version_number, 1);
    assert_eq!(v1.storage_path, file.storage_path);
    assert_eq!(v1.iv, file.iv);
    assert_eq!(v1.size_bytes, 16);
    assert_eq!(v1.comment, "");
    assert_eq!(file.current_version, 1);
}

#[tokio::test]
async fn test_declared_size_is_advisory() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "sized.txt", "text/plain", 9999).await;
    app.services
        .upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"tiny"))
        .await
        .unwrap();

    let done = app.services.upload.complete(&ctx, file.id).await.unwrap();
    assert_eq!(done.size_bytes, 4);
}

#[tokio::test]
async fn test_completing_without_chunks_stores_empty_file() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "empty.txt", &[]).await;

    assert_eq!(file.status, FileStatus::Completed);
    assert_eq!(file.size_bytes, 0);
    assert_eq!(file.checksum_sha256.as_deref(), Some(hash_bytes(b"").as_str()));

    let read = app.services.download.read(&ctx, file.id).await.unwrap();
    assert!(read.data.is_empty());
}

#[tokio::test]
async fn test_processing_failure_marks_file_failed() {
    let app = helpers::TestApp::with_config(|c| c.upload.max_upload_size_bytes = 8).await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "grown.txt", "text/plain", 4).await;
    app.services
        .upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"far too long"))
        .await
        .unwrap();

    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);

    let failed = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(failed.status, FileStatus::Failed);
    assert!(failed.checksum_sha256.is_none());
    assert!(!app.blob_path(&failed.storage_path).exists());

    let read = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(read.kind, ErrorKind::InvalidState);
    let retry = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(retry.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_failure_after_artifact_write_removes_blob() {
    let app = helpers::TestApp::with_storage(|inner| Arc::new(helpers::FailingPurge::new(inner)))
        .await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "half.txt", "text/plain", 8).await;
    app.services
        .upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"contents"))
        .await
        .unwrap();

    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    let failed = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(failed.status, FileStatus::Failed);
    assert_eq!(failed.current_version, 0);
    assert!(!app.blob_path(&failed.storage_path).exists());

    let read = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(read.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_abandoned_processing_is_failed_on_next_access() {
    let app = helpers::TestApp::with_config(|c| c.upload.processing_timeout_secs = 0).await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "stuck.txt", "text/plain", 8).await;
    for (n, part) in [b"half", b"done"].iter().enumerate() {
        app.services
            .upload
            .upload_chunk(&ctx, file.id, n as i32, Bytes::copy_from_slice(*part))
            .await
            .unwrap();
    }

    // A process that died mid-flight: PROCESSING with a partial blob.
    let files = FileRepository::new(app.db.pool().clone());
    assert!(
        files
            .transition_status(file.id, FileStatus::Uploading, FileStatus::Processing)
            .await
            .unwrap()
    );
    let blob = app.blob_path(&file.storage_path);
    std::fs::create_dir_all(blob.parent().unwrap()).unwrap();
    std::fs::write(&blob, b"partial").unwrap();

    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(
        err.detail,
        Some(ErrorDetail::InvalidState {
            file_id: file.id,
            expected: "UPLOADING".into(),
            actual: "FAILED".into(),
        })
    );

    let failed = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(failed.status, FileStatus::Failed);
    assert!(!blob.exists());
    assert_eq!(app.staged_chunk_files(&file), 0);
    assert!(app.services.upload.list_chunks(&ctx, file.id).await.unwrap().is_empty());

    let read = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(read.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_recent_processing_is_left_alone() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "busy.txt", "text/plain", 4).await;
    app.services
        .upload
        .upload_chunk(&ctx, file.id, 0, Bytes::from_static(b"busy"))
        .await
        .unwrap();

    let files = FileRepository::new(app.db.pool().clone());
    files
        .transition_status(file.id, FileStatus::Uploading, FileStatus::Processing)
        .await
        .unwrap();

    let read = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(read.kind, ErrorKind::InvalidState);
    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let current = app.services.files.get_file(&ctx, file.id).await.unwrap();
    assert_eq!(current.status, FileStatus::Processing);
    assert_eq!(app.staged_chunk_files(&file), 1);
}

#[tokio::test]
async fn test_long_names_complete_and_overlong_names_are_rejected() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();

    let long = format!("{}.txt", "a".repeat(240));
    let file = app.upload(&ctx, &long, &[b"long name"]).await;
    assert_eq!(file.status, FileStatus::Completed);
    assert_eq!(file.name, long);
    assert!(!file.storage_path.contains(&long));
    assert!(file.storage_path.len() < 120);
    assert!(file.storage_path.ends_with(".txt"));

    let err = app
        .services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name: format!("{}.txt", "a".repeat(252)),
                mime_type: "text/plain".into(),
                size_bytes: 1,
                metadata: FileMetadata::default(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn test_chunk_numbers_are_bounded() {
    let app = helpers::TestApp::with_config(|c| c.upload.max_chunks = 1000).await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "sparse.txt", "text/plain", 1).await;

    for n in [1000, i32::MAX, -1] {
        let err = app
            .services
            .upload
            .upload_chunk(&ctx, file.id, n, Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest, "{n}");
    }

    app.services
        .upload
        .upload_chunk(&ctx, file.id, 999, Bytes::from_static(b"x"))
        .await
        .unwrap();
    let err = app.services.upload.complete(&ctx, file.id).await.unwrap_err();
    match err.detail {
        Some(ErrorDetail::MissingChunks {
            missing,
            missing_count,
            received,
            ..
        }) => {
            assert_eq!(missing_count, 999);
            assert_eq!(missing.len(), 100);
            assert_eq!(missing[0], 0);
            assert_eq!(received, 1);
        }
        other => panic!("unexpected detail: {other:?}"),
    }
    assert!(err.message.len() < 1024);
}

#[tokio::test]
async fn test_chunks_rejected_after_completion() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "closed.txt", &[b"done"]).await;

    let err = app
        .services
        .upload
        .upload_chunk(&ctx, file.id, 1, Bytes::from_static(b"late"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert_eq!(
        err.detail,
        Some(ErrorDetail::InvalidState {
            file_id: file.id,
            expected: "UPLOADING".into(),
            actual: "COMPLETED".into(),
        })
    );
}

#[tokio::test]
async fn test_upload_operations_check_ownership() {
    let app = helpers::TestApp::new().await;
    let owner = app.user();
    let intruder = app.user();
    let file = app.initialize(&owner, "private.txt", "text/plain", 3).await;

    let err = app
        .services
        .upload
        .upload_chunk(&intruder, file.id, 0, Bytes::from_static(b"bad"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let err = app.services.upload.complete(&intruder, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);

    let err = app
        .services
        .upload
        .complete(&owner, FileId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
