//! Integration tests for the decrypting read path.

mod helpers;

use futures::StreamExt;

use vaultshare_core::error::ErrorKind;
use vaultshare_crypto::hash_bytes;

#[tokio::test]
async fn test_read_returns_plaintext_and_metadata() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "greeting.txt", &[b"hello ", b"world!"]).await;

    let result = app.services.download.read(&ctx, file.id).await.unwrap();
    assert_eq!(&result.data[..], b"hello world!");
    assert_eq!(result.mime_type, "text/plain");
    assert_eq!(result.original_name, "greeting.txt");
    assert_eq!(result.version_number, None);
    assert_eq!(result.size(), 12);
}

#[tokio::test]
async fn test_blob_on_disk_is_ciphertext() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let plaintext = b"top secret quarterly figures";
    let file = app.upload(&ctx, "secret.txt", &[plaintext]).await;

    let stored = std::fs::read(app.blob_path(&file.storage_path)).unwrap();
    assert_eq!(stored.len() % 16, 0);
    assert!(stored.len() > plaintext.len());
    assert!(!stored.windows(6).any(|w| w == b"secret"));
}

#[tokio::test]
async fn test_read_updates_last_accessed() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "seen.txt", &[b"peek"]).await;
    assert!(file.last_accessed_at.is_none());

    app.services.download.read(&ctx, file.id).await.unwrap();
    let first = app
        .services
        .files
        .get_file(&ctx, file.id)
        .await
        .unwrap()
        .last_accessed_at
        .expect("last access recorded");

    app.services.download.read(&ctx, file.id).await.unwrap();
    let second = app
        .services
        .files
        .get_file(&ctx, file.id)
        .await
        .unwrap()
        .last_accessed_at
        .expect("last access recorded");
    assert!(second >= first);
}

#[tokio::test]
async fn test_read_rejects_incomplete_file() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.initialize(&ctx, "pending.txt", "text/plain", 4).await;

    let err = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
async fn test_read_denies_other_users() {
    let app = helpers::TestApp::new().await;
    let owner = app.user();
    let file = app.upload(&owner, "mine.txt", &[b"private"]).await;

    let err = app
        .services
        .download
        .read(&app.user(), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_tampered_blob_fails_decryption() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "tamper.txt", &[b"hello world!"]).await;

    let path = app.blob_path(&file.storage_path);
    let mut stored = std::fs::read(&path).unwrap();
    stored[0] ^= 0xff;
    std::fs::write(&path, &stored).unwrap();

    let err = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decryption);
}

#[tokio::test]
async fn test_truncated_blob_fails_decryption() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "short.txt", &[b"some content here"]).await;

    let path = app.blob_path(&file.storage_path);
    let stored = std::fs::read(&path).unwrap();
    std::fs::write(&path, &stored[..stored.len() - 3]).unwrap();

    let err = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Decryption);
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let file = app.upload(&ctx, "gone.txt", &[b"vanishing"]).await;

    std::fs::remove_file(app.blob_path(&file.storage_path)).unwrap();

    let err = app.services.download.read(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_read_result_streams_in_pieces() {
    let app = helpers::TestApp::new().await;
    let ctx = app.user();
    let body: Vec<u8> = (0..100u8).collect();
    let file = app.upload(&ctx, "bytes.txt", &[&body[..40], &body[40..]]).await;

    let result = app.services.download.read(&ctx, file.id).await.unwrap();
    let pieces: Vec<_> = result.into_stream(32).collect().await;
    assert_eq!(pieces.len(), 4);

    let joined: Vec<u8> = pieces
        .into_iter()
        .flat_map(|p| p.unwrap().to_vec())
        .collect();
    assert_eq!(hash_bytes(&joined), hash_bytes(&body));
}
