use bytes::Bytes;
use chat_server::error::Error;
use chat_server::media::MediaStore;
use tempfile::tempdir;

#[tokio::test]
async fn test_media_store_round_trip() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path(), "http://localhost:5002");

    let data = Bytes::from_static(b"not really a png");
    let image = store.store(Some("photo.PNG"), data.clone()).await.unwrap();

    // Public id keeps a normalized extension and the url points at it.
    assert!(image.public_id.ends_with(".png"));
    assert_eq!(
        image.url,
        format!("http://localhost:5002/media/{}", image.public_id)
    );
    assert!(dir.path().join(&image.public_id).exists());

    let fetched = store.fetch(&image.public_id).await.unwrap();
    assert_eq!(fetched, data);
}

#[tokio::test]
async fn test_media_store_without_extension() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path(), "http://localhost:5002");

    let image = store
        .store(None, Bytes::from_static(b"raw"))
        .await
        .unwrap();
    assert!(!image.public_id.contains('.'));

    let fetched = store.fetch(&image.public_id).await.unwrap();
    assert_eq!(fetched, Bytes::from_static(b"raw"));
}

#[tokio::test]
async fn test_media_store_rejects_traversal_and_missing() {
    let dir = tempdir().unwrap();
    let store = MediaStore::new(dir.path(), "http://localhost:5002");

    assert!(matches!(
        store.fetch("../etc/passwd").await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        store.fetch("does-not-exist.png").await,
        Err(Error::NotFound(_))
    ));
}
