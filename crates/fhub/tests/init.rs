use fhub::domain::config::FilesConfig;
use fhub::storage::{CategoryPath, CollectionId, FileName, FileStorage, StorageError};
use fhub::{FilesError, init};
use tempfile::TempDir;

fn config(temp: &TempDir) -> FilesConfig {
    let mut config = FilesConfig::default();
    config.storage.root = temp.path().join("files");
    config.storage.max_file_size = 64;
    config.links.secret = "integration-secret".to_owned();
    config.links.base_url = "https://cdn.example.com/files/".to_owned();
    config
}

#[tokio::test]
async fn init_wires_shared_storage() {
    let temp = TempDir::new().unwrap();
    let files = init(&config(&temp)).await.unwrap();
    assert!(files.storage().root().ends_with("files"));

    let shoes = CategoryPath::try_from("apparel/shoes").unwrap();
    let sku = CollectionId::try_from("sku123").unwrap();
    let photo = FileName::try_from("photo.png").unwrap();
    files.catalog().create_category(&shoes).await.unwrap();
    files.catalog().create_collection(&shoes, &sku).await.unwrap();
    files.catalog().write_file(&shoes, &sku, &photo, &b"pixels"[..]).await.unwrap();

    let too_big = FileName::try_from("poster.png").unwrap();
    let result = files.catalog().write_file(&shoes, &sku, &too_big, &[0u8; 65][..]).await;
    assert!(matches!(result, Err(StorageError::SizeExceeded { limit: 64, .. })));
    assert!(!files.storage().exists("_apparel/_shoes/sku123/poster.png").await.unwrap());

    let link = files.links().issue("_apparel/_shoes/sku123/photo.png").await.unwrap();
    assert!(link.starts_with("https://cdn.example.com/files/?id="));

    let mut out = Vec::new();
    files.links().redeem_url(&link, &mut out).await.unwrap();
    assert_eq!(out, b"pixels");
}

#[tokio::test]
async fn init_rejects_unusable_config() {
    let temp = TempDir::new().unwrap();

    let mut empty_secret = config(&temp);
    empty_secret.links.secret.clear();
    assert!(matches!(init(&empty_secret).await, Err(FilesError::InvalidConfiguration { .. })));

    let mut no_root = config(&temp);
    no_root.storage.create = false;
    no_root.storage.root = temp.path().join("missing");
    assert!(matches!(init(&no_root).await, Err(FilesError::Storage { .. })));
}
