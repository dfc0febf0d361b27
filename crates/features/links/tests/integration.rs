use fhub_cache::TtlCache;
use fhub_links::*;
use fhub_storage::*;
use std::time::Duration;
use tempfile::TempDir;

const PHOTO: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

type Links = LinkService<LocalStorage, TtlCache>;

async fn setup(temp: &TempDir, cache_ttl: Option<Duration>) -> (Catalog<LocalStorage>, Links) {
    let storage = LocalStorage::builder().root(temp.path().join("data")).connect().await.unwrap();
    let catalog = Catalog::new(storage.clone());

    let shoes = CategoryPath::try_from("apparel/shoes").unwrap();
    let sku = CollectionId::try_from("sku123").unwrap();
    catalog.create_category(&shoes).await.unwrap();
    catalog.create_collection(&shoes, &sku).await.unwrap();
    catalog.write_file(&shoes, &sku, &FileName::try_from("photo.png").unwrap(), PHOTO).await.unwrap();

    let signer = LinkSigner::new("test-secret", "http://localhost:9090/files", Duration::from_secs(300));
    let cache = TtlCache::new(100, Duration::from_secs(120));
    (catalog, LinkService::new(storage, cache, signer, cache_ttl))
}

fn photo_path() -> String {
    Catalog::<LocalStorage>::file_path(
        &CategoryPath::try_from("apparel/shoes").unwrap(),
        &CollectionId::try_from("sku123").unwrap(),
        &FileName::try_from("photo.png").unwrap(),
    )
}

#[tokio::test]
async fn test_issue_and_redeem_end_to_end() {
    let temp = TempDir::new().unwrap();
    let (_catalog, links) = setup(&temp, None).await;
    assert_eq!(photo_path(), "_apparel/_shoes/sku123/photo.png");

    let link = links.issue(&photo_path()).await.unwrap();
    assert!(link.starts_with("http://localhost:9090/files/?id="));
    assert!(!link.contains("sku123"));

    let mut out = Vec::new();
    let bytes = links.redeem_url(&link, &mut out).await.unwrap();
    assert_eq!(bytes, u64::try_from(PHOTO.len()).unwrap());
    assert_eq!(out, PHOTO);

    // Links are not single-use.
    let mut again = Vec::new();
    links.redeem_url(&link, &mut again).await.unwrap();
    assert_eq!(again, PHOTO);
}

#[tokio::test]
async fn test_tampered_link_is_rejected_before_lookup() {
    let temp = TempDir::new().unwrap();
    let (_catalog, links) = setup(&temp, None).await;

    let link = links.issue(&photo_path()).await.unwrap();
    let token = SignedToken::from_url(&link).unwrap();
    let mut sig = token.signature.clone().into_bytes();
    sig[10] = if sig[10] == b'a' { b'b' } else { b'a' };

    let mut out = Vec::new();
    let result = links.redeem(&token.id, &token.expires, &String::from_utf8(sig).unwrap(), &mut out).await;
    assert!(matches!(result, Err(LinkError::InvalidSignature { .. })));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_missing_file_cannot_be_linked() {
    let temp = TempDir::new().unwrap();
    let (_catalog, links) = setup(&temp, None).await;

    let result = links.issue("_apparel/_shoes/sku123/missing.png").await;
    assert!(matches!(result, Err(LinkError::Storage { source: StorageError::NotFound { .. }, .. })));

    let result = links.issue("../outside").await;
    assert!(matches!(
        result,
        Err(LinkError::Storage { source: StorageError::PathTraversalAttempt { .. }, .. })
    ));
}

#[tokio::test]
async fn test_expired_link() {
    let temp = TempDir::new().unwrap();
    let (_catalog, links) = setup(&temp, None).await;

    let link = links.issue_with_ttl(&photo_path(), Duration::ZERO).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let mut out = Vec::new();
    let result = links.redeem_url(&link, &mut out).await;
    assert!(matches!(result, Err(LinkError::UrlExpired { .. })));
}

#[tokio::test]
async fn test_cache_entry_can_outlive_or_precede_link() {
    let temp = TempDir::new().unwrap();
    let (_catalog, links) = setup(&temp, Some(Duration::from_millis(50))).await;

    let link = links.issue(&photo_path()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    let mut out = Vec::new();
    let result = links.redeem_url(&link, &mut out).await;
    assert!(matches!(result, Err(LinkError::Cache { .. })));
}

#[tokio::test]
async fn test_deleted_file_after_issue() {
    let temp = TempDir::new().unwrap();
    let (catalog, links) = setup(&temp, None).await;

    let link = links.issue(&photo_path()).await.unwrap();
    catalog.storage().delete_file(photo_path()).await.unwrap();

    let mut out = Vec::new();
    let result = links.redeem_url(&link, &mut out).await;
    assert!(matches!(result, Err(LinkError::Storage { source: StorageError::NotFound { .. }, .. })));
}
