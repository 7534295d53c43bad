//! Gateway integration tests against the local filesystem backend.
//!
//! Run with: `cargo test -p rentvault-services --test local_backend_test`

mod helpers;

use helpers::fixtures::{jpeg_of_size, pdf};
use helpers::local_gateway;
use rentvault_services::{StorageBackend, UploadMetadata};

#[tokio::test]
async fn test_upload_lands_on_disk() {
    let (gateway, dir) = local_gateway().await;
    assert_eq!(gateway.backend_type(), StorageBackend::Local);

    let result = gateway
        .upload_file_to_bucket(
            jpeg_of_size("kitchen.jpg", 4096),
            "property_images",
            None,
            Some(UploadMetadata::for_user("u1").with_property("p1").with_category("interior")),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    let path = result.file_path.unwrap();
    let on_disk = dir.path().join("property-images").join(&path);
    assert_eq!(std::fs::metadata(&on_disk).unwrap().len(), 4096);
    assert_eq!(
        result.public_url.as_deref(),
        Some(format!("http://localhost:4000/files/property-images/{}", path).as_str())
    );
}

#[tokio::test]
async fn test_signed_urls_and_partial_batches() {
    let (gateway, _dir) = local_gateway().await;
    let meta = UploadMetadata::for_user("u1").with_tenant("t1");

    let mut paths = Vec::new();
    for _ in 0..2 {
        let result = gateway
            .upload_file_to_bucket(pdf("doc.pdf"), "tenant_documents", None, Some(meta.clone()))
            .await;
        paths.push(result.file_path.unwrap());
    }

    let url = gateway
        .get_signed_url(&paths[0], "tenant_documents", Some(120))
        .await
        .expect("signed url");
    assert!(url.starts_with(&format!(
        "http://localhost:4000/files/tenant-documents/{}?expires=",
        paths[0]
    )));
    assert!(url.contains("&signature="));

    paths.insert(1, "users/u1/tenants/t1/documents/other/missing.pdf".to_string());
    let urls = gateway
        .get_multiple_signed_urls(&paths, "tenant_documents", None)
        .await;
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn test_delete_existing_and_missing() {
    let (gateway, dir) = local_gateway().await;

    let result = gateway
        .upload_file_to_bucket(pdf("lease.pdf"), "agreements", Some("imports"), None)
        .await;
    let path = result.file_path.unwrap();
    assert!(path.starts_with("imports/"));

    assert!(gateway.delete_file(&path, "agreements").await);
    assert!(!dir.path().join("agreements").join(&path).exists());
    assert!(gateway.delete_file(&path, "agreements").await);
}

#[tokio::test]
async fn test_traversal_folder_rejected() {
    let (gateway, dir) = local_gateway().await;

    let result = gateway
        .upload_file_to_bucket(pdf("x.pdf"), "agreements", Some("../outside"), None)
        .await;
    assert!(!result.success);
    assert_eq!(result.error_code, Some("INVALID_PATH"));
    assert!(!dir.path().join("outside").exists());
}
