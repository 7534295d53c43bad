//! Test helpers: build a gateway over in-memory or local storage.
//!
//! Run from workspace root: `cargo test -p rentvault-services`.

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use rentvault_core::{Config, ContextPolicyRegistry};
use rentvault_services::StorageGateway;
use rentvault_storage::test_helpers::MockStorage;
use tempfile::TempDir;

/// Local signing secret used by tests (at least 32 characters).
pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-at-least-32-characters";

/// Gateway over a fresh [`MockStorage`] with the built-in policies.
pub fn mock_gateway() -> (StorageGateway, Arc<MockStorage>) {
    let storage = Arc::new(MockStorage::new());
    let gateway = StorageGateway::new(
        Arc::new(ContextPolicyRegistry::default()),
        storage.clone(),
        Duration::from_secs(3600),
    );
    (gateway, storage)
}

/// Gateway over the local filesystem backend rooted in a temp dir.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn local_gateway() -> (StorageGateway, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::local(
        dir.path().to_string_lossy().to_string(),
        "http://localhost:4000/files",
        TEST_SIGNING_SECRET,
    );
    let gateway = StorageGateway::from_config(&config)
        .await
        .expect("Failed to build local gateway");
    (gateway, dir)
}

/// Assert `name` looks like `{epochMillis}-{base36 token}.{ext}`.
pub fn assert_unique_file_name(name: &str, ext: &str) {
    let (stem, actual_ext) = name.rsplit_once('.').expect("file name has no extension");
    assert_eq!(actual_ext, ext, "unexpected extension in {}", name);
    let (millis, token) = stem.split_once('-').expect("file name has no token");
    assert!(
        millis.len() >= 13 && millis.chars().all(|c| c.is_ascii_digit()),
        "bad timestamp in {}",
        name
    );
    assert!(
        !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()),
        "bad token in {}",
        name
    );
}
