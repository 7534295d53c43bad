//! Mock Storage implementation for testing

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{PutOptions, SignedUrlEntry, Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// An object written through [`MockStorage`].
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub options: PutOptions,
}

/// Mock storage implementation that stores objects in memory
///
/// Failures can be injected per operation to exercise error paths.
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
    backend_type: StorageBackend,
    put_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    fail_puts: AtomicBool,
    fail_removes: AtomicBool,
    fail_batch_signing: AtomicBool,
    unsignable: Mutex<HashSet<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::with_backend(StorageBackend::S3)
    }

    pub fn with_backend(backend_type: StorageBackend) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            backend_type,
            put_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
            fail_puts: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
            fail_batch_signing: AtomicBool::new(false),
            unsignable: Mutex::new(HashSet::new()),
        }
    }

    /// Set an object in the mock storage
    pub fn set_object(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.into(),
                options: PutOptions::default(),
            },
        );
    }

    /// Check if an object exists in the mock storage
    pub fn has_object(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Get an object (for test assertions)
    pub fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Number of `put` calls, including failed ones.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Make whole batch signing requests fail.
    pub fn fail_batch_signing(&self, fail: bool) {
        self.fail_batch_signing.store(fail, Ordering::SeqCst);
    }

    /// Make signing fail for one key.
    pub fn fail_signing_for(&self, key: &str) {
        self.unsignable.lock().unwrap().insert(key.to_string());
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "connection reset by peer".to_string(),
            ));
        }

        let mut objects = self.objects.lock().unwrap();
        let id = (bucket.to_string(), key.to_string());
        if !options.upsert && objects.contains_key(&id) {
            return Err(StorageError::AlreadyExists(format!("{}/{}", bucket, key)));
        }
        objects.insert(
            id,
            StoredObject {
                data,
                options: options.clone(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.example.com/{}/{}", bucket, key)
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.unsignable.lock().unwrap().contains(key) {
            return Err(StorageError::SigningFailed(format!(
                "cannot sign {}/{}",
                bucket, key
            )));
        }
        if !self.has_object(bucket, key) {
            return Err(StorageError::NotFound(format!("{}/{}", bucket, key)));
        }
        Ok(format!(
            "https://storage.example.com/signed/{}/{}?expires_in={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    async fn create_signed_urls(
        &self,
        bucket: &str,
        keys: &[String],
        expires_in: Duration,
    ) -> StorageResult<Vec<SignedUrlEntry>> {
        if self.fail_batch_signing.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(
                "batch signing unavailable".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let entry = match self.create_signed_url(bucket, key, expires_in).await {
                Ok(url) => SignedUrlEntry {
                    path: key.clone(),
                    signed_url: Some(url),
                    error: None,
                },
                Err(e) => SignedUrlEntry {
                    path: key.clone(),
                    signed_url: None,
                    error: Some(e.to_string()),
                },
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("access denied".to_string()));
        }

        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend_type
    }
}
