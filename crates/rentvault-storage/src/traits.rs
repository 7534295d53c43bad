//! Storage abstraction trait
//!
//! This module defines the minimal object-store capability the gateway is written
//! against. Every operation is addressed by `(bucket, key)`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Options attached to a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Overwrite an existing object instead of failing.
    pub upsert: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            cache_control: Some("max-age=3600".to_string()),
            upsert: false,
        }
    }
}

impl PutOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Per-key outcome of a batch signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlEntry {
    pub path: String,
    pub signed_url: Option<String>,
    pub error: Option<String>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// gateway never couples to a specific object store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key` in `bucket`.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> StorageResult<()>;

    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    /// Time-limited GET URL for a private object.
    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Sign several keys. The default issues one independent request per key
    /// and reports each outcome separately; the outer error is reserved for
    /// failures of the batch as a whole.
    async fn create_signed_urls(
        &self,
        bucket: &str,
        keys: &[String],
        expires_in: Duration,
    ) -> StorageResult<Vec<SignedUrlEntry>> {
        let requests = keys.iter().map(|key| async move {
            match self.create_signed_url(bucket, key, expires_in).await {
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
            }
        });
        Ok(futures::future::join_all(requests).await)
    }

    /// Remove objects. Removing a key that does not exist is not an error.
    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
