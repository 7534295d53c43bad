//! Caller-facing storage API.
//!
//! [`StorageGateway`] bundles the upload, signing and deletion services over one
//! registry and one backend. Every operation takes a context tag or bucket name
//! and resolves it the same way.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use rentvault_core::{Config, ContextPolicyRegistry, StorageBackend, UploadMetadata};
use rentvault_storage::{create_storage, Storage};

use crate::deletion::DeletionService;
use crate::signing::SignedUrlIssuer;
use crate::upload::{UploadFile, UploadGateway, UploadRequest, UploadResult};

#[derive(Clone)]
pub struct StorageGateway {
    registry: Arc<ContextPolicyRegistry>,
    backend: StorageBackend,
    uploads: UploadGateway,
    signer: SignedUrlIssuer,
    deleter: DeletionService,
}

impl StorageGateway {
    pub fn new(
        registry: Arc<ContextPolicyRegistry>,
        storage: Arc<dyn Storage>,
        default_expiry: Duration,
    ) -> Self {
        StorageGateway {
            backend: storage.backend_type(),
            uploads: UploadGateway::new(registry.clone(), storage.clone()),
            signer: SignedUrlIssuer::new(registry.clone(), storage.clone(), default_expiry),
            deleter: DeletionService::new(registry.clone(), storage),
            registry,
        }
    }

    /// Build the registry and backend described by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let registry = Arc::new(config.policy_registry());
        let storage = create_storage(config, &registry.buckets())
            .await
            .context("Failed to initialize storage backend")?;

        tracing::info!(
            backend = %config.storage_backend,
            environment = %config.environment,
            buckets = ?registry.buckets(),
            "Storage gateway initialized"
        );

        Ok(Self::new(
            registry,
            storage,
            Duration::from_secs(config.signed_url_expiry_secs),
        ))
    }

    pub fn registry(&self) -> &ContextPolicyRegistry {
        &self.registry
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.backend
    }

    pub async fn upload(&self, request: UploadRequest) -> UploadResult {
        self.uploads.upload(request).await
    }

    pub async fn upload_file_to_bucket(
        &self,
        file: UploadFile,
        context_or_bucket: &str,
        folder_path: Option<&str>,
        metadata: Option<UploadMetadata>,
    ) -> UploadResult {
        let mut request = UploadRequest::new(file, context_or_bucket);
        request.explicit_folder = folder_path.map(String::from);
        request.metadata = metadata;
        self.uploads.upload(request).await
    }

    /// `expiry_secs` defaults to the configured signed-URL expiry.
    pub async fn get_signed_url(
        &self,
        path: &str,
        context_or_bucket: &str,
        expiry_secs: Option<u64>,
    ) -> Option<String> {
        self.signer
            .sign(path, context_or_bucket, expiry_secs.map(Duration::from_secs))
            .await
    }

    pub async fn get_multiple_signed_urls(
        &self,
        paths: &[String],
        context_or_bucket: &str,
        expiry_secs: Option<u64>,
    ) -> Vec<String> {
        self.signer
            .sign_many(paths, context_or_bucket, expiry_secs.map(Duration::from_secs))
            .await
    }

    pub async fn delete_file(&self, path: &str, context_or_bucket: &str) -> bool {
        self.deleter.delete(path, context_or_bucket).await
    }
}
