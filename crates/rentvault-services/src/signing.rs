//! Time-limited read URLs for stored objects.
//!
//! Signing degrades instead of failing: a single request yields `None` and a
//! batch yields only the URLs that could be signed. Batch output is therefore
//! not index-aligned with the input paths.

use std::sync::Arc;
use std::time::Duration;

use rentvault_core::ContextPolicyRegistry;
use rentvault_storage::Storage;

#[derive(Clone)]
pub struct SignedUrlIssuer {
    registry: Arc<ContextPolicyRegistry>,
    storage: Arc<dyn Storage>,
    default_expiry: Duration,
}

impl SignedUrlIssuer {
    pub fn new(
        registry: Arc<ContextPolicyRegistry>,
        storage: Arc<dyn Storage>,
        default_expiry: Duration,
    ) -> Self {
        SignedUrlIssuer {
            registry,
            storage,
            default_expiry,
        }
    }

    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    #[tracing::instrument(skip(self))]
    pub async fn sign(&self, path: &str, target: &str, expires_in: Option<Duration>) -> Option<String> {
        let resolution = match self.registry.resolve(target) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot sign URL for unresolvable target");
                return None;
            }
        };
        let bucket = resolution.bucket();
        let expires_in = expires_in.unwrap_or(self.default_expiry);

        match self.storage.create_signed_url(bucket, path, expires_in).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %path,
                    "Signed URL creation failed"
                );
                None
            }
        }
    }

    #[tracing::instrument(skip(self, paths), fields(path_count = paths.len()))]
    pub async fn sign_many(
        &self,
        paths: &[String],
        target: &str,
        expires_in: Option<Duration>,
    ) -> Vec<String> {
        if paths.is_empty() {
            return Vec::new();
        }

        let resolution = match self.registry.resolve(target) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot sign URLs for unresolvable target");
                return Vec::new();
            }
        };
        let bucket = resolution.bucket();
        let expires_in = expires_in.unwrap_or(self.default_expiry);

        let entries = match self
            .storage
            .create_signed_urls(bucket, paths, expires_in)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    "Batch signed URL creation failed"
                );
                return Vec::new();
            }
        };

        let mut urls = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.signed_url {
                Some(url) => urls.push(url),
                None => tracing::warn!(
                    bucket = %bucket,
                    key = %entry.path,
                    error = entry.error.as_deref().unwrap_or("unknown"),
                    "Dropping path that could not be signed"
                ),
            }
        }
        urls
    }
}
