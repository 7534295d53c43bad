use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutMode, PutPayload,
    Result as ObjectResult,
};

use crate::keys::{validate_bucket, validate_key};
use crate::traits::{PutOptions, Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// S3 storage implementation
///
/// Holds one `AmazonS3` client per configured bucket. Requests for a bucket
/// that was not configured fail with [`StorageError::UnknownBucket`].
#[derive(Clone)]
pub struct S3Storage {
    stores: HashMap<String, AmazonS3>,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `buckets` - Bucket names this gateway may address
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        buckets: &[String],
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut stores = HashMap::with_capacity(buckets.len());

        for bucket in buckets {
            validate_bucket(bucket)?;

            let mut builder = AmazonS3Builder::from_env()
                .with_region(region.clone())
                .with_bucket_name(bucket.clone());

            if let Some(ref endpoint) = endpoint_url {
                let allow_http = endpoint.starts_with("http://");
                builder = builder
                    .with_endpoint(endpoint.clone())
                    .with_allow_http(allow_http);
            }

            let store = builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?;
            stores.insert(bucket.clone(), store);
        }

        tracing::debug!(
            bucket_count = stores.len(),
            region = %region,
            endpoint = ?endpoint_url,
            "S3 storage initialized"
        );

        Ok(S3Storage {
            stores,
            region,
            endpoint_url,
        })
    }

    fn store(&self, bucket: &str) -> StorageResult<&AmazonS3> {
        self.stores
            .get(bucket)
            .ok_or_else(|| StorageError::UnknownBucket(bucket.to_string()))
    }

    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, bucket: &str, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, self.region, key
            )
        }
    }

    fn store_options(options: &PutOptions) -> object_store::PutOptions {
        let mut attributes = Attributes::new();
        if let Some(ref content_type) = options.content_type {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.clone()),
            );
        }
        if let Some(ref cache_control) = options.cache_control {
            attributes.insert(
                Attribute::CacheControl,
                AttributeValue::from(cache_control.clone()),
            );
        }

        object_store::PutOptions {
            mode: if options.upsert {
                PutMode::Overwrite
            } else {
                PutMode::Create
            },
            attributes,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &PutOptions,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let store = self.store(bucket)?;
        let size = data.len() as u64;
        let location = Path::from(key.to_string());

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(data), Self::store_options(options))
            .await;

        result.map_err(|e| match e {
            ObjectStoreError::AlreadyExists { .. } => {
                StorageError::AlreadyExists(format!("{}/{}", bucket, key))
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.generate_url(bucket, key)
    }

    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let store = self.store(bucket)?;
        let location = Path::from(key.to_string());

        let url_result: ObjectResult<_> = store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> StorageResult<()> {
        let store = self.store(bucket)?;
        let start = std::time::Instant::now();

        for key in keys {
            validate_key(key)?;
            let location = Path::from(key.clone());

            let result: ObjectResult<_> = store.delete(&location).await;

            match result {
                Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        bucket = %bucket,
                        key = %key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 delete failed"
                    );
                    return Err(StorageError::DeleteFailed(e.to_string()));
                }
            }
        }

        tracing::info!(
            bucket = %bucket,
            key_count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(all(test, feature = "storage-s3"))]
mod tests {
    use super::*;

    fn buckets() -> Vec<String> {
        vec!["property-images".to_string(), "agreements".to_string()]
    }

    #[tokio::test]
    async fn test_aws_public_url() {
        let storage = S3Storage::new(&buckets(), "eu-west-1".to_string(), None)
            .await
            .unwrap();
        assert_eq!(
            storage.public_url("property-images", "properties/p1/1-abc.jpg"),
            "https://property-images.s3.eu-west-1.amazonaws.com/properties/p1/1-abc.jpg"
        );
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }

    #[tokio::test]
    async fn test_custom_endpoint_public_url() {
        let storage = S3Storage::new(
            &buckets(),
            "us-east-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(
            storage.public_url("agreements", "users/u1/agreements/a.pdf"),
            "http://localhost:9000/agreements/users/u1/agreements/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_bucket_rejected() {
        let storage = S3Storage::new(&buckets(), "us-east-1".to_string(), None)
            .await
            .unwrap();

        let result = storage
            .put("other", "a.png", Bytes::new(), &PutOptions::default())
            .await;
        assert!(matches!(result, Err(StorageError::UnknownBucket(_))));

        let result = storage.remove("other", &["a.png".to_string()]).await;
        assert!(matches!(result, Err(StorageError::UnknownBucket(_))));
    }

    #[test]
    fn test_store_options_mode_and_attributes() {
        let options = PutOptions::default().with_content_type("image/png");
        let store_options = S3Storage::store_options(&options);
        assert!(matches!(store_options.mode, PutMode::Create));
        assert_eq!(
            store_options
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| AsRef::<str>::as_ref(v)),
            Some("image/png")
        );
        assert_eq!(
            store_options
                .attributes
                .get(&Attribute::CacheControl)
                .map(|v| AsRef::<str>::as_ref(v)),
            Some("max-age=3600")
        );

        let upsert = PutOptions {
            upsert: true,
            ..PutOptions::default()
        };
        assert!(matches!(
            S3Storage::store_options(&upsert).mode,
            PutMode::Overwrite
        ));
    }
}
