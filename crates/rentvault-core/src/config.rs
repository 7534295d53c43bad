//! Configuration module
//!
//! Storage backend selection, backend credentials/locations, signed URL defaults
//! and per-context policy overrides, all read from the environment.

use std::collections::BTreeMap;
use std::env;

use crate::context::StorageContext;
use crate::policy::{ContextPolicyRegistry, BYTES_PER_MB};
use crate::storage_types::StorageBackend;

const SIGNED_URL_EXPIRY_SECS: u64 = 3600;
const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Per-context overrides of the built-in policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolicyOverride {
    pub bucket: Option<String>,
    pub max_size_mb: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub storage_backend: StorageBackend,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_signing_secret: Option<String>,
    pub signed_url_expiry_secs: u64,
    pub policy_overrides: BTreeMap<StorageContext, PolicyOverride>,
}

fn parse_expiry_secs(raw: Option<String>) -> Result<u64, anyhow::Error> {
    match raw {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            anyhow::anyhow!("SIGNED_URL_EXPIRY_SECS must be a whole number of seconds")
        }),
        None => Ok(SIGNED_URL_EXPIRY_SECS),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let mut policy_overrides = BTreeMap::new();
        for ctx in StorageContext::ALL {
            // documents mirrors tenant_documents and has no settings of its own
            if ctx == StorageContext::Documents {
                continue;
            }
            let prefix = ctx.env_prefix();
            let bucket = env::var(format!("{}_BUCKET", prefix))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let max_size_mb = match env::var(format!("{}_MAX_SIZE_MB", prefix)) {
                Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    anyhow::anyhow!("{}_MAX_SIZE_MB must be a whole number", prefix)
                })?),
                Err(_) => None,
            };
            if bucket.is_some() || max_size_mb.is_some() {
                policy_overrides.insert(
                    ctx,
                    PolicyOverride {
                        bucket,
                        max_size_mb,
                    },
                );
            }
        }

        let config = Config {
            environment,
            storage_backend,
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            local_storage_signing_secret: env::var("LOCAL_STORAGE_SIGNING_SECRET").ok(),
            signed_url_expiry_secs: parse_expiry_secs(env::var("SIGNED_URL_EXPIRY_SECS").ok())?,
            policy_overrides,
        };

        config.validate()?;
        Ok(config)
    }

    /// Local-backend configuration with built-in policies.
    pub fn local(
        base_path: impl Into<String>,
        base_url: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        Config {
            environment: "development".to_string(),
            storage_backend: StorageBackend::Local,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(base_path.into()),
            local_storage_base_url: Some(base_url.into()),
            local_storage_signing_secret: Some(signing_secret.into()),
            signed_url_expiry_secs: SIGNED_URL_EXPIRY_SECS,
            policy_overrides: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.signed_url_expiry_secs == 0 {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_EXPIRY_SECS must be greater than zero"
            ));
        }

        for (ctx, policy) in &self.policy_overrides {
            match policy.max_size_mb {
                Some(0) => {
                    return Err(anyhow::anyhow!(
                        "{}_MAX_SIZE_MB must be greater than zero",
                        ctx.env_prefix()
                    ))
                }
                Some(mb) if mb.checked_mul(BYTES_PER_MB).is_none() => {
                    return Err(anyhow::anyhow!(
                        "{}_MAX_SIZE_MB is too large",
                        ctx.env_prefix()
                    ))
                }
                _ => {}
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                match self.local_storage_signing_secret.as_deref() {
                    Some(secret) if secret.len() >= MIN_SIGNING_SECRET_LEN => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_SIGNING_SECRET must be at least {} characters long",
                            MIN_SIGNING_SECRET_LEN
                        ))
                    }
                }
            }
        }

        Ok(())
    }

    /// Build the policy registry with overrides applied.
    ///
    /// Limits too large to express in bytes are clamped; `validate` rejects them.
    pub fn policy_registry(&self) -> ContextPolicyRegistry {
        let mut builder = ContextPolicyRegistry::builder();
        for (ctx, policy) in &self.policy_overrides {
            if let Some(ref bucket) = policy.bucket {
                builder = builder.bucket(*ctx, bucket.clone());
            }
            if let Some(mb) = policy.max_size_mb {
                builder = builder.max_size_bytes(*ctx, mb.saturating_mul(BYTES_PER_MB));
            }
        }
        builder.build()
    }

    pub fn region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.local_storage_base_url.as_deref()
    }

    pub fn local_storage_signing_secret(&self) -> Option<&str> {
        self.local_storage_signing_secret.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_local_config_validates() {
        let config = Config::local("/tmp/rentvault", "http://localhost:4000/files", SECRET);
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_short_signing_secret_is_rejected() {
        let config = Config::local("/tmp/rentvault", "http://localhost:4000/files", "short");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_requires_region() {
        let mut config = Config::local("/tmp", "http://localhost", SECRET);
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.region(), Some("eu-west-1"));

        config.s3_region = Some("us-east-2".to_string());
        assert_eq!(config.region(), Some("us-east-2"));
    }

    #[test]
    fn test_zero_size_override_is_rejected() {
        let mut config = Config::local("/tmp", "http://localhost", SECRET);
        config.policy_overrides.insert(
            StorageContext::IdDocuments,
            PolicyOverride {
                bucket: None,
                max_size_mb: Some(0),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_expiry_is_an_error() {
        assert_eq!(parse_expiry_secs(None).unwrap(), 3600);
        assert_eq!(parse_expiry_secs(Some(" 900 ".to_string())).unwrap(), 900);
        let err = parse_expiry_secs(Some("1h".to_string())).unwrap_err();
        assert!(err.to_string().contains("SIGNED_URL_EXPIRY_SECS"));
    }

    #[test]
    fn test_oversized_limit_is_rejected_without_overflow() {
        let mut config = Config::local("/tmp", "http://localhost", SECRET);
        config.policy_overrides.insert(
            StorageContext::PropertyImages,
            PolicyOverride {
                bucket: None,
                max_size_mb: Some(u64::MAX / 1024),
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("PROPERTY_IMAGES_MAX_SIZE_MB"));

        let registry = config.policy_registry();
        let images = registry.policy(StorageContext::PropertyImages);
        assert_eq!(images.max_size_bytes, u64::MAX);
        assert_eq!(images.max_size_mb(), u64::MAX / BYTES_PER_MB + 1);
    }

    #[test]
    fn test_policy_registry_applies_overrides() {
        let mut config = Config::local("/tmp", "http://localhost", SECRET);
        config.policy_overrides.insert(
            StorageContext::PropertyImages,
            PolicyOverride {
                bucket: Some("listing-photos".to_string()),
                max_size_mb: Some(25),
            },
        );
        config.policy_overrides.insert(
            StorageContext::TenantDocuments,
            PolicyOverride {
                bucket: Some("tenant-files".to_string()),
                max_size_mb: None,
            },
        );

        let registry = config.policy_registry();
        let images = registry.policy(StorageContext::PropertyImages);
        assert_eq!(images.bucket, "listing-photos");
        assert_eq!(images.max_size_bytes, 25 * BYTES_PER_MB);
        assert_eq!(registry.policy(StorageContext::Documents).bucket, "tenant-files");
        assert_eq!(registry.policy(StorageContext::Agreements).bucket, "agreements");
    }
}
