//! Context policies and the registry that resolves them.
//!
//! The registry is built once at startup (see [`crate::Config::policy_registry`])
//! and shared behind an `Arc`. It never fails for unrecognized names: anything
//! that is not a known context tag or bucket resolves to the `documents` policy
//! and is reported as a fallback so misconfigured callers show up in the logs.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::context::{Identifier, StorageContext};
use crate::error::GatewayError;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const WORD_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Storage policy governing one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextPolicy {
    pub bucket: String,
    pub max_size_bytes: u64,
    pub allowed_content_types: BTreeSet<String>,
}

impl ContextPolicy {
    pub fn new<I, S>(bucket: impl Into<String>, max_size_bytes: u64, allowed_content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            bucket: bucket.into(),
            max_size_bytes,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Size limit in whole megabytes, rounded to nearest.
    pub fn max_size_mb(&self) -> u64 {
        self.max_size_bytes / BYTES_PER_MB
            + u64::from(self.max_size_bytes % BYTES_PER_MB >= BYTES_PER_MB / 2)
    }

    /// Expects an already normalized (lowercase, parameter-free) MIME type.
    pub fn allows_content_type(&self, normalized: &str) -> bool {
        self.allowed_content_types.contains(normalized)
    }
}

/// Built-in policy for a context.
pub fn default_policy(context: StorageContext) -> ContextPolicy {
    match context {
        StorageContext::PropertyImages => {
            ContextPolicy::new("property-images", 10 * BYTES_PER_MB, IMAGE_TYPES)
        }
        StorageContext::TenantDocuments | StorageContext::Documents => ContextPolicy::new(
            "tenant-documents",
            10 * BYTES_PER_MB,
            ["application/pdf", "image/jpeg", "image/png"]
                .iter()
                .chain(WORD_TYPES),
        ),
        StorageContext::MaintenanceFiles => ContextPolicy::new(
            "maintenance-files",
            20 * BYTES_PER_MB,
            [
                "image/jpeg",
                "image/png",
                "image/webp",
                "application/pdf",
                "video/mp4",
                "video/quicktime",
            ],
        ),
        StorageContext::Agreements => ContextPolicy::new(
            "agreements",
            10 * BYTES_PER_MB,
            ["application/pdf"].iter().chain(WORD_TYPES),
        ),
        StorageContext::IdDocuments => ContextPolicy::new(
            "id-documents",
            5 * BYTES_PER_MB,
            ["image/jpeg", "image/png", "application/pdf"],
        ),
    }
}

/// Outcome of resolving an identifier against the registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub context: StorageContext,
    pub policy: &'a ContextPolicy,
    /// True when the identifier matched nothing and `documents` was substituted.
    pub fallback: bool,
}

impl<'a> Resolution<'a> {
    pub fn bucket(&self) -> &'a str {
        &self.policy.bucket
    }

    /// Context whose key layout applies, or `None` for the generic layout used
    /// when the identifier was not recognized.
    pub fn path_context(&self) -> Option<StorageContext> {
        (!self.fallback).then_some(self.context)
    }
}

/// Immutable context → policy table.
#[derive(Debug)]
pub struct ContextPolicyRegistry {
    policies: [ContextPolicy; 6],
    fallbacks: AtomicU64,
}

impl Default for ContextPolicyRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ContextPolicyRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            policies: StorageContext::ALL.map(default_policy),
        }
    }

    pub fn policy(&self, context: StorageContext) -> &ContextPolicy {
        &self.policies[context.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = (StorageContext, &ContextPolicy)> {
        StorageContext::ALL.into_iter().map(|ctx| (ctx, self.policy(ctx)))
    }

    /// Distinct bucket names, in context order.
    pub fn buckets(&self) -> Vec<String> {
        let mut buckets: Vec<String> = Vec::new();
        for (_, policy) in self.entries() {
            if !buckets.contains(&policy.bucket) {
                buckets.push(policy.bucket.clone());
            }
        }
        buckets
    }

    /// Number of lookups that fell back to the `documents` policy.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Resolve a caller-supplied context tag or bucket name.
    pub fn resolve(&self, raw: &str) -> Result<Resolution<'_>, GatewayError> {
        let identifier = Identifier::parse(raw)
            .ok_or_else(|| GatewayError::UnknownContext("identifier is empty".to_string()))?;
        Ok(self.resolve_identifier(&identifier))
    }

    pub fn resolve_identifier(&self, identifier: &Identifier) -> Resolution<'_> {
        match identifier {
            Identifier::Context(ctx) => Resolution {
                context: *ctx,
                policy: self.policy(*ctx),
                fallback: false,
            },
            Identifier::RawBucket(name) => {
                if let Some((ctx, policy)) = self.entries().find(|(_, p)| p.bucket == *name) {
                    return Resolution {
                        context: ctx,
                        policy,
                        fallback: false,
                    };
                }

                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                let policy = self.policy(StorageContext::Documents);
                tracing::warn!(
                    identifier = %name,
                    fallback_bucket = %policy.bucket,
                    "Unrecognized storage context or bucket, using documents policy"
                );
                Resolution {
                    context: StorageContext::Documents,
                    policy,
                    fallback: true,
                }
            }
        }
    }
}

/// Builder for [`ContextPolicyRegistry`], seeded with the built-in policies.
///
/// `documents` is always an alias of `tenant_documents`: configuring either one
/// configures both.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    policies: [ContextPolicy; 6],
}

impl RegistryBuilder {
    pub fn policy(mut self, context: StorageContext, policy: ContextPolicy) -> Self {
        self.policies[Self::canonical(context).index()] = policy;
        self
    }

    pub fn bucket(mut self, context: StorageContext, bucket: impl Into<String>) -> Self {
        self.policies[Self::canonical(context).index()].bucket = bucket.into();
        self
    }

    pub fn max_size_bytes(mut self, context: StorageContext, max_size_bytes: u64) -> Self {
        self.policies[Self::canonical(context).index()].max_size_bytes = max_size_bytes;
        self
    }

    pub fn build(mut self) -> ContextPolicyRegistry {
        let tenant_documents = StorageContext::TenantDocuments.index();
        self.policies[StorageContext::Documents.index()] = self.policies[tenant_documents].clone();
        ContextPolicyRegistry {
            policies: self.policies,
            fallbacks: AtomicU64::new(0),
        }
    }

    fn canonical(context: StorageContext) -> StorageContext {
        match context {
            StorageContext::Documents => StorageContext::TenantDocuments,
            other => other,
        }
    }
}
