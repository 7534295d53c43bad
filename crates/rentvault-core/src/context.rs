//! Upload contexts and the identifiers callers use to name them.
//!
//! A context is a logical use case (property photos, tenant paperwork, ...). It
//! decides the storage policy and the key layout, and is distinct from the
//! physical bucket it lands in. Older callers still pass bucket names, so every
//! entry point accepts an [`Identifier`] which is either a context tag or a raw
//! bucket name.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical upload context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageContext {
    PropertyImages,
    TenantDocuments,
    MaintenanceFiles,
    Agreements,
    IdDocuments,
    /// Legacy alias of `TenantDocuments`.
    Documents,
}

impl StorageContext {
    pub const ALL: [StorageContext; 6] = [
        StorageContext::PropertyImages,
        StorageContext::TenantDocuments,
        StorageContext::MaintenanceFiles,
        StorageContext::Agreements,
        StorageContext::IdDocuments,
        StorageContext::Documents,
    ];

    /// Canonical tag, as used in requests and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageContext::PropertyImages => "property_images",
            StorageContext::TenantDocuments => "tenant_documents",
            StorageContext::MaintenanceFiles => "maintenance_files",
            StorageContext::Agreements => "agreements",
            StorageContext::IdDocuments => "id_documents",
            StorageContext::Documents => "documents",
        }
    }

    /// Position in [`StorageContext::ALL`], used for dense policy tables.
    pub(crate) fn index(&self) -> usize {
        match self {
            StorageContext::PropertyImages => 0,
            StorageContext::TenantDocuments => 1,
            StorageContext::MaintenanceFiles => 2,
            StorageContext::Agreements => 3,
            StorageContext::IdDocuments => 4,
            StorageContext::Documents => 5,
        }
    }

    /// Prefix for per-context environment overrides, e.g. `PROPERTY_IMAGES`.
    pub fn env_prefix(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl FromStr for StorageContext {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageContext::ALL
            .into_iter()
            .find(|ctx| ctx.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown storage context: {}", s))
    }
}

impl Display for StorageContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// What a caller passed to name the destination of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Context(StorageContext),
    RawBucket(String),
}

impl Identifier {
    /// Classify a caller-supplied string. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<StorageContext>() {
            Ok(ctx) => Identifier::Context(ctx),
            Err(_) => Identifier::RawBucket(trimmed.to_string()),
        })
    }
}

impl From<StorageContext> for Identifier {
    fn from(ctx: StorageContext) -> Self {
        Identifier::Context(ctx)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Identifier::Context(ctx) => write!(f, "{}", ctx),
            Identifier::RawBucket(name) => write!(f, "bucket:{}", name),
        }
    }
}
