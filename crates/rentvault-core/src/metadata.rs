//! Per-request upload metadata.
//!
//! Metadata is supplied by the caller for a single upload and is never persisted
//! by the gateway. Named fields drive key layout; `extra` carries anything newer
//! callers attach without widening the struct.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Metadata fields that can take part in an object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    UserId,
    PropertyId,
    TenantId,
    UnitId,
    Category,
    DocumentType,
}

impl MetadataField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::UserId => "userId",
            MetadataField::PropertyId => "propertyId",
            MetadataField::TenantId => "tenantId",
            MetadataField::UnitId => "unitId",
            MetadataField::Category => "category",
            MetadataField::DocumentType => "documentType",
        }
    }
}

impl Display for MetadataField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl UploadMetadata {
    /// Start metadata owned by `user_id`.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Value of a named field. Blank values count as absent.
    pub fn get(&self, field: MetadataField) -> Option<&str> {
        let value = match field {
            MetadataField::UserId => &self.user_id,
            MetadataField::PropertyId => &self.property_id,
            MetadataField::TenantId => &self.tenant_id,
            MetadataField::UnitId => &self.unit_id,
            MetadataField::Category => &self.category,
            MetadataField::DocumentType => &self.document_type,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
