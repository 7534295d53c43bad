//! Object key construction.
//!
//! Metadata-driven keys always start with `users/{userId}/` so that bucket
//! policies can scope access by prefix alone, and always end with
//! `{epochMillis}-{token}.{ext}` so repeated uploads of the same file never
//! overwrite each other. The per-context layout is data: see [`PATH_RULES`].
//!
//! An explicit folder bypasses the metadata rules entirely. Legacy callers rely
//! on it; it is still checked for traversal segments.

use rand::Rng;

use crate::context::StorageContext;
use crate::error::GatewayError;
use crate::metadata::{MetadataField, UploadMetadata};

const USERS_PREFIX: &str = "users";
const TOKEN_LEN: usize = 13;
const DEFAULT_EXTENSION: &str = "file";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One segment of a key template, between `users/{userId}` and the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Literal(&'static str),
    /// Value of a required field.
    Field(MetadataField),
    /// Value of an optional field, or the default when it is absent.
    FieldOr(MetadataField, &'static str),
}

/// Key layout for one context.
#[derive(Debug, Clone, Copy)]
pub struct PathRule {
    pub context: StorageContext,
    /// Checked in order after `userId`; the first missing one is reported.
    pub required: &'static [MetadataField],
    pub segments: &'static [Segment],
}

pub const PATH_RULES: &[PathRule] = &[
    PathRule {
        context: StorageContext::PropertyImages,
        required: &[MetadataField::PropertyId],
        segments: &[
            Segment::Literal("properties"),
            Segment::Field(MetadataField::PropertyId),
            Segment::FieldOr(MetadataField::Category, "general"),
        ],
    },
    PathRule {
        context: StorageContext::TenantDocuments,
        required: &[MetadataField::TenantId],
        segments: TENANT_DOCUMENT_SEGMENTS,
    },
    PathRule {
        context: StorageContext::Documents,
        required: &[MetadataField::TenantId],
        segments: TENANT_DOCUMENT_SEGMENTS,
    },
    PathRule {
        context: StorageContext::MaintenanceFiles,
        required: &[MetadataField::PropertyId],
        segments: &[
            Segment::Literal("properties"),
            Segment::Field(MetadataField::PropertyId),
            Segment::Literal("maintenance"),
        ],
    },
    PathRule {
        context: StorageContext::Agreements,
        required: &[MetadataField::PropertyId, MetadataField::TenantId],
        segments: &[
            Segment::Literal("properties"),
            Segment::Field(MetadataField::PropertyId),
            Segment::Literal("tenants"),
            Segment::Field(MetadataField::TenantId),
            Segment::Literal("agreements"),
        ],
    },
    PathRule {
        context: StorageContext::IdDocuments,
        required: &[],
        segments: &[Segment::Literal("id")],
    },
];

const TENANT_DOCUMENT_SEGMENTS: &[Segment] = &[
    Segment::Literal("tenants"),
    Segment::Field(MetadataField::TenantId),
    Segment::Literal("documents"),
    Segment::FieldOr(MetadataField::DocumentType, "other"),
];

/// Layout for identifiers the registry did not recognize.
const GENERAL_SEGMENTS: &[Segment] = &[Segment::Literal("general")];

/// Rule for a context, if one is declared.
pub fn path_rule(context: StorageContext) -> Option<&'static PathRule> {
    PATH_RULES.iter().find(|rule| rule.context == context)
}

/// Fields (besides `userId`) a context needs.
pub fn required_fields(context: StorageContext) -> &'static [MetadataField] {
    path_rule(context).map(|rule| rule.required).unwrap_or(&[])
}

/// Builds unique object keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathBuilder;

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder
    }

    /// Build the key for `file_name`.
    ///
    /// `context` is `None` when the caller's identifier was not recognized; the
    /// generic `users/{userId}/general/` layout applies then.
    pub fn build(
        &self,
        file_name: &str,
        context: Option<StorageContext>,
        explicit_folder: Option<&str>,
        metadata: Option<&UploadMetadata>,
    ) -> Result<String, GatewayError> {
        let unique = unique_file_name(file_name);

        if let Some(folder) = explicit_folder.and_then(normalize_folder) {
            check_folder(folder)?;
            return Ok(format!("{}/{}", folder, unique));
        }

        let metadata = metadata.ok_or_else(GatewayError::missing_user_id)?;
        let user_id = metadata
            .get(MetadataField::UserId)
            .ok_or_else(GatewayError::missing_user_id)?;
        check_segment(MetadataField::UserId, user_id)?;

        let (required, segments) = match context.and_then(path_rule) {
            Some(rule) => (rule.required, rule.segments),
            None => (&[][..], GENERAL_SEGMENTS),
        };

        // context is Some whenever a rule matched, so the label is always real here
        let label = context.map(|c| c.as_str()).unwrap_or("general");
        for field in required {
            if metadata.get(*field).is_none() {
                return Err(GatewayError::missing_field(*field, label));
            }
        }

        let mut parts: Vec<&str> = Vec::with_capacity(segments.len() + 3);
        parts.push(USERS_PREFIX);
        parts.push(user_id);
        for segment in segments {
            let part = match *segment {
                Segment::Literal(literal) => literal,
                Segment::Field(field) => metadata
                    .get(field)
                    .ok_or_else(|| GatewayError::missing_field(field, label))?,
                Segment::FieldOr(field, default) => metadata.get(field).unwrap_or(default),
            };
            if let Segment::Field(field) | Segment::FieldOr(field, _) = *segment {
                check_segment(field, part)?;
            }
            parts.push(part);
        }
        parts.push(&unique);

        Ok(parts.join("/"))
    }
}

/// `{epochMillis}-{base36 token}.{extension}`
pub fn unique_file_name(original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::rng();
    let token: String = (0..TOKEN_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}.{}", millis, token, file_extension(original))
}

/// Last dot-delimited segment of the file's base name, or `file`.
pub fn file_extension(original: &str) -> &str {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    match base.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => ext,
        _ => DEFAULT_EXTENSION,
    }
}

fn normalize_folder(folder: &str) -> Option<&str> {
    let trimmed = folder.trim().trim_matches('/');
    (!trimmed.is_empty()).then_some(trimmed)
}

fn check_folder(folder: &str) -> Result<(), GatewayError> {
    for part in folder.split('/') {
        if part.is_empty() || part == "." || part == ".." || part.contains('\\') {
            return Err(GatewayError::InvalidPath(format!(
                "folder '{}' contains an invalid segment",
                folder
            )));
        }
    }
    Ok(())
}

fn check_segment(field: MetadataField, value: &str) -> Result<(), GatewayError> {
    if value == "." || value == ".." || value.contains('/') || value.contains('\\') {
        return Err(GatewayError::InvalidPath(format!(
            "{} '{}' cannot be used as a path segment",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits `{prefix}/{millis}-{token}.{ext}` and checks the file name shape.
    fn split_key<'a>(key: &'a str, expected_ext: &str) -> &'a str {
        let (prefix, name) = key.rsplit_once('/').expect("key has a folder");
        let (stem, ext) = name.rsplit_once('.').expect("name has an extension");
        assert_eq!(ext, expected_ext);
        let (millis, token) = stem.split_once('-').expect("name has a token");
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        prefix
    }

    fn build(
        context: StorageContext,
        metadata: Option<&UploadMetadata>,
    ) -> Result<String, GatewayError> {
        PathBuilder::new().build("photo.jpg", Some(context), None, metadata)
    }

    #[test]
    fn test_property_images_layout() {
        let metadata = UploadMetadata::for_user("u1")
            .with_property("p1")
            .with_category("exterior");
        let key = build(StorageContext::PropertyImages, Some(&metadata)).unwrap();
        assert_eq!(split_key(&key, "jpg"), "users/u1/properties/p1/exterior");

        let metadata = UploadMetadata::for_user("u1").with_property("p1");
        let key = build(StorageContext::PropertyImages, Some(&metadata)).unwrap();
        assert_eq!(split_key(&key, "jpg"), "users/u1/properties/p1/general");
    }

    #[test]
    fn test_tenant_document_layouts() {
        let metadata = UploadMetadata::for_user("u1")
            .with_tenant("t9")
            .with_document_type("payslip");
        for ctx in [StorageContext::TenantDocuments, StorageContext::Documents] {
            let key = build(ctx, Some(&metadata)).unwrap();
            assert_eq!(split_key(&key, "jpg"), "users/u1/tenants/t9/documents/payslip");
        }

        let metadata = UploadMetadata::for_user("u1").with_tenant("t9");
        let key = build(StorageContext::Documents, Some(&metadata)).unwrap();
        assert_eq!(split_key(&key, "jpg"), "users/u1/tenants/t9/documents/other");
    }

    #[test]
    fn test_maintenance_agreement_and_id_layouts() {
        let metadata = UploadMetadata::for_user("u1")
            .with_property("p1")
            .with_tenant("t1");

        let key = build(StorageContext::MaintenanceFiles, Some(&metadata)).unwrap();
        assert_eq!(split_key(&key, "jpg"), "users/u1/properties/p1/maintenance");

        let key = build(StorageContext::Agreements, Some(&metadata)).unwrap();
        assert_eq!(
            split_key(&key, "jpg"),
            "users/u1/properties/p1/tenants/t1/agreements"
        );

        let key = build(StorageContext::IdDocuments, Some(&UploadMetadata::for_user("u1"))).unwrap();
        assert_eq!(split_key(&key, "jpg"), "users/u1/id");
    }

    #[test]
    fn test_unrecognized_context_uses_general_layout() {
        let metadata = UploadMetadata::for_user("u1");
        let key = PathBuilder::new()
            .build("notes.txt", None, None, Some(&metadata))
            .unwrap();
        assert_eq!(split_key(&key, "txt"), "users/u1/general");
    }

    #[test]
    fn test_agreements_require_tenant_id() {
        let metadata = UploadMetadata::for_user("u1").with_property("p1");
        let err = build(StorageContext::Agreements, Some(&metadata)).unwrap_err();
        assert_eq!(err.to_string(), "tenantId is required for agreements");
        assert!(matches!(
            err,
            GatewayError::MissingMetadata {
                field: MetadataField::TenantId,
                ..
            }
        ));

        let metadata = metadata.with_tenant("t1");
        assert!(build(StorageContext::Agreements, Some(&metadata)).is_ok());
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        for rule in PATH_RULES {
            for missing in rule.required {
                let mut metadata = UploadMetadata::for_user("u1")
                    .with_property("p1")
                    .with_tenant("t1");
                match missing {
                    MetadataField::PropertyId => metadata.property_id = None,
                    MetadataField::TenantId => metadata.tenant_id = None,
                    other => panic!("unexpected required field {}", other),
                }
                let err = build(rule.context, Some(&metadata)).unwrap_err();
                assert_eq!(
                    err.to_string(),
                    format!("{} is required for {}", missing, rule.context)
                );
            }
        }
        assert_eq!(
            required_fields(StorageContext::Agreements),
            &[MetadataField::PropertyId, MetadataField::TenantId]
        );
        assert!(required_fields(StorageContext::IdDocuments).is_empty());
    }

    #[test]
    fn test_missing_user_id_fails_for_every_context() {
        for ctx in StorageContext::ALL {
            let err = build(ctx, None).unwrap_err();
            assert!(matches!(
                err,
                GatewayError::MissingMetadata {
                    field: MetadataField::UserId,
                    ..
                }
            ));

            let metadata = UploadMetadata::default().with_property("p1").with_tenant("t1");
            assert!(build(ctx, Some(&metadata)).is_err());
        }
        assert!(PathBuilder::new().build("a.pdf", None, None, None).is_err());
    }

    #[test]
    fn test_explicit_folder_bypasses_metadata() {
        let key = PathBuilder::new()
            .build("lease.pdf", Some(StorageContext::Agreements), Some("custom/path"), None)
            .unwrap();
        assert_eq!(split_key(&key, "pdf"), "custom/path");

        let key = PathBuilder::new()
            .build("lease.pdf", None, Some("/legacy/"), None)
            .unwrap();
        assert_eq!(split_key(&key, "pdf"), "legacy");
    }

    #[test]
    fn test_blank_explicit_folder_is_ignored() {
        let err = PathBuilder::new()
            .build("lease.pdf", Some(StorageContext::Agreements), Some("  "), None)
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingMetadata { .. }));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let builder = PathBuilder::new();
        for folder in ["../etc", "a/../b", "a//b", "a/./b"] {
            assert!(matches!(
                builder.build("x.png", None, Some(folder), None),
                Err(GatewayError::InvalidPath(_))
            ));
        }

        let metadata = UploadMetadata::for_user("u1").with_property("../p2");
        assert!(matches!(
            build(StorageContext::PropertyImages, Some(&metadata)),
            Err(GatewayError::InvalidPath(_))
        ));
        let metadata = UploadMetadata::for_user("u1/u2");
        assert!(matches!(
            build(StorageContext::IdDocuments, Some(&metadata)),
            Err(GatewayError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_consecutive_keys_differ() {
        let metadata = UploadMetadata::for_user("u1").with_property("p1");
        let first = build(StorageContext::PropertyImages, Some(&metadata)).unwrap();
        let second = build(StorageContext::PropertyImages, Some(&metadata)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), "JPG");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "file");
        assert_eq!(file_extension("trailing."), "file");
        assert_eq!(file_extension("dir.v2/scan"), "file");
        assert_eq!(file_extension("C:\\scans\\id.pdf"), "pdf");
        assert_eq!(file_extension("weird.p/df"), "file");
    }
}
