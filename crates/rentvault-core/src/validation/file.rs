//! File checks against a context policy.
//!
//! Rules run in a fixed order and the first failure wins, so a rejected file
//! always carries exactly one reason: size first, then content type.

use crate::error::GatewayError;
use crate::policy::ContextPolicy;

/// What the caller declared about a file, independent of its bytes.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredFile<'a> {
    pub name: &'a str,
    pub size_bytes: u64,
    pub content_type: &'a str,
}

/// Validate a declared file against `policy`. `context` is only used in messages.
pub fn validate_file(
    file: &DeclaredFile<'_>,
    context: &str,
    policy: &ContextPolicy,
) -> Result<(), GatewayError> {
    validate_file_size(file.size_bytes, policy)?;
    validate_content_type(file.content_type, context, policy)?;
    Ok(())
}

/// Limit is inclusive; zero-byte files pass.
pub fn validate_file_size(size_bytes: u64, policy: &ContextPolicy) -> Result<(), GatewayError> {
    if size_bytes > policy.max_size_bytes {
        return Err(GatewayError::Validation(format!(
            "File size exceeds maximum allowed size of {}MB",
            policy.max_size_mb()
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

pub fn validate_content_type(
    content_type: &str,
    context: &str,
    policy: &ContextPolicy,
) -> Result<(), GatewayError> {
    let normalized = normalize_mime_type(content_type);
    if normalized.is_empty() || !policy.allows_content_type(&normalized) {
        return Err(GatewayError::Validation(format!(
            "File type {} is not allowed for {}",
            content_type.trim(),
            context
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StorageContext;
    use crate::policy::{default_policy, BYTES_PER_MB};

    fn file(size_bytes: u64, content_type: &str) -> DeclaredFile<'_> {
        DeclaredFile {
            name: "upload.bin",
            size_bytes,
            content_type,
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = default_policy(StorageContext::IdDocuments);
        let limit = policy.max_size_bytes;

        assert!(validate_file(&file(limit, "image/png"), "id_documents", &policy).is_ok());

        let err = validate_file(&file(limit + 1, "image/png"), "id_documents", &policy)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
        assert!(err.to_string().contains("5MB"), "{}", err);
    }

    #[test]
    fn test_zero_byte_file_is_accepted() {
        let policy = default_policy(StorageContext::Agreements);
        assert!(validate_file(&file(0, "application/pdf"), "agreements", &policy).is_ok());
    }

    #[test]
    fn test_limit_is_reported_rounded() {
        let policy = ContextPolicy::new("b", 2_700_000, ["image/png"]);
        let err = validate_file_size(2_700_001, &policy).unwrap_err();
        assert!(err.to_string().contains("3MB"), "{}", err);
    }

    #[test]
    fn test_every_allowed_type_is_accepted() {
        for ctx in StorageContext::ALL {
            let policy = default_policy(ctx);
            for content_type in &policy.allowed_content_types {
                assert!(
                    validate_file(&file(1024, content_type), ctx.as_str(), &policy).is_ok(),
                    "{} should accept {}",
                    ctx,
                    content_type
                );
            }
        }
    }

    #[test]
    fn test_disallowed_type_names_type_and_context() {
        let policy = default_policy(StorageContext::IdDocuments);
        let err = validate_file(&file(1024, "application/zip"), "id_documents", &policy)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("application/zip"));
        assert!(message.contains("id_documents"));

        for ctx in StorageContext::ALL {
            let policy = default_policy(ctx);
            assert!(validate_file(&file(1, "application/x-msdownload"), ctx.as_str(), &policy)
                .is_err());
        }
    }

    #[test]
    fn test_size_rule_wins_over_type_rule() {
        let policy = default_policy(StorageContext::PropertyImages);
        let err = validate_file(
            &file(policy.max_size_bytes + 1, "application/zip"),
            "property_images",
            &policy,
        )
        .unwrap_err();
        assert!(err.to_string().contains("10MB"));
        assert!(!err.to_string().contains("application/zip"));
    }

    #[test]
    fn test_content_type_parameters_and_case_are_ignored() {
        let policy = default_policy(StorageContext::PropertyImages);
        assert!(validate_content_type("Image/JPEG; charset=binary", "property_images", &policy)
            .is_ok());
        assert!(validate_content_type("", "property_images", &policy).is_err());
    }

    #[test]
    fn test_one_mb_policy_boundary() {
        let policy = ContextPolicy::new("b", BYTES_PER_MB, ["text/plain"]);
        assert!(validate_file_size(BYTES_PER_MB, &policy).is_ok());
        assert!(validate_file_size(BYTES_PER_MB + 1, &policy).is_err());
    }
}
