//! Shared key checks for storage backends.
//!
//! Keys must be non-empty, relative, and free of `..` segments; bucket names are
//! a single path segment. All backends apply the same rules.

use crate::traits::{StorageError, StorageResult};

pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    if key.split('/').any(|part| part.is_empty() || part == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key '{}' contains an invalid segment",
            key
        )));
    }
    Ok(())
}

pub fn validate_bucket(bucket: &str) -> StorageResult<()> {
    if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
        return Err(StorageError::UnknownBucket(bucket.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(validate_key("users/u1/id/1700000000000-abc.png").is_ok());
        assert!(validate_key("custom/path/file.pdf").is_ok());
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", "/etc/passwd", "../secret", "a/../b", "a//b", "a\\b", "trailing/"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{} should be rejected",
                key
            );
        }
    }

    #[test]
    fn test_bucket_names() {
        assert!(validate_bucket("tenant-documents").is_ok());
        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("..").is_err());
        assert!(validate_bucket("a/b").is_err());
    }
}
