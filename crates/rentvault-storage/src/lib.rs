//! RentVault Storage Library
//!
//! This crate provides the bucket-addressed storage abstraction used by the
//! upload gateway, with implementations for S3 (and S3-compatible providers)
//! and the local filesystem.
//!
//! # Storage key format
//!
//! Every operation takes a bucket name and an object key. Keys are relative
//! `/`-separated paths; they must not be empty, start with `/`, or contain
//! `..` or empty segments. The checks live in the `keys` module so every
//! backend rejects the same keys.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use rentvault_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{PutOptions, SignedUrlEntry, Storage, StorageError, StorageResult};
