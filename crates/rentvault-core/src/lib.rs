//! RentVault Core Library
//!
//! Upload contexts and their policies, per-request metadata, object key
//! construction, file validation, error types and configuration shared by the
//! storage backends and the gateway services.

pub mod config;
pub mod context;
pub mod error;
pub mod metadata;
pub mod path;
pub mod policy;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, PolicyOverride};
pub use context::{Identifier, StorageContext};
pub use error::{ErrorMetadata, GatewayError, LogLevel};
pub use metadata::{MetadataField, UploadMetadata};
pub use path::{PathBuilder, PathRule, Segment, PATH_RULES};
pub use policy::{ContextPolicy, ContextPolicyRegistry, RegistryBuilder, Resolution, BYTES_PER_MB};
pub use storage_types::StorageBackend;
pub use validation::DeclaredFile;
