//! RentVault Services Layer
//!
//! This crate is the gateway's **service layer**: it composes the policy
//! registry, path builder and validator from `rentvault-core` with a
//! `rentvault-storage` backend into the upload, signing and deletion services,
//! and exposes them through the [`StorageGateway`] facade. Persisting document
//! records after an upload is left to callers.

pub mod deletion;
pub mod gateway;
pub mod signing;
pub mod upload;

pub use deletion::DeletionService;
pub use gateway::StorageGateway;
pub use signing::SignedUrlIssuer;
pub use upload::{UploadFile, UploadGateway, UploadRequest, UploadResult};

pub use rentvault_core::{
    Config, ContextPolicyRegistry, GatewayError, StorageBackend, StorageContext, UploadMetadata,
};
pub use rentvault_storage::{create_storage, Storage, StorageError, StorageResult};
