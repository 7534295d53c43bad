use std::sync::Arc;

use rentvault_core::validation::validate_file;
use rentvault_core::{
    ContextPolicyRegistry, DeclaredFile, ErrorMetadata, GatewayError, LogLevel, PathBuilder,
};
use rentvault_storage::{PutOptions, Storage};

use super::types::{UploadRequest, UploadResult};

/// Validates, keys and writes uploads.
///
/// `upload` never returns an error: every failure is folded into an
/// [`UploadResult`] with `success == false`. Nothing reaches the backend until
/// the file has passed validation and a key has been built.
#[derive(Clone)]
pub struct UploadGateway {
    registry: Arc<ContextPolicyRegistry>,
    storage: Arc<dyn Storage>,
    paths: PathBuilder,
}

impl UploadGateway {
    pub fn new(registry: Arc<ContextPolicyRegistry>, storage: Arc<dyn Storage>) -> Self {
        UploadGateway {
            registry,
            storage,
            paths: PathBuilder::new(),
        }
    }

    #[tracing::instrument(skip(self, request), fields(
        identifier = %request.target,
        file_name = %request.file.name,
        size_bytes = request.file.size_bytes
    ))]
    pub async fn upload(&self, request: UploadRequest) -> UploadResult {
        match self.try_upload(request).await {
            Ok(result) => result,
            Err(e) => {
                log_gateway_error(&e);
                UploadResult::failed(&e)
            }
        }
    }

    async fn try_upload(&self, request: UploadRequest) -> Result<UploadResult, GatewayError> {
        let UploadRequest {
            file,
            target,
            explicit_folder,
            metadata,
        } = request;

        let resolution = self.registry.resolve(&target)?;
        let bucket = resolution.bucket();

        let declared = DeclaredFile {
            name: &file.name,
            size_bytes: file.size_bytes,
            content_type: &file.content_type,
        };
        validate_file(&declared, target.trim(), resolution.policy)?;

        let key = self.paths.build(
            &file.name,
            resolution.path_context(),
            explicit_folder.as_deref(),
            metadata.as_ref(),
        )?;

        let options = PutOptions::default().with_content_type(file.content_type.clone());
        self.storage
            .put(bucket, &key, file.bytes, &options)
            .await
            .map_err(|e| GatewayError::Backend(e.to_string()))?;

        let public_url = self.storage.public_url(bucket, &key);

        tracing::info!(
            bucket = %bucket,
            key = %key,
            context = %resolution.context,
            fallback = resolution.fallback,
            "Upload stored"
        );

        Ok(UploadResult::stored(
            public_url,
            key,
            file.content_type,
            file.size_bytes,
        ))
    }
}

fn log_gateway_error(err: &GatewayError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error_code = err.error_code(),
            error = %err,
            "Upload rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            error_code = err.error_code(),
            error_type = err.error_type(),
            error = %err,
            "Upload request is missing required input"
        ),
        LogLevel::Error => tracing::error!(
            error_code = err.error_code(),
            error = %err,
            "Upload failed in storage backend"
        ),
    }
}
