use bytes::Bytes;
use rentvault_core::{ErrorMetadata, GatewayError, UploadMetadata};
use serde::Serialize;

/// A file handed to the gateway.
///
/// `size_bytes` is what the caller declared and is what validation checks.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    /// Build a file whose declared size is the length of `bytes`.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        UploadFile {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// One upload call: the file, where it goes, and what to key it by.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: UploadFile,
    /// Context tag (e.g. `property_images`) or raw bucket name.
    pub target: String,
    pub explicit_folder: Option<String>,
    pub metadata: Option<UploadMetadata>,
}

impl UploadRequest {
    pub fn new(file: UploadFile, target: impl Into<String>) -> Self {
        UploadRequest {
            file,
            target: target.into(),
            explicit_folder: None,
            metadata: None,
        }
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.explicit_folder = Some(folder.into());
        self
    }

    pub fn with_metadata(mut self, metadata: UploadMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl UploadResult {
    pub fn stored(public_url: String, file_path: String, mime_type: String, file_size_bytes: u64) -> Self {
        UploadResult {
            success: true,
            public_url: Some(public_url),
            file_path: Some(file_path),
            mime_type: Some(mime_type),
            file_size_bytes: Some(file_size_bytes),
            error: None,
            error_code: None,
        }
    }

    /// Failure carrying the client-facing message of `err`.
    pub fn failed(err: &GatewayError) -> Self {
        UploadResult {
            success: false,
            public_url: None,
            file_path: None,
            mime_type: None,
            file_size_bytes: None,
            error: Some(err.client_message()),
            error_code: Some(err.error_code()),
        }
    }
}
