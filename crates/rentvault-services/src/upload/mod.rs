//! Upload path: resolve the target, validate the file, build a key, write it.

mod service;
mod types;

pub use service::UploadGateway;
pub use types::{UploadFile, UploadRequest, UploadResult};
