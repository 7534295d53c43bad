//! Validation modules

pub mod file;

pub use file::{
    normalize_mime_type, validate_content_type, validate_file, validate_file_size, DeclaredFile,
};
