//! Test fixtures: file blobs of a chosen size.

use rentvault_services::UploadFile;

/// JPEG SOI/APP0 header padded with zeros to exactly `size` bytes.
pub fn jpeg_of_size(name: &str, size: usize) -> UploadFile {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    data.resize(size.max(data.len()), 0);
    data.truncate(size);
    UploadFile::new(name, "image/jpeg", data)
}

/// Minimal PDF document.
pub fn pdf(name: &str) -> UploadFile {
    UploadFile::new(
        name,
        "application/pdf",
        b"%PDF-1.4\n1 0 obj<<>>endobj\ntrailer<<>>\n%%EOF\n".to_vec(),
    )
}
