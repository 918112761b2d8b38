use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::Path;

/// Upload type understood by the layout-parsing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Image,
}

impl FileType {
    /// Wire value for the `fileType` request field.
    pub fn code(self) -> u8 {
        match self {
            FileType::Pdf => 0,
            FileType::Image => 1,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

pub fn classify(path: &Path) -> FileType {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ext == "pdf" {
        return FileType::Pdf;
    }

    // Anything we don't recognize is sent as an image and left to the server
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        tracing::debug!(path = %path.display(), "Unrecognized extension, sending as image");
    }
    FileType::Image
}

pub fn encode(path: &Path) -> Result<String> {
    let data = fs::read(path)
        .map_err(|e| Error::io(format!("Failed to read file {}", path.display()), e))?;
    Ok(STANDARD.encode(data))
}
