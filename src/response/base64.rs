//! Base64 and data-URI helpers for image references

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode a base64 string or a `data:` URI to binary data
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let data = match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    };

    STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::Decode(format!("Invalid base64 data: {}", e)))
}

/// MIME type declared by a `data:image/...;base64,` prefix
pub fn get_mime_from_data_url(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let end = rest.find(';')?;
    let mime = &rest[..end];
    mime.starts_with("image/").then_some(mime)
}

/// Create a data URI from binary image data
pub fn create_data_url(data: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, encode(data))
}

/// Wrap an already-encoded base64 payload as a data URI
pub fn wrap_base64(b64: &str, mime: &str) -> String {
    format!("data:{};base64,{}", mime, b64.trim())
}

/// Detect the image MIME type from magic bytes
pub fn detect_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    None
}

/// File extension for an image MIME type
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "png",
    }
}
