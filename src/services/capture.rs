//! Image capture: raw upload bytes to base64 payload plus data-URI preview.
//!
//! DESIGN
//! ======
//! The MIME type sent downstream is sniffed from the magic bytes, not taken
//! from the browser's declared type. A declared type is only used to reject
//! obvious non-images early; `application/octet-stream` counts as undeclared.
//! Only formats the diagnosis backend accepts get through: PNG, JPEG, WebP,
//! GIF and HEIC/HEIF. Size is checked before any encoding work.

use std::path::Path;
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::ImageFormat;
use tracing::debug;

use crate::env::env_parse;
use crate::locale;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";
const OCTET_STREAM: &str = "application/octet-stream";

/// Upload size ceiling, `MAX_IMAGE_BYTES` or 10 MiB.
pub fn max_image_bytes() -> usize {
    static VALUE: OnceLock<usize> = OnceLock::new();
    *VALUE.get_or_init(|| match env_parse("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES) {
        0 => DEFAULT_MAX_IMAGE_BYTES,
        max => max,
    })
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("image read failed: {0}")]
    Read(String),
    #[error("image is empty")]
    Empty,
    #[error("image too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: usize },
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

impl crate::error::ErrorCode for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Read(_) => "E_IMAGE_READ",
            Self::Empty => "E_IMAGE_EMPTY",
            Self::TooLarge { .. } => "E_IMAGE_TOO_LARGE",
            Self::UnsupportedType(_) => "E_IMAGE_UNSUPPORTED",
            Self::MalformedDataUri => "E_IMAGE_DATA_URI",
            Self::InvalidBase64(_) => "E_IMAGE_BASE64",
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::TooLarge { .. } => locale::IMAGE_TOO_LARGE.to_string(),
            _ => locale::IMAGE_UNREADABLE.to_string(),
        }
    }
}

/// An image ready for both display and transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// MIME type detected from the bytes (e.g. `image/png`).
    pub mime_type: String,
    /// Standard base64 of the original bytes, no prefix.
    pub payload: String,
    /// `data:<mime>;base64,<payload>`, directly usable as an `<img src>`.
    pub preview: String,
    pub byte_len: usize,
}

// =============================================================================
// ENCODING
// =============================================================================

/// Validate and encode an uploaded image.
///
/// # Errors
///
/// Fails when the buffer is empty, larger than `max_bytes`, declared as a
/// non-image type, or not one of the accepted image formats.
pub fn encode_image(bytes: &[u8], declared_mime: Option<&str>, max_bytes: usize) -> Result<EncodedImage, CaptureError> {
    if bytes.is_empty() {
        return Err(CaptureError::Empty);
    }
    check_size(bytes.len() as u64, max_bytes)?;

    let declared = declared_mime.map(essence).filter(|m| !m.is_empty() && m != OCTET_STREAM);
    if let Some(declared) = &declared {
        if !declared.starts_with("image/") {
            return Err(CaptureError::UnsupportedType(declared.clone()));
        }
    }

    let mime_type = sniff_mime(bytes)
        .ok_or_else(|| CaptureError::UnsupportedType(declared.unwrap_or_else(|| "unknown".to_string())))?
        .to_string();

    let payload = BASE64_STANDARD.encode(bytes);
    let preview = data_uri(&mime_type, &payload);
    debug!(%mime_type, byte_len = bytes.len(), "capture: image encoded");

    Ok(EncodedImage { mime_type, payload, preview, byte_len: bytes.len() })
}

/// Re-validate an image that arrives already as a data URI (what a browser
/// `FileReader.readAsDataURL` produces).
///
/// # Errors
///
/// Malformed URI or base64 errors, then the same errors as [`encode_image`].
pub fn encode_data_uri(uri: &str, max_bytes: usize) -> Result<EncodedImage, CaptureError> {
    let (declared, payload) = split_data_uri(uri.trim())?;
    // Reject before decoding anything huge.
    check_size(decoded_len(payload), max_bytes)?;
    let bytes = decode_payload(payload)?;
    encode_image(&bytes, Some(declared), max_bytes)
}

/// Read and encode an image file from disk. The extension is ignored;
/// the type comes from the bytes.
///
/// # Errors
///
/// [`CaptureError::Read`] when the file cannot be read, then the same
/// errors as [`encode_image`].
pub async fn encode_file(path: &Path, max_bytes: usize) -> Result<EncodedImage, CaptureError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| CaptureError::Read(e.to_string()))?;
    check_size(metadata.len(), max_bytes)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| CaptureError::Read(e.to_string()))?;
    encode_image(&bytes, None, max_bytes)
}

/// Detect an accepted image type from its leading bytes.
fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if let Some(mime) = heif_brand(bytes) {
        return Some(mime);
    }
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Gif => Some("image/gif"),
        _ => None,
    }
}

/// HEIC/HEIF files are ISO-BMFF: a 4-byte box size, `ftyp`, then the major brand.
fn heif_brand(bytes: &[u8]) -> Option<&'static str> {
    let brand = bytes.get(4..12)?.strip_prefix(b"ftyp")?;
    match brand {
        b"heic" | b"heix" | b"hevc" | b"hevx" => Some("image/heic"),
        b"mif1" | b"msf1" | b"heim" | b"heis" => Some("image/heif"),
        _ => None,
    }
}

/// Decoded size of a padded base64 payload.
fn decoded_len(payload: &str) -> u64 {
    let padding = payload.bytes().rev().take_while(|&b| b == b'=').count().min(2);
    ((payload.len() / 4) * 3).saturating_sub(padding) as u64
}

fn check_size(size: u64, max_bytes: usize) -> Result<(), CaptureError> {
    if size > max_bytes as u64 {
        return Err(CaptureError::TooLarge { size, max: max_bytes });
    }
    Ok(())
}

/// Lower-cased MIME type without parameters (`"Image/PNG; q=1"` becomes `"image/png"`).
fn essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

#[must_use]
pub fn data_uri(mime_type: &str, payload: &str) -> String {
    format!("{DATA_URI_PREFIX}{mime_type}{BASE64_MARKER}{payload}")
}

/// Split a base64 data URI into `(mime_type, payload)`.
///
/// # Errors
///
/// Returns [`CaptureError::MalformedDataUri`] if the prefix or the base64
/// marker is missing.
pub fn split_data_uri(uri: &str) -> Result<(&str, &str), CaptureError> {
    let rest = uri.strip_prefix(DATA_URI_PREFIX).ok_or(CaptureError::MalformedDataUri)?;
    let (mime, payload) = rest.split_once(BASE64_MARKER).ok_or(CaptureError::MalformedDataUri)?;
    Ok((mime, payload))
}

/// Decode a base64 payload back into bytes.
///
/// # Errors
///
/// Returns [`CaptureError::InvalidBase64`] for non-base64 input.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, CaptureError> {
    BASE64_STANDARD
        .decode(payload)
        .map_err(|e| CaptureError::InvalidBase64(e.to_string()))
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;
