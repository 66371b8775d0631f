//! Image payloads exchanged with the generation service.

use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Errors while reading, converting or decoding images
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("could not read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("unsupported image: {0}")]
    Unsupported(String),

    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),
}

/// An image chosen by the user, ready to be sent to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// File name shown in the uploader
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    /// Read an image from disk and convert it for transmission
    ///
    /// Decoding and re-encoding are CPU bound, so they run on the
    /// blocking pool.
    pub async fn load(path: PathBuf) -> Result<SourceImage, ImageError> {
        let bytes = tokio::fs::read(&path).await.map_err(|e| ImageError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let name = display_name(&path);

        tokio::task::spawn_blocking(move || SourceImage::from_bytes(name, bytes))
            .await
            .map_err(|e| ImageError::Unsupported(format!("conversion task failed: {e}")))?
    }

    /// Sniff the format; PNG, JPEG and WebP pass through, anything else
    /// the `image` crate can decode is re-encoded as PNG.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<SourceImage, ImageError> {
        let name = name.into();
        let format = image::guess_format(&bytes)
            .map_err(|e| ImageError::Unsupported(format!("{name}: {e}")))?;

        if let Some(mime_type) = passthrough_mime(format) {
            return Ok(SourceImage { name, mime_type, bytes });
        }

        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| ImageError::Unsupported(format!("{name}: {e}")))?;

        let mut png = Cursor::new(Vec::new());
        decoded
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| ImageError::Unsupported(format!("{name}: {e}")))?;

        tracing::debug!("🔄 Converted {} from {:?} to PNG", name, format);

        Ok(SourceImage {
            name,
            mime_type: "image/png",
            bytes: png.into_inner(),
        })
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

fn passthrough_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// An image returned by the service, still base64 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub base64: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Split a base64 data URI into its MIME type and decoded bytes
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), ImageError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::MalformedDataUri("missing data: prefix".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::MalformedDataUri("missing comma".into()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| ImageError::MalformedDataUri("not base64 encoded".into()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ImageError::MalformedDataUri(e.to_string()))?;

    Ok((mime_type.to_string(), bytes))
}
