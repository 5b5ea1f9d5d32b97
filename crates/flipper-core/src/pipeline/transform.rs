//! Horizontal mirror: decode, flip left-right, re-encode.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::TransformError;

/// A mirrored image ready for upload.
#[derive(Debug, Clone)]
pub struct MirroredImage {
    /// Encoded output bytes
    pub bytes: Vec<u8>,
    /// Format the input was decoded as
    pub source_format: ImageFormat,
    /// Format the output was encoded as
    pub output_format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl MirroredImage {
    /// True when the source format had no encoder and PNG was used instead.
    pub fn format_changed(&self) -> bool {
        self.source_format != self.output_format
    }
}

/// Format used when the source format cannot be written back.
pub const FALLBACK_FORMAT: ImageFormat = ImageFormat::Png;

/// Mirror an encoded image left-to-right.
///
/// Pure and deterministic: the same input always yields the same bytes.
/// The output keeps the input's encoding when an encoder exists for it,
/// otherwise it is written as PNG.
pub fn mirror(bytes: &[u8]) -> Result<MirroredImage, TransformError> {
    mirror_within(bytes, u32::MAX)
}

/// Like [`mirror`], rejecting images wider or taller than `max_dim`.
pub fn mirror_within(bytes: &[u8], max_dim: u32) -> Result<MirroredImage, TransformError> {
    let (image, source_format) = decode(bytes)?;
    let (width, height) = image.dimensions();
    if width > max_dim || height > max_dim {
        return Err(TransformError::ImageTooLarge {
            width,
            height,
            max_dim,
        });
    }

    let flipped = image.fliph();
    let (bytes, output_format) = encode(&flipped, source_format)?;

    Ok(MirroredImage {
        bytes,
        source_format,
        output_format,
        width,
        height,
    })
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), TransformError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(format!("Cannot detect image format: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| TransformError::UnsupportedFormat(sniff(bytes)))?;
    let image = reader
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))?;
    Ok((image, format))
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
) -> Result<(Vec<u8>, ImageFormat), TransformError> {
    let mut buffer = Cursor::new(Vec::new());
    match image.write_to(&mut buffer, format) {
        Ok(()) => Ok((buffer.into_inner(), format)),
        Err(ImageError::Unsupported(e)) if format != FALLBACK_FORMAT => {
            tracing::debug!("No {format:?} encoder ({e}), writing {FALLBACK_FORMAT:?} instead");
            let mut buffer = Cursor::new(Vec::new());
            image
                .write_to(&mut buffer, FALLBACK_FORMAT)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
            Ok((buffer.into_inner(), FALLBACK_FORMAT))
        }
        Err(e) => Err(TransformError::Encode(e.to_string())),
    }
}

/// Short hex preview of a buffer's leading bytes for error messages.
fn sniff(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty buffer".to_string();
    }
    let head: Vec<String> = bytes.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("unrecognised header {}", head.join(" "))
}

/// Runs [`mirror`] off the async scheduler with size and time limits.
#[derive(Debug, Clone)]
pub struct Transformer {
    limits: LimitsConfig,
}

impl Transformer {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Mirror `bytes` on the blocking pool, bounded by the transform timeout.
    pub async fn apply(&self, bytes: Vec<u8>) -> Result<MirroredImage, TransformError> {
        let max_dim = self.limits.max_image_dimension;
        let timeout_ms = self.limits.transform_timeout_ms;

        let result = timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(move || mirror_within(&bytes, max_dim)),
        )
        .await;

        match result {
            Ok(Ok(inner)) => inner,
            Ok(Err(e)) => Err(TransformError::Decode(format!("Task join error: {e}"))),
            Err(_) => Err(TransformError::Timeout { timeout_ms }),
        }
    }
}
