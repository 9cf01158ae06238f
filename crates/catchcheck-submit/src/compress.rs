//! Photo downscaling and JPEG re-encoding
//!
//! Captured photos are turned upright from their EXIF orientation and
//! bounded to a maximum edge length before they are analyzed or stored.
//! Aspect ratio is preserved and images already within bounds are only
//! re-encoded.

use catchcheck_core::config::LayeredConfig;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::ImageAttachment;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Bounds applied to every captured photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Longest allowed edge in pixels
    pub max_dimension: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self { max_dimension: 1024, quality: 80 }
    }
}

impl CompressionSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            max_dimension: config.max_image_dimension.value,
            quality: config.jpeg_quality.value,
        }
    }
}

/// Target size for an image so that neither edge exceeds `max_dimension`
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let scale = |edge: u32, longest: u32| {
        ((edge as f64 * max_dimension as f64 / longest as f64).round() as u32).max(1)
    };
    if width >= height {
        (max_dimension, scale(height, width))
    } else {
        (scale(width, height), max_dimension)
    }
}

/// Decode, downscale and re-encode a captured photo as JPEG
pub fn compress_image(bytes: &[u8], settings: CompressionSettings) -> Result<ImageAttachment> {
    let decoded = decode_upright(bytes)?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(CatchError::InvalidImage { reason: "image has no pixels".to_string() });
    }

    let (target_w, target_h) = scaled_dimensions(width, height, settings.max_dimension);
    let resized = if (target_w, target_h) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_w, target_h, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, settings.quality);
    rgb.write_with_encoder(encoder).map_err(|e| CatchError::InvalidImage {
        reason: format!("JPEG encoding failed: {}", e),
    })?;

    tracing::debug!(
        original = %format!("{}x{}", width, height),
        compressed = %format!("{}x{}", target_w, target_h),
        input_bytes = bytes.len(),
        output_bytes = encoded.len(),
        "photo compressed"
    );

    Ok(ImageAttachment {
        bytes: encoded,
        mime_type: JPEG_MIME_TYPE.to_string(),
        width: target_w,
        height: target_h,
    })
}

/// Decode a photo and apply its EXIF orientation
///
/// Photos without orientation data, or with unreadable metadata, are used
/// as stored.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage> {
    let invalid = |e: image::ImageError| CatchError::InvalidImage { reason: e.to_string() };
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CatchError::InvalidImage { reason: e.to_string() })?;
    let mut decoder = reader.into_decoder().map_err(invalid)?;

    let orientation = decoder.orientation().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "ignoring unreadable orientation metadata");
        Orientation::NoTransforms
    });

    let mut decoded = DynamicImage::from_decoder(decoder).map_err(invalid)?;
    decoded.apply_orientation(orientation);
    Ok(decoded)
}
