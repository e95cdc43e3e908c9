//! Image intake: payload decoding and analysis raster
//!
//! Photos arrive either as base64 payloads (optionally prefixed with a
//! `data:<mime>;base64,` URI header) or as files on disk. Both paths decode
//! through the `image` crate, convert to RGB8 and resample to the square
//! analysis resolution.
//!
//! ## Supported Formats
//!
//! Every format the `image` crate decodes with its default features:
//! JPEG, PNG, GIF (first frame), WebP, TIFF, BMP, ICO, TGA, PNM, QOI, ...

use crate::error::{AssessmentError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Decoded RGB raster at analysis resolution
///
/// Cloning is cheap; the pixel buffer is shared and never mutated.
#[derive(Debug, Clone)]
pub struct RawImage {
    pixels: Arc<RgbImage>,
}

impl RawImage {
    /// Wrap an RGB buffer without resampling
    pub fn new(pixels: RgbImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Resample any decoded image to a square raster
    pub fn from_dynamic(image: DynamicImage, resolution: u32) -> Self {
        let rgb = image.to_rgb8();
        if rgb.dimensions() == (resolution, resolution) {
            return Self::new(rgb);
        }
        Self::new(image::imageops::resize(
            &rgb,
            resolution,
            resolution,
            FilterType::CatmullRom,
        ))
    }

    /// Uniformly colored raster, mostly useful for tests and self-checks
    pub fn uniform(resolution: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(resolution, resolution, image::Rgb(rgb)))
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Number of pixels in the raster
    pub fn pixel_count(&self) -> usize {
        self.pixels.width() as usize * self.pixels.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }
}

/// Decode a base64 payload into an analysis raster
///
/// # Arguments
///
/// * `payload` - base64 text, with or without a data-URI prefix
/// * `resolution` - side length of the output raster
/// * `min_len` - payloads shorter than this are rejected before decoding
///
/// # Errors
///
/// Returns `AssessmentError::DecodeFailure` if the payload is too short,
/// is not valid base64, or does not contain a decodable image.
pub fn decode_payload(payload: &str, resolution: u32, min_len: usize) -> Result<RawImage> {
    let payload = payload.trim();
    if payload.len() < min_len {
        return Err(AssessmentError::invalid_payload("Invalid image data provided"));
    }

    // Data URIs carry the base64 body after the first comma
    let body = match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    };

    let bytes = STANDARD
        .decode(body.trim())
        .map_err(|e| AssessmentError::decode("Payload is not valid base64", e))?;

    decode_bytes(&bytes, resolution)
}

/// Decode encoded image bytes into an analysis raster
pub fn decode_bytes(bytes: &[u8], resolution: u32) -> Result<RawImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| AssessmentError::decode("Failed to process image", e))?;
    ensure_not_empty(&image)?;
    Ok(RawImage::from_dynamic(image, resolution))
}

/// Load an image file from disk into an analysis raster
///
/// # Errors
///
/// Returns `AssessmentError::DecodeFailure` if the file cannot be opened or decoded.
pub fn load_image(path: &Path, resolution: u32) -> Result<RawImage> {
    let reader = image::ImageReader::open(path).map_err(|e| {
        AssessmentError::decode(format!("Failed to open image file: {}", path.display()), e)
    })?;
    let reader = reader.with_guessed_format().map_err(|e| {
        AssessmentError::decode(format!("Failed to read image file: {}", path.display()), e)
    })?;
    let image = reader.decode().map_err(|e| {
        AssessmentError::decode(format!("Failed to decode image: {}", path.display()), e)
    })?;
    ensure_not_empty(&image)?;
    Ok(RawImage::from_dynamic(image, resolution))
}

/// Encode an RGB buffer as a PNG data-URI payload
pub fn encode_payload(image: &RgbImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| AssessmentError::decode("Failed to encode image", e))?;
    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.into_inner())
    ))
}

/// Check if a file extension names a decodable image format
pub fn is_supported_extension(ext: &str) -> bool {
    ImageFormat::from_extension(ext)
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}

fn ensure_not_empty(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AssessmentError::invalid_payload("Image has no pixels"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> RgbImage {
        RgbImage::from_fn(32, 16, |x, y| image::Rgb([(x * 8) as u8, (y * 16) as u8, 90]))
    }

    #[test]
    fn test_payload_with_data_uri_prefix() {
        let payload = encode_payload(&sample_image()).unwrap();
        assert!(payload.starts_with("data:image/png;base64,"));

        let raw = decode_payload(&payload, 224, 100).unwrap();
        assert_eq!(raw.width(), 224);
        assert_eq!(raw.height(), 224);
    }

    #[test]
    fn test_payload_without_prefix() {
        let payload = encode_payload(&sample_image()).unwrap();
        let bare = payload.split_once(',').unwrap().1;

        let raw = decode_payload(bare, 64, 100).unwrap();
        assert_eq!(raw.pixel_count(), 64 * 64);
    }

    #[test]
    fn test_short_payload_rejected() {
        let result = decode_payload("data:image/png;base64,AAAA", 224, 100);
        match result {
            Err(AssessmentError::DecodeFailure { message, .. }) => {
                assert_eq!(message, "Invalid image data provided");
            }
            other => panic!("Expected DecodeFailure, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let garbage = "!".repeat(200);
        assert!(matches!(
            decode_payload(&garbage, 224, 100),
            Err(AssessmentError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn test_valid_base64_but_not_an_image() {
        let text = STANDARD.encode(vec![7u8; 300]);
        assert!(matches!(
            decode_payload(&text, 224, 100),
            Err(AssessmentError::DecodeFailure { .. })
        ));
    }

    #[test]
    fn test_non_square_input_is_resampled_to_square() {
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgb8(sample_image()), 16);
        assert_eq!((raw.width(), raw.height()), (16, 16));
    }

    #[test]
    fn test_resolution_already_matching_is_kept() {
        let square =
            RgbImage::from_fn(16, 16, |x, y| image::Rgb([(x * 16) as u8, (y * 16) as u8, 7]));
        let raw = RawImage::from_dynamic(DynamicImage::ImageRgb8(square.clone()), 16);
        assert_eq!(raw.pixels(), &square);

        let raw = RawImage::uniform(8, [10, 20, 30]);
        assert_eq!(raw.pixels().get_pixel(3, 3).0, [10, 20, 30]);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_extension("jpg"));
        assert!(is_supported_extension("JPEG"));
        assert!(is_supported_extension("png"));
        assert!(!is_supported_extension("xyz"));
        assert!(!is_supported_extension("doc"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_image(Path::new("nonexistent_photo.jpg"), 224);
        assert!(matches!(result, Err(AssessmentError::DecodeFailure { .. })));
    }
}
