//! Color space conversion utilities
//!
//! Per-pixel conversions from 8-bit RGB into the representations the
//! feature extractor and the skin-tone check work in:
//! - HSV with hue in [0, 180) and saturation/value in [0, 255]
//! - CIE Lab (D65) and its 8-bit encoding (L*·255/100, a*+128, b*+128)
//! - YUV (BT.601) with chroma offset by 128
//! - BT.601 luma and grayscale rasters
//!
//! The 8-bit encodings follow the conventions of common vision toolkits so
//! that thresholds expressed in channel units carry over unchanged.

use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Lab, Srgb};

/// HSV color in 8-bit channel units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv8 {
    /// Hue as degrees / 2, in [0, 180)
    pub h: f32,
    /// Saturation in [0, 255]
    pub s: f32,
    /// Value in [0, 255]
    pub v: f32,
}

/// Lab color in 8-bit channel units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab8 {
    /// Lightness scaled to [0, 255]
    pub l: f32,
    /// a* offset by 128
    pub a: f32,
    /// b* offset by 128
    pub b: f32,
}

/// YUV color in 8-bit channel units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yuv8 {
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;
const CHROMA_OFFSET: f32 = 128.0;

/// Color converter for 8-bit RGB pixels
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    fn to_srgb(&self, rgb: [u8; 3]) -> Srgb {
        Srgb::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    /// Convert RGB (0-255) to HSV in 8-bit channel units
    ///
    /// Achromatic pixels report hue 0.
    pub fn rgb_to_hsv(&self, rgb: [u8; 3]) -> Hsv8 {
        let hsv: Hsv = Hsv::from_color(self.to_srgb(rgb));
        let degrees = if hsv.saturation > 0.0 {
            hsv.hue.into_positive_degrees()
        } else {
            0.0
        };
        Hsv8 {
            h: (degrees / 2.0) % 180.0,
            s: hsv.saturation * 255.0,
            v: hsv.value * 255.0,
        }
    }

    /// Convert RGB (0-255) to CIE Lab under D65
    pub fn rgb_to_lab(&self, rgb: [u8; 3]) -> Lab {
        Lab::from_color(self.to_srgb(rgb))
    }

    /// Encode a Lab color in 8-bit channel units, rounded to whole levels
    pub fn lab_to_8bit(&self, lab: Lab) -> Lab8 {
        Lab8 {
            l: (lab.l * 255.0 / 100.0).round().clamp(0.0, 255.0),
            a: (lab.a + CHROMA_OFFSET).round().clamp(0.0, 255.0),
            b: (lab.b + CHROMA_OFFSET).round().clamp(0.0, 255.0),
        }
    }

    /// Convert RGB (0-255) to YUV in 8-bit channel units
    pub fn rgb_to_yuv(&self, rgb: [u8; 3]) -> Yuv8 {
        let [r, _, b] = rgb.map(f32::from);
        let y = self.luma(rgb);
        Yuv8 {
            y,
            u: (0.492 * (b - y) + CHROMA_OFFSET).clamp(0.0, 255.0),
            v: (0.877 * (r - y) + CHROMA_OFFSET).clamp(0.0, 255.0),
        }
    }

    /// BT.601 luma in [0, 255]
    pub fn luma(&self, rgb: [u8; 3]) -> f32 {
        LUMA_R * rgb[0] as f32 + LUMA_G * rgb[1] as f32 + LUMA_B * rgb[2] as f32
    }

    /// Grayscale raster using BT.601 weights
    pub fn to_grayscale(&self, image: &RgbImage) -> GrayImage {
        GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let luma = self.luma(image.get_pixel(x, y).0);
            Luma([luma.round().clamp(0.0, 255.0) as u8])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        let converter = ColorConverter::new();

        let red = converter.rgb_to_hsv([255, 0, 0]);
        assert!(red.h.abs() < 0.01);
        assert!((red.s - 255.0).abs() < 0.01);
        assert!((red.v - 255.0).abs() < 0.01);

        let green = converter.rgb_to_hsv([0, 255, 0]);
        assert!((green.h - 60.0).abs() < 0.01);

        let blue = converter.rgb_to_hsv([0, 0, 255]);
        assert!((blue.h - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_hsv_gray_has_no_hue_or_saturation() {
        let gray = ColorConverter::new().rgb_to_hsv([128, 128, 128]);
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert!((gray.v - 128.0).abs() < 0.01);
    }

    #[test]
    fn test_lab_white_and_black() {
        let converter = ColorConverter::new();

        let white = converter.lab_to_8bit(converter.rgb_to_lab([255, 255, 255]));
        assert_eq!(white.l, 255.0);
        assert_eq!(white.a, 128.0);
        assert_eq!(white.b, 128.0);

        let black = converter.lab_to_8bit(converter.rgb_to_lab([0, 0, 0]));
        assert!(black.l < 1.0);
    }

    #[test]
    fn test_lab_red_is_positive_a() {
        let converter = ColorConverter::new();
        let red = converter.lab_to_8bit(converter.rgb_to_lab([200, 30, 30]));
        assert!(red.a > 128.0);
    }

    #[test]
    fn test_yuv_gray_is_chroma_neutral() {
        let yuv = ColorConverter::new().rgb_to_yuv([100, 100, 100]);
        assert!((yuv.y - 100.0).abs() < 0.01);
        assert!((yuv.u - 128.0).abs() < 0.01);
        assert!((yuv.v - 128.0).abs() < 0.01);
    }

    #[test]
    fn test_yuv_blue_raises_u() {
        let yuv = ColorConverter::new().rgb_to_yuv([0, 0, 255]);
        assert!(yuv.u > 200.0);
    }

    #[test]
    fn test_grayscale_uses_bt601_weights() {
        let converter = ColorConverter::new();
        let image = RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]));
        let gray = converter.to_grayscale(&image);
        // 0.299 * 255 = 76.2
        assert_eq!(gray.get_pixel(1, 1).0[0], 76);
    }
}
