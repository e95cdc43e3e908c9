//! Texture descriptors over grayscale rasters
//!
//! - Local binary pattern codes (radius 1, 8 samples)
//! - Laplacian sharpness score
//! - Canny edge map

use crate::constants::texture::{LBP_POINTS, LBP_RADIUS};
use crate::Estimate;
use image::{GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::laplacian_filter;
use std::f32::consts::PI;

/// Sample offsets (row, column) for the pattern, in bit order
fn sample_offsets() -> [(i64, i64); LBP_POINTS] {
    let radius = LBP_RADIUS as f32;
    std::array::from_fn(|k| {
        let angle = 2.0 * PI * k as f32 / LBP_POINTS as f32;
        (
            (radius * angle.cos()).round() as i64,
            (radius * angle.sin()).round() as i64,
        )
    })
}

/// Compute local binary pattern codes for a grayscale raster
///
/// Each interior pixel receives an 8-bit code: sample `k` contributes a 1
/// when its intensity is at least the center intensity, and the first
/// sample is the most significant bit. Border pixels stay 0.
///
/// Rasters too small to have an interior are returned unchanged with a
/// degradation marker so downstream statistics still have an input.
pub fn local_binary_pattern(gray: &GrayImage) -> Estimate<GrayImage> {
    let (width, height) = gray.dimensions();
    let border = LBP_RADIUS;
    if width <= 2 * border || height <= 2 * border {
        return Estimate::degraded(
            gray.clone(),
            format!("raster {}x{} has no interior for LBP", width, height),
        );
    }

    let offsets = sample_offsets();
    let mut codes = GrayImage::new(width, height);

    for y in border..height - border {
        for x in border..width - border {
            let center = gray.get_pixel(x, y).0[0];
            let mut code: u8 = 0;
            for &(dy, dx) in &offsets {
                let sy = (y as i64 + dy) as u32;
                let sx = (x as i64 + dx) as u32;
                let bit = (gray.get_pixel(sx, sy).0[0] >= center) as u8;
                code = (code << 1) | bit;
            }
            codes.put_pixel(x, y, Luma([code]));
        }
    }

    Estimate::computed(codes)
}

/// Sharpness score from the variance of the Laplacian response
///
/// The variance is divided by `scale` and capped at `cap`.
pub fn laplacian_sharpness(gray: &GrayImage, scale: f32, cap: f32) -> f32 {
    let response = laplacian_filter(gray);
    let count = response.pixels().len();
    if count == 0 {
        return 0.0;
    }

    let mean = response.pixels().map(|p| p.0[0] as f64).sum::<f64>() / count as f64;
    let variance = response
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count as f64;

    ((variance / scale as f64) as f32).min(cap)
}

/// Binary edge map (255 on edges) from hysteresis thresholds
pub fn edge_map(gray: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(gray, low, high)
}
