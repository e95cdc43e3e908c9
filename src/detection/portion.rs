//! Portion size estimation from edge contours

use crate::color::texture::edge_map;
use crate::config::{FeatureConfig, QualityConfig};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::contour_area;

/// Estimates servings from the largest outer contour of the edge map
#[derive(Debug, Clone)]
pub struct PortionEstimator {
    canny_low: f32,
    canny_high: f32,
    serving_area: f64,
}

impl Default for PortionEstimator {
    fn default() -> Self {
        Self::new(&FeatureConfig::default(), &QualityConfig::default())
    }
}

impl PortionEstimator {
    pub fn new(features: &FeatureConfig, quality: &QualityConfig) -> Self {
        Self {
            canny_low: features.canny_low_threshold,
            canny_high: features.canny_high_threshold,
            serving_area: quality.serving_area,
        }
    }

    /// Estimated servings for a grayscale raster, at least 1
    pub fn estimate(&self, gray: &GrayImage) -> u32 {
        let edges = edge_map(gray, self.canny_low, self.canny_high);
        self.servings_from_edges(&edges)
    }

    /// Estimated servings for a binary edge map, at least 1
    pub fn servings_from_edges(&self, edges: &GrayImage) -> u32 {
        let area = largest_outer_contour_area(edges);
        ((area / self.serving_area).floor() as u32).max(1)
    }
}

/// Area of the largest top-level outer contour in a binary raster
pub fn largest_outer_contour_area(binary: &GrayImage) -> f64 {
    find_contours::<i32>(binary)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| contour_area(&c.points).abs())
        .fold(0.0, f64::max)
}
