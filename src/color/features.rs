//! Color-space feature extraction
//!
//! Builds the ten-entry [`FeatureVector`] the freshness scorer works on.
//! Entries, in order:
//!
//! | # | Feature | Source |
//! |---|---------|--------|
//! | 0 | color variance | std(hue) / 180 |
//! | 1 | saturation mean | mean(S) / 255 |
//! | 2 | inverse brown ratio | 1 - share of a* > threshold |
//! | 3 | inverse dark-spot ratio | 1 - share of L* < threshold |
//! | 4 | edge density | share of Canny edge pixels |
//! | 5 | texture variance | std(gray) / 255 |
//! | 6 | inverse LBP spread | 1 - std(LBP) / 255 |
//! | 7 | color diversity | non-empty share of the hue × saturation histogram |
//! | 8 | brightness centeredness | target - abs(mean(V) / 255 - target) |
//! | 9 | chroma balance | mean(U) / 255 |
//!
//! Decay indicators (brown pixels, dark spots) are inverted so that higher
//! values always read as fresher. Every entry is clamped to [0, 1].

use crate::color::conversion::ColorConverter;
use crate::color::texture::{edge_map, local_binary_pattern};
use crate::config::FeatureConfig;
use crate::constants::features::{FEATURE_COUNT, HUE_RANGE};
use crate::image_loader::RawImage;
use crate::{AssessmentError, Estimate, Result};
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "color_variance",
    "saturation_mean",
    "inverse_brown_ratio",
    "inverse_dark_spots",
    "edge_density",
    "texture_variance",
    "lbp_uniformity",
    "color_diversity",
    "brightness_centeredness",
    "chroma_balance",
];

/// Fixed-order freshness features, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector, clamping every entry to [0, 1]
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values.map(|v| v.clamp(0.0, 1.0)))
    }

    pub fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    /// Weighted sum against a weight vector of matching length
    pub fn dot(&self, weights: &[f32]) -> f32 {
        self.0.iter().zip(weights).map(|(v, w)| v * w).sum()
    }

    pub fn color_variance(&self) -> f32 {
        self.0[0]
    }

    pub fn saturation_mean(&self) -> f32 {
        self.0[1]
    }

    pub fn edge_density(&self) -> f32 {
        self.0[4]
    }

    pub fn color_diversity(&self) -> f32 {
        self.0[7]
    }

    pub fn chroma_balance(&self) -> f32 {
        self.0[9]
    }
}

/// Population mean / standard deviation accumulator
#[derive(Default)]
struct ChannelStats {
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl ChannelStats {
    fn push(&mut self, value: f32) {
        let v = value as f64;
        self.sum += v;
        self.sum_sq += v * v;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    fn std(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// Extracts [`FeatureVector`]s from analysis rasters
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    converter: ColorConverter,
    config: FeatureConfig,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            converter: ColorConverter::new(),
            config,
        }
    }

    pub fn converter(&self) -> &ColorConverter {
        &self.converter
    }

    /// Extract features from an RGB raster
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::FeatureExtractionDegraded` if the raster is
    /// empty or a statistic comes out non-finite. A raster too small for the
    /// texture descriptor still yields features, marked degraded.
    pub fn extract(&self, image: &RawImage) -> Result<Estimate<FeatureVector>> {
        let gray = self.converter.to_grayscale(image.pixels());
        self.extract_with_gray(image, &gray)
    }

    /// Extract features when the grayscale raster is already available
    pub fn extract_with_gray(
        &self,
        image: &RawImage,
        gray: &GrayImage,
    ) -> Result<Estimate<FeatureVector>> {
        if image.is_empty() {
            return Err(AssessmentError::FeatureExtractionDegraded {
                reason: "empty raster".to_string(),
            });
        }
        if gray.dimensions() != image.pixels().dimensions() {
            return Err(AssessmentError::FeatureExtractionDegraded {
                reason: "grayscale raster does not match image".to_string(),
            });
        }

        let cfg = &self.config;
        let hue_bins = cfg.histogram_hue_bins;
        let sat_bins = cfg.histogram_saturation_bins;
        let mut histogram = vec![false; hue_bins * sat_bins];

        let mut hue = ChannelStats::default();
        let mut saturation = ChannelStats::default();
        let mut value = ChannelStats::default();
        let mut chroma_u = ChannelStats::default();
        let mut brown = 0usize;
        let mut dark = 0usize;

        for pixel in image.pixels().pixels() {
            let rgb = pixel.0;
            let hsv = self.converter.rgb_to_hsv(rgb);
            let lab = self.converter.lab_to_8bit(self.converter.rgb_to_lab(rgb));
            let yuv = self.converter.rgb_to_yuv(rgb);

            hue.push(hsv.h);
            saturation.push(hsv.s);
            value.push(hsv.v);
            chroma_u.push(yuv.u);

            if lab.a > cfg.brown_a_threshold {
                brown += 1;
            }
            if lab.l < cfg.dark_l_threshold {
                dark += 1;
            }

            let h_bin = ((hsv.h / HUE_RANGE * hue_bins as f32) as usize).min(hue_bins - 1);
            let s_bin = ((hsv.s / 256.0 * sat_bins as f32) as usize).min(sat_bins - 1);
            histogram[h_bin * sat_bins + s_bin] = true;
        }

        let total = image.pixel_count() as f32;

        let edges = edge_map(gray, cfg.canny_low_threshold, cfg.canny_high_threshold);
        let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();

        let mut intensity = ChannelStats::default();
        for p in gray.pixels() {
            intensity.push(p.0[0] as f32);
        }

        let lbp = local_binary_pattern(gray);
        if let Some(reason) = &lbp.degraded {
            warn!("LBP degraded, using intensity raster: {}", reason);
        }
        let mut lbp_stats = ChannelStats::default();
        for p in lbp.value.pixels() {
            lbp_stats.push(p.0[0] as f32);
        }

        let occupied = histogram.iter().filter(|&&bin| bin).count();
        let brightness = (value.mean() / 255.0) as f32;

        let raw = [
            hue.std() as f32 / HUE_RANGE,
            saturation.mean() as f32 / 255.0,
            1.0 - brown as f32 / total,
            1.0 - dark as f32 / total,
            edge_pixels as f32 / total,
            intensity.std() as f32 / 255.0,
            1.0 - lbp_stats.std() as f32 / 255.0,
            occupied as f32 / histogram.len() as f32,
            cfg.brightness_target - (brightness - cfg.brightness_target).abs(),
            chroma_u.mean() as f32 / 255.0,
        ];

        if let Some(i) = raw.iter().position(|v| !v.is_finite()) {
            return Err(AssessmentError::FeatureExtractionDegraded {
                reason: format!("{} is not finite", FEATURE_NAMES[i]),
            });
        }

        debug!(
            color_variance = raw[0],
            saturation_mean = raw[1],
            edge_density = raw[4],
            lbp_uniformity = raw[6],
            color_diversity = raw[7],
            "Extracted freshness features"
        );

        let features = FeatureVector::new(raw);
        Ok(match lbp.degraded {
            Some(reason) => Estimate::degraded(features, format!("texture descriptor: {}", reason)),
            None => Estimate::computed(features),
        })
    }
}
