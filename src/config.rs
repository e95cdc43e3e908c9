//! Configuration structures for the freshness assessment pipeline.
//!
//! This module defines all tunable parameters for an assessment,
//! organized into logical groups for intake, feature extraction, gating,
//! ensembling, scoring and quality grading.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use freshscan::AssessmentConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = AssessmentConfig::from_json_file(Path::new("freshscan.json"))?;
//!
//! // Or use defaults
//! let config = AssessmentConfig::default();
//! # Ok::<(), freshscan::AssessmentError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`AnalysisConfig`]: payload validation and analysis resolution
//! - [`FeatureConfig`]: color-space thresholds, edge detector, histogram
//! - [`GateConfig`]: food / non-food decision thresholds
//! - [`EnsembleConfig`]: classifier time budget and top-k
//! - [`ScoringConfig`]: fallback weights and learned-model location
//! - [`QualityConfig`]: score formula, grades, shelf life and donation gate

use crate::catalog::FoodCategory;
use crate::constants::{analysis, ensemble, features, gate, quality, scoring, texture};
use crate::{AssessmentError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration for freshness assessment.
///
/// Every field has a default matching the reference constants, so a JSON
/// file only needs to carry the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Image intake configuration
    pub analysis: AnalysisConfig,

    /// Feature extraction configuration
    pub features: FeatureConfig,

    /// Food gate configuration
    pub gate: GateConfig,

    /// Classifier ensemble configuration
    pub ensemble: EnsembleConfig,

    /// Freshness scorer configuration
    pub scoring: ScoringConfig,

    /// Quality and shelf-life configuration
    pub quality: QualityConfig,
}

/// Image intake parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Side length of the square analysis raster
    pub resolution: u32,

    /// Minimum encoded payload length accepted
    pub min_payload_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            resolution: analysis::RESOLUTION,
            min_payload_len: analysis::MIN_PAYLOAD_LEN,
        }
    }
}

/// Color-space feature extraction parameters.
///
/// Channel thresholds use 8-bit channel units (see [`crate::constants::features`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// a* channel level above which a pixel counts as brown
    pub brown_a_threshold: f32,

    /// L* channel level below which a pixel counts as a dark spot
    pub dark_l_threshold: f32,

    /// Canny edge detection low threshold
    pub canny_low_threshold: f32,

    /// Canny edge detection high threshold
    pub canny_high_threshold: f32,

    /// Hue bins of the color-diversity histogram
    pub histogram_hue_bins: usize,

    /// Saturation bins of the color-diversity histogram
    pub histogram_saturation_bins: usize,

    /// Brightness the centeredness term peaks at
    pub brightness_target: f32,

    /// Laplacian variance divisor for the texture score
    pub sharpness_scale: f32,

    /// Upper bound of the texture score
    pub sharpness_cap: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            brown_a_threshold: features::BROWN_A_THRESHOLD,
            dark_l_threshold: features::DARK_L_THRESHOLD,
            canny_low_threshold: features::CANNY_LOW_THRESHOLD,
            canny_high_threshold: features::CANNY_HIGH_THRESHOLD,
            histogram_hue_bins: features::HISTOGRAM_HUE_BINS,
            histogram_saturation_bins: features::HISTOGRAM_SATURATION_BINS,
            brightness_target: features::BRIGHTNESS_TARGET,
            sharpness_scale: texture::SHARPNESS_SCALE,
            sharpness_cap: texture::SHARPNESS_CAP,
        }
    }
}

/// Food / non-food gate parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Predictions examined in the keyword pass
    pub keyword_window: usize,

    /// Score a keyword match must exceed
    pub keyword_threshold: f32,

    /// Predictions examined in the core-term pass
    pub core_term_window: usize,

    /// Score a core-term match must exceed
    pub core_term_threshold: f32,

    /// Score a non-food object must exceed to be reported
    pub non_food_object_threshold: f32,

    /// Skin-tone fraction above which a person is reported
    pub skin_ratio_threshold: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            keyword_window: gate::KEYWORD_WINDOW,
            keyword_threshold: gate::KEYWORD_THRESHOLD,
            core_term_window: gate::CORE_TERM_WINDOW,
            core_term_threshold: gate::CORE_TERM_THRESHOLD,
            non_food_object_threshold: gate::NON_FOOD_OBJECT_THRESHOLD,
            skin_ratio_threshold: gate::SKIN_RATIO_THRESHOLD,
        }
    }
}

/// Classifier ensemble parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Time budget for each classifier in milliseconds
    pub classifier_timeout_ms: u64,

    /// Predictions kept after merging
    pub top_k: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            classifier_timeout_ms: ensemble::CLASSIFIER_TIMEOUT_MS,
            top_k: ensemble::TOP_K,
        }
    }
}

/// Freshness scorer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weights of the deterministic fallback, one per feature
    pub fallback_weights: Vec<f32>,

    /// Freshness ratio used when features cannot be extracted
    pub neutral_freshness: f32,

    /// Where the learned model is loaded from (and saved to when created)
    pub model_path: Option<PathBuf>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fallback_weights: scoring::FALLBACK_WEIGHTS.to_vec(),
            neutral_freshness: scoring::NEUTRAL_FRESHNESS,
            model_path: Some(PathBuf::from("models/freshness_classifier.json")),
        }
    }
}

/// Per-category multipliers applied to the raw freshness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMultipliers {
    pub fruit: f32,
    pub vegetable: f32,
    pub cooked: f32,
    pub fast_food: f32,
    pub baked: f32,
    pub unknown: f32,
}

impl CategoryMultipliers {
    /// Multiplier for a food category
    pub fn for_category(&self, category: FoodCategory) -> f32 {
        match category {
            FoodCategory::Fruit => self.fruit,
            FoodCategory::Vegetable => self.vegetable,
            FoodCategory::Cooked => self.cooked,
            FoodCategory::FastFood => self.fast_food,
            FoodCategory::Baked => self.baked,
            FoodCategory::Unknown => self.unknown,
        }
    }
}

impl Default for CategoryMultipliers {
    fn default() -> Self {
        Self {
            fruit: quality::FRUIT_MULTIPLIER,
            vegetable: quality::NEUTRAL_MULTIPLIER,
            cooked: quality::COOKED_MULTIPLIER,
            fast_food: quality::FAST_FOOD_MULTIPLIER,
            baked: quality::NEUTRAL_MULTIPLIER,
            unknown: quality::NEUTRAL_MULTIPLIER,
        }
    }
}

/// Inclusive lower bounds of each quality grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub excellent: f32,
    pub good: f32,
    pub fair: f32,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            excellent: quality::EXCELLENT_THRESHOLD,
            good: quality::GOOD_THRESHOLD,
            fair: quality::FAIR_THRESHOLD,
        }
    }
}

/// Quality score, shelf-life and donation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Weight of the freshness ratio in the raw score
    pub freshness_weight: f32,

    /// Weight of the texture score in the raw score
    pub texture_weight: f32,

    /// Weight of the boosted classifier confidence in the raw score
    pub confidence_weight: f32,

    /// Confidence multiplier applied before capping at 1
    pub confidence_boost: f32,

    /// Lower bound of the freshness score
    pub score_min: f32,

    /// Upper bound of the freshness score
    pub score_max: f32,

    /// Per-category multipliers
    pub multipliers: CategoryMultipliers,

    /// Grade boundaries
    pub grades: GradeThresholds,

    /// Minimum freshness score for donation
    pub donation_min_score: f32,

    /// Minimum shelf life in days for donation
    pub donation_min_shelf_days: u32,

    /// Shelf-life clamp in days
    pub shelf_life_min_days: u32,
    pub shelf_life_max_days: u32,

    /// Contour area making up one serving
    pub serving_area: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            freshness_weight: quality::FRESHNESS_WEIGHT,
            texture_weight: quality::TEXTURE_WEIGHT,
            confidence_weight: quality::CONFIDENCE_WEIGHT,
            confidence_boost: quality::CONFIDENCE_BOOST,
            score_min: quality::SCORE_MIN,
            score_max: quality::SCORE_MAX,
            multipliers: CategoryMultipliers::default(),
            grades: GradeThresholds::default(),
            donation_min_score: quality::DONATION_MIN_SCORE,
            donation_min_shelf_days: quality::DONATION_MIN_SHELF_DAYS,
            shelf_life_min_days: quality::SHELF_LIFE_MIN_DAYS,
            shelf_life_max_days: quality::SHELF_LIFE_MAX_DAYS,
            serving_area: quality::SERVING_AREA,
        }
    }
}

impl AssessmentConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssessmentError::config(format!("Cannot read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AssessmentError::config(format!("Cannot parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssessmentError::config("Cannot serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AssessmentError::config(format!("Cannot write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.analysis.resolution < 3 {
            return Err(AssessmentError::invalid_parameter(
                "analysis.resolution",
                self.analysis.resolution,
            ));
        }
        if self.scoring.fallback_weights.len() != features::FEATURE_COUNT {
            return Err(AssessmentError::invalid_parameter(
                "scoring.fallback_weights.len",
                self.scoring.fallback_weights.len(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scoring.neutral_freshness) {
            return Err(AssessmentError::invalid_parameter(
                "scoring.neutral_freshness",
                self.scoring.neutral_freshness,
            ));
        }
        if self.features.histogram_hue_bins == 0 || self.features.histogram_saturation_bins == 0 {
            return Err(AssessmentError::invalid_parameter(
                "features.histogram_bins",
                format!(
                    "{}x{}",
                    self.features.histogram_hue_bins, self.features.histogram_saturation_bins
                ),
            ));
        }
        if self.features.sharpness_scale <= 0.0 {
            return Err(AssessmentError::invalid_parameter(
                "features.sharpness_scale",
                self.features.sharpness_scale,
            ));
        }
        if self.ensemble.top_k == 0 {
            return Err(AssessmentError::invalid_parameter("ensemble.top_k", 0));
        }

        let quality = &self.quality;
        if quality.score_min > quality.score_max {
            return Err(AssessmentError::invalid_parameter(
                "quality.score_min",
                quality.score_min,
            ));
        }
        let grades = &quality.grades;
        if !(grades.fair < grades.good && grades.good < grades.excellent) {
            return Err(AssessmentError::invalid_parameter(
                "quality.grades",
                format!("{}/{}/{}", grades.excellent, grades.good, grades.fair),
            ));
        }
        if quality.shelf_life_min_days == 0 || quality.shelf_life_min_days > quality.shelf_life_max_days
        {
            return Err(AssessmentError::invalid_parameter(
                "quality.shelf_life_min_days",
                quality.shelf_life_min_days,
            ));
        }
        if quality.serving_area <= 0.0 {
            return Err(AssessmentError::invalid_parameter(
                "quality.serving_area",
                quality.serving_area,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AssessmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.resolution, 224);
        assert_eq!(config.scoring.fallback_weights.len(), 10);
        assert_eq!(config.quality.grades.excellent, 85.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{ "quality": { "donation_min_score": 65.0 } }"#;
        let config: AssessmentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.quality.donation_min_score, 65.0);
        assert_eq!(config.quality.shelf_life_max_days, 21);
        assert_eq!(config.gate.keyword_threshold, 0.3);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AssessmentConfig::default();
        config.ensemble.classifier_timeout_ms = 250;
        config.to_json_file(&path).unwrap();

        let loaded = AssessmentConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_wrong_weight_count() {
        let mut config = AssessmentConfig::default();
        config.scoring.fallback_weights = vec![0.5, 0.5];
        assert!(matches!(
            config.validate(),
            Err(AssessmentError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unordered_grades() {
        let mut config = AssessmentConfig::default();
        config.quality.grades.good = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AssessmentConfig::from_json_file(Path::new("/nonexistent/freshscan.json"));
        assert!(matches!(result, Err(AssessmentError::Config { .. })));
    }

    #[test]
    fn test_category_multiplier_lookup() {
        let multipliers = CategoryMultipliers::default();
        assert_eq!(multipliers.for_category(FoodCategory::Fruit), 1.1);
        assert_eq!(multipliers.for_category(FoodCategory::FastFood), 0.8);
        assert_eq!(multipliers.for_category(FoodCategory::Unknown), 1.0);
    }
}
