//! # Freshscan
//!
//! A Rust crate for assessing the freshness of food items from photographs.
//!
//! This library turns a single photo into donation guidance by:
//! - Running pluggable image classifiers and merging their predictions
//! - Rejecting images that do not show food, with a specific reason
//! - Extracting color-space and texture features and scoring freshness
//! - Grading quality, estimating shelf life, servings and donation fitness
//!
//! ## Example
//!
//! ```rust,no_run
//! use freshscan::{AssessmentConfig, FixedLabelClassifier, FreshnessAssessor, ImageClassifier};
//! use std::sync::Arc;
//!
//! let classifiers: Vec<Arc<dyn ImageClassifier>> =
//!     vec![Arc::new(FixedLabelClassifier::single("stub", "strawberry", 0.8))];
//! let assessor = FreshnessAssessor::from_config(AssessmentConfig::default(), classifiers)?;
//!
//! let payload = std::fs::read_to_string("photo.b64")?;
//! let result = assessor.assess_payload(&payload)?;
//! println!("{} - {} days", result.quality_grade, result.shelf_life_days);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod error;
pub mod image_loader;
pub mod pipeline;
pub mod scoring;

pub use catalog::{FoodCategory, FoodCategoryProfile};
pub use color::{FeatureExtractor, FeatureVector};
pub use config::AssessmentConfig;
pub use detection::{FixedLabelClassifier, ImageClassifier, Prediction};
pub use error::{AssessmentError, Result};
pub use image_loader::RawImage;
pub use pipeline::{BatchReport, BatchSummary, FreshnessAssessor, ServiceStatus};
pub use scoring::{ForestFreshnessModel, FreshnessModel, QualityGrade, ScorerMode};

/// A value from a stage that may have substituted a neutral default
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<T> {
    pub value: T,
    /// Why the stage fell back, if it did
    pub degraded: Option<String>,
}

impl<T> Estimate<T> {
    pub fn computed(value: T) -> Self {
        Self {
            value,
            degraded: None,
        }
    }

    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self {
            value,
            degraded: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Diagnostic numbers behind an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    /// Scorer output in [0, 1], 3 decimals
    pub freshness_ratio: f32,
    /// Sharpness score in [0, 100], 3 decimals
    pub texture_score: f32,
    /// Classifiers that contributed predictions
    pub models_used: Vec<String>,
    pub scorer_mode: ScorerMode,
    pub food_category: FoodCategory,
    /// Reasons for any stage that fell back to a default
    pub degraded_stages: Vec<String>,
}

/// Complete freshness assessment for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Freshness score in [20, 100], 1 decimal
    pub freshness_score: f32,
    pub quality_grade: QualityGrade,
    /// Grade with its badge, e.g. "⭐ Excellent"
    pub quality_badge: String,
    /// Estimated days the item stays consumable, in [1, 21]
    pub shelf_life_days: u32,
    /// Classifier confidence for the food label in percent, 1 decimal
    pub confidence: f32,
    pub donation_suitable: bool,
    /// At least 1
    pub estimated_servings: u32,
    /// Title-cased food label
    pub food_type: String,
    pub food_category: FoodCategory,
    /// Up to three "Label (xx.x%)" entries
    pub top_predictions: Vec<String>,
    pub recommendations: Vec<String>,
    pub analysis_details: AnalysisDetails,
    pub timestamp: DateTime<Utc>,
}

/// Round to a fixed number of decimals
pub(crate) fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// Title-case a classifier label, turning underscores into spaces
///
/// Every letter that follows a non-letter is upper-cased and the rest are
/// lower-cased, so "granny_smith" becomes "Granny Smith".
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_alpha = false;
    for c in label.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Render a prediction as "Label (xx.x%)"
pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "{} ({:.1}%)",
        title_case(&prediction.label),
        prediction.score * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("granny_smith"), "Granny Smith");
        assert_eq!(title_case("French_loaf"), "French Loaf");
        assert_eq!(title_case("HOT DOG"), "Hot Dog");
        assert_eq!(title_case("b&b"), "B&B");
    }

    #[test]
    fn test_format_prediction() {
        let p = Prediction::new("Granny_Smith", 0.91);
        assert_eq!(format_prediction(&p), "Granny Smith (91.0%)");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(72.34, 1), 72.3);
        assert_eq!(round_to(0.12345, 3), 0.123);
    }

    #[test]
    fn test_estimate_markers() {
        let ok = Estimate::computed(0.7);
        assert!(!ok.is_degraded());
        let fallback = Estimate::degraded(0.5, "empty raster");
        assert!(fallback.is_degraded());
        assert_eq!(fallback.degraded.as_deref(), Some("empty raster"));
    }

    #[test]
    fn test_assessment_result_serialization() {
        let result = AssessmentResult {
            freshness_score: 88.4,
            quality_grade: QualityGrade::Excellent,
            quality_badge: QualityGrade::Excellent.display(),
            shelf_life_days: 5,
            confidence: 62.0,
            donation_suitable: true,
            estimated_servings: 1,
            food_type: "Strawberry".to_string(),
            food_category: FoodCategory::Fruit,
            top_predictions: vec!["Strawberry (62.0%)".to_string()],
            recommendations: vec!["🌱 Help reduce food waste by sharing with community".to_string()],
            analysis_details: AnalysisDetails {
                freshness_ratio: 0.512,
                texture_score: 0.0,
                models_used: vec!["stub".to_string()],
                scorer_mode: ScorerMode::Learned,
                food_category: FoodCategory::Fruit,
                degraded_stages: Vec::new(),
            },
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"food_category\":\"fruit\""));
        assert!(json.contains("\"scorer_mode\":\"learned\""));

        let deserialized: AssessmentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }
}
