//! Freshness scorer
//!
//! Turns a feature vector into a freshness ratio in [0, 1]. A trained model
//! is used when one was injected; otherwise the scorer runs in degraded mode
//! on a fixed weighted sum. Failing feature extraction yields the neutral
//! ratio, so freshness uncertainty never fails an assessment.

use crate::color::{FeatureExtractor, FeatureVector};
use crate::config::AssessmentConfig;
use crate::image_loader::RawImage;
use crate::scoring::model::FreshnessModel;
use crate::Estimate;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which scoring path the scorer takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerMode {
    /// A trained model is available
    Learned,
    /// Fixed fallback weights only
    Degraded,
}

/// Freshness ratio scorer
#[derive(Clone)]
pub struct FreshnessScorer {
    extractor: FeatureExtractor,
    model: Option<Arc<dyn FreshnessModel>>,
    mode: ScorerMode,
    fallback_weights: Vec<f32>,
    neutral: f32,
}

impl std::fmt::Debug for FreshnessScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessScorer")
            .field("mode", &self.mode)
            .field("fallback_weights", &self.fallback_weights)
            .field("neutral", &self.neutral)
            .finish()
    }
}

impl FreshnessScorer {
    /// Create a scorer; the mode is `Learned` only for a trained model
    pub fn new(config: &AssessmentConfig, model: Option<Arc<dyn FreshnessModel>>) -> Self {
        let model = model.filter(|m| m.is_trained());
        let mode = if model.is_some() {
            ScorerMode::Learned
        } else {
            ScorerMode::Degraded
        };
        Self {
            extractor: FeatureExtractor::new(config.features.clone()),
            model,
            mode,
            fallback_weights: config.scoring.fallback_weights.clone(),
            neutral: config.scoring.neutral_freshness,
        }
    }

    pub fn mode(&self) -> ScorerMode {
        self.mode
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Weighted feature sum clamped to [0, 1]
    pub fn fallback_score(&self, features: &FeatureVector) -> f32 {
        let score = features.dot(&self.fallback_weights);
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            self.neutral
        }
    }

    /// Score a feature vector
    ///
    /// A model evaluation failure falls back to the weighted sum and marks
    /// the estimate degraded.
    pub fn score_features(&self, features: &FeatureVector) -> Estimate<f32> {
        let Some(model) = &self.model else {
            return Estimate::computed(self.fallback_score(features));
        };

        match model.predict_fresh_probability(features) {
            Ok(p) => Estimate::computed(p.clamp(0.0, 1.0)),
            Err(e) => {
                warn!("Freshness model failed, using fallback weights: {}", e);
                Estimate::degraded(self.fallback_score(features), e.to_string())
            }
        }
    }

    /// Extract features from an image and score them
    ///
    /// Degradation reasons from extraction and scoring are joined with "; ".
    pub fn assess(&self, image: &RawImage, gray: &GrayImage) -> Estimate<f32> {
        match self.extractor.extract_with_gray(image, gray) {
            Ok(features) => {
                let scored = self.score_features(&features.value);
                debug!(
                    ratio = scored.value,
                    mode = ?self.mode,
                    "Scored freshness"
                );
                let reasons: Vec<String> =
                    features.degraded.into_iter().chain(scored.degraded).collect();
                if reasons.is_empty() {
                    Estimate::computed(scored.value)
                } else {
                    Estimate::degraded(scored.value, reasons.join("; "))
                }
            }
            Err(e) => {
                warn!("{}; using neutral freshness {}", e, self.neutral);
                Estimate::degraded(self.neutral, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::features::FEATURE_COUNT;
    use crate::{AssessmentError, Result};
    use image::RgbImage;

    struct ConstantModel(f32);

    impl FreshnessModel for ConstantModel {
        fn predict_fresh_probability(&self, _features: &FeatureVector) -> Result<f32> {
            Ok(self.0)
        }

        fn is_trained(&self) -> bool {
            true
        }
    }

    struct BrokenModel;

    impl FreshnessModel for BrokenModel {
        fn predict_fresh_probability(&self, _features: &FeatureVector) -> Result<f32> {
            Err(AssessmentError::ModelUnavailable {
                reason: "feature count mismatch".to_string(),
            })
        }

        fn is_trained(&self) -> bool {
            true
        }
    }

    struct UntrainedModel;

    impl FreshnessModel for UntrainedModel {
        fn predict_fresh_probability(&self, _features: &FeatureVector) -> Result<f32> {
            Ok(1.0)
        }

        fn is_trained(&self) -> bool {
            false
        }
    }

    fn scorer(model: Option<Arc<dyn FreshnessModel>>) -> FreshnessScorer {
        FreshnessScorer::new(&AssessmentConfig::default(), model)
    }

    #[test]
    fn test_fallback_weights_on_ones() {
        let s = scorer(None);
        assert_eq!(s.mode(), ScorerMode::Degraded);
        let score = s.fallback_score(&FeatureVector::new([1.0; FEATURE_COUNT]));
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_fallback_weights_known_vector() {
        let s = scorer(None);
        let features = FeatureVector::new([0.5, 0.4, 1.0, 1.0, 0.1, 0.2, 0.8, 0.01, 0.5, 0.5]);
        // 0.075 + 0.06 + 0.15 + 0.1 + 0.01 + 0.02 + 0.08 + 0.0005 + 0.025 + 0.025
        let expected = 0.5455;
        assert!((s.fallback_score(&features) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_learned_model_is_used_and_clamped() {
        let s = scorer(Some(Arc::new(ConstantModel(1.7))));
        assert_eq!(s.mode(), ScorerMode::Learned);
        let estimate = s.score_features(&FeatureVector::new([0.0; FEATURE_COUNT]));
        assert_eq!(estimate.value, 1.0);
        assert!(!estimate.is_degraded());
    }

    #[test]
    fn test_model_failure_falls_back() {
        let s = scorer(Some(Arc::new(BrokenModel)));
        let features = FeatureVector::new([1.0; FEATURE_COUNT]);
        let estimate = s.score_features(&features);
        assert!((estimate.value - s.fallback_score(&features)).abs() < 1e-6);
        assert!(estimate.is_degraded());
    }

    #[test]
    fn test_untrained_model_means_degraded_mode() {
        let s = scorer(Some(Arc::new(UntrainedModel)));
        assert_eq!(s.mode(), ScorerMode::Degraded);
    }

    #[test]
    fn test_extraction_failure_returns_neutral() {
        let s = scorer(Some(Arc::new(ConstantModel(0.9))));
        let empty = RawImage::new(RgbImage::new(0, 0));
        let estimate = s.assess(&empty, &GrayImage::new(0, 0));
        assert_eq!(estimate.value, 0.5);
        assert!(estimate.is_degraded());
    }

    #[test]
    fn test_texture_and_model_degradation_are_both_reported() {
        let s = scorer(Some(Arc::new(BrokenModel)));
        let tiny = RawImage::uniform(2, [128, 128, 128]);
        let gray = s.extractor().converter().to_grayscale(tiny.pixels());
        let estimate = s.assess(&tiny, &gray);

        let reason = estimate.degraded.expect("both stages fell back");
        assert!(reason.contains("texture descriptor"));
        assert!(reason.contains("feature count mismatch"));
        assert!((0.0..=1.0).contains(&estimate.value));
    }

    #[test]
    fn test_assess_image_in_range() {
        let s = scorer(None);
        let image = RawImage::uniform(32, [190, 40, 50]);
        let gray = s.extractor().converter().to_grayscale(image.pixels());
        let estimate = s.assess(&image, &gray);
        assert!((0.0..=1.0).contains(&estimate.value));
        assert!(!estimate.is_degraded());
    }
}
