//! Freshness assessment service
//!
//! [`FreshnessAssessor`] owns every stage of the pipeline and the shared,
//! read-only state (classifiers, freshness model, configuration). Each
//! assessment is independent: the assessor holds no per-call state and can
//! be shared across threads.
//!
//! Stage order for one image:
//!
//! 1. Ensemble: run classifiers, merge predictions
//! 2. Gate: accept food, or reject with a reason
//! 3. Scorer: features → freshness ratio (neutral on failure)
//! 4. Texture sharpness and portion estimate
//! 5. Quality engine and recommendations

use crate::catalog::FOOD_PROFILES;
use crate::color::texture::laplacian_sharpness;
use crate::color::ColorConverter;
use crate::config::AssessmentConfig;
use crate::constants::gate::FOOD_KEYWORDS;
use crate::detection::{EnsembleAggregator, FoodGate, GateDecision, ImageClassifier, PortionEstimator};
use crate::image_loader::{decode_payload, encode_payload, RawImage};
use crate::scoring::{
    ForestFreshnessModel, FreshnessModel, FreshnessScorer, QualityEngine,
    RecommendationGenerator, ScorerMode,
};
use crate::{
    format_prediction, round_to, title_case, AnalysisDetails, AssessmentError, AssessmentResult,
    Result,
};
use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::Serialize;
use serde_json::{json, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Gray level of the self-test image
const SELF_TEST_GRAY: u8 = 128;

/// Predictions shown in a result
const DISPLAYED_PREDICTIONS: usize = 3;

/// Counts for a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Per-image outcomes of a batch, in input order
#[derive(Debug)]
pub struct BatchReport {
    pub results: Vec<Result<AssessmentResult>>,
    pub summary: BatchSummary,
}

impl BatchReport {
    /// JSON view: failed slots carry `{"error": <user message>}`
    pub fn to_json(&self) -> Value {
        let data: Vec<Value> = self
            .results
            .iter()
            .map(|r| match r {
                Ok(result) => serde_json::to_value(result)
                    .unwrap_or_else(|e| json!({ "error": e.to_string() })),
                Err(e) => json!({ "error": e.user_message() }),
            })
            .collect();
        json!({ "data": data, "summary": self.summary })
    }
}

/// Readiness report of an assessor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    /// Registered classifier names
    pub classifiers: Vec<String>,
    /// At least one classifier is registered
    pub ensemble_ready: bool,
    pub scorer_mode: ScorerMode,
    pub food_keywords_count: usize,
    pub food_categories_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Freshness assessment service
pub struct FreshnessAssessor {
    config: AssessmentConfig,
    classifiers: Vec<Arc<dyn ImageClassifier>>,
    converter: ColorConverter,
    ensemble: EnsembleAggregator,
    gate: FoodGate,
    scorer: FreshnessScorer,
    quality: QualityEngine,
    portions: PortionEstimator,
    recommendations: RecommendationGenerator,
}

impl std::fmt::Debug for FreshnessAssessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessAssessor")
            .field(
                "classifiers",
                &self.classifiers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("scorer", &self.scorer)
            .finish()
    }
}

impl FreshnessAssessor {
    /// Create an assessor from explicit parts
    ///
    /// Without a trained `model` the scorer runs in degraded mode.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::InvalidParameter` if the configuration is invalid.
    pub fn new(
        config: AssessmentConfig,
        classifiers: Vec<Arc<dyn ImageClassifier>>,
        model: Option<Arc<dyn FreshnessModel>>,
    ) -> Result<Self> {
        config.validate()?;

        let scorer = FreshnessScorer::new(&config, model);
        info!(
            classifiers = classifiers.len(),
            scorer_mode = ?scorer.mode(),
            "Freshness assessor ready"
        );

        Ok(Self {
            converter: ColorConverter::new(),
            ensemble: EnsembleAggregator::new(&config.ensemble),
            gate: FoodGate::new(config.gate.clone()),
            quality: QualityEngine::new(config.quality.clone()),
            portions: PortionEstimator::new(&config.features, &config.quality),
            recommendations: RecommendationGenerator::new(),
            scorer,
            classifiers,
            config,
        })
    }

    /// Create an assessor, loading or training the freshness model
    ///
    /// The model is read from `scoring.model_path`; a missing or corrupt
    /// file is replaced by a freshly trained default. If no model can be
    /// produced the assessor starts in degraded mode.
    pub fn from_config(
        config: AssessmentConfig,
        classifiers: Vec<Arc<dyn ImageClassifier>>,
    ) -> Result<Self> {
        let model: Option<Arc<dyn FreshnessModel>> =
            match ForestFreshnessModel::load_or_create(config.scoring.model_path.as_deref()) {
                Ok(model) => Some(Arc::new(model)),
                Err(e) => {
                    warn!("Freshness model unavailable, scoring with fallback weights: {}", e);
                    None
                }
            };
        Self::new(config, classifiers, model)
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    pub fn scorer_mode(&self) -> ScorerMode {
        self.scorer.mode()
    }

    /// Assess a base64 image payload
    pub fn assess_payload(&self, payload: &str) -> Result<AssessmentResult> {
        let image = decode_payload(
            payload,
            self.config.analysis.resolution,
            self.config.analysis.min_payload_len,
        )?;
        self.assess(&image)
    }

    /// Assess a decoded analysis raster
    ///
    /// # Errors
    ///
    /// - `NoClassifierOutput` if no classifier produced predictions
    /// - `NonFoodObjectDetected` / `NotFood` if the gate rejects the image
    /// - `UnexpectedAssessmentFailure` if a stage panics
    pub fn assess(&self, image: &RawImage) -> Result<AssessmentResult> {
        catch_unwind(AssertUnwindSafe(|| self.run_stages(image))).unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown failure".to_string());
            warn!("Assessment aborted: {}", message);
            Err(AssessmentError::UnexpectedAssessmentFailure { message })
        })
    }

    fn run_stages(&self, image: &RawImage) -> Result<AssessmentResult> {
        let outcome = self.ensemble.run(&self.classifiers, image);
        if outcome.predictions.is_empty() {
            return Err(AssessmentError::NoClassifierOutput);
        }
        debug!(
            top = ?outcome
                .predictions
                .iter()
                .take(DISPLAYED_PREDICTIONS)
                .map(|p| (p.label.as_str(), round_to(p.score, 3)))
                .collect::<Vec<_>>(),
            "Top predictions"
        );

        let food = match self.gate.evaluate(image, &outcome.predictions) {
            GateDecision::Food(food) => food,
            GateDecision::NonFoodObject { object } => {
                info!(object = %object, "Rejected non-food object");
                return Err(AssessmentError::NonFoodObjectDetected { object });
            }
            GateDecision::NotFood { detected } => {
                info!(detected = %detected, "No food detected");
                return Err(AssessmentError::NotFood { detected });
            }
        };
        info!(label = %food.label, confidence = round_to(food.score, 3), "Food detected");

        let gray = self.converter.to_grayscale(image.pixels());
        let freshness = self.scorer.assess(image, &gray);
        let texture_score = laplacian_sharpness(
            &gray,
            self.config.features.sharpness_scale,
            self.config.features.sharpness_cap,
        );
        let servings = self.portions.estimate(&gray);
        debug!(
            freshness = round_to(freshness.value, 3),
            texture = round_to(texture_score, 3),
            servings,
            "Analysis scores"
        );

        let quality = self
            .quality
            .assess(freshness.value, texture_score, food.score, &food.label);
        let recommendations = self.recommendations.generate(&quality, &food.label);

        let result = AssessmentResult {
            freshness_score: round_to(quality.freshness_score, 1),
            quality_grade: quality.quality_grade,
            quality_badge: quality.quality_grade.display(),
            shelf_life_days: quality.shelf_life_days,
            confidence: round_to(food.score * 100.0, 1),
            donation_suitable: quality.donation_suitable,
            estimated_servings: servings,
            food_type: title_case(&food.label),
            food_category: quality.category(),
            top_predictions: outcome
                .predictions
                .iter()
                .take(DISPLAYED_PREDICTIONS)
                .map(format_prediction)
                .collect(),
            recommendations,
            analysis_details: AnalysisDetails {
                freshness_ratio: round_to(freshness.value, 3),
                texture_score: round_to(texture_score, 3),
                models_used: outcome.models_used,
                scorer_mode: self.scorer.mode(),
                food_category: quality.category(),
                degraded_stages: freshness.degraded.into_iter().collect(),
            },
            timestamp: Utc::now(),
        };

        info!(
            "Assessment complete: {} ({:.1}%)",
            result.quality_grade, result.freshness_score
        );
        Ok(result)
    }

    /// Assess several payloads in order
    ///
    /// A failing image only fills its own slot.
    pub fn assess_batch<S: AsRef<str>>(&self, payloads: &[S]) -> BatchReport {
        let total = payloads.len();
        let results: Vec<Result<AssessmentResult>> = payloads
            .iter()
            .enumerate()
            .map(|(i, payload)| {
                info!("Processing image {}/{}", i + 1, total);
                let result = self.assess_payload(payload.as_ref());
                if let Err(e) = &result {
                    warn!("Image {} failed: {}", i + 1, e);
                }
                result
            })
            .collect();

        let successful = results.iter().filter(|r| r.is_ok()).count();
        BatchReport {
            summary: BatchSummary {
                total,
                successful,
                failed: total - successful,
            },
            results,
        }
    }

    /// Readiness report
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            classifiers: self.classifiers.iter().map(|c| c.name().to_string()).collect(),
            ensemble_ready: !self.classifiers.is_empty(),
            scorer_mode: self.scorer.mode(),
            food_keywords_count: FOOD_KEYWORDS.len(),
            food_categories_count: FOOD_PROFILES.len(),
            timestamp: Utc::now(),
        }
    }

    /// Assess a synthetic uniform gray image end to end
    ///
    /// The payload goes through the same decode path as client uploads.
    pub fn self_test(&self) -> Result<AssessmentResult> {
        let side = self.config.analysis.resolution;
        let image = RgbImage::from_pixel(side, side, image::Rgb([SELF_TEST_GRAY; 3]));
        let payload = encode_payload(&image)?;
        self.assess_payload(&payload)
    }
}
