//! Food / non-food gate
//!
//! Decides from ranked classifier predictions whether an image shows food.
//! The decision runs in three stages:
//!
//! 1. Keyword pass: the top predictions are matched against the food
//!    vocabulary, skipping labels on the scene denylist.
//! 2. Core-term pass: a shorter window is matched against a stricter
//!    vocabulary with a higher score threshold.
//! 3. Rejection reason: when both passes fail, look for a confidently
//!    predicted non-food object, then for dominant skin-tone pixels.
//!
//! All label matching is case-insensitive substring matching with
//! underscores read as spaces.

use crate::catalog::normalize_label;
use crate::color::ColorConverter;
use crate::config::GateConfig;
use crate::constants::gate::{
    CORE_FOOD_TERMS, FOOD_KEYWORDS, NON_FOOD_DENYLIST, NON_FOOD_OBJECTS, SKIN_DETECTED_LABEL,
    SKIN_HUE_MAX, SKIN_SATURATION_MIN, SKIN_VALUE_MIN,
};
use crate::detection::ensemble::Prediction;
use crate::image_loader::RawImage;
use tracing::debug;

/// Accepted food label and its classifier score
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDetection {
    pub label: String,
    pub score: f32,
}

/// Gate verdict for one image
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Food detected
    Food(FoodDetection),
    /// Nothing food-like; carries the top predicted label
    NotFood { detected: String },
    /// A specific non-food object or human skin was identified
    NonFoodObject { object: String },
}

fn matches_any(label: &str, vocabulary: &[&str]) -> bool {
    vocabulary.iter().any(|word| label.contains(word))
}

/// Food / non-food decision maker
#[derive(Debug, Clone, Default)]
pub struct FoodGate {
    config: GateConfig,
    converter: ColorConverter,
}

impl FoodGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            converter: ColorConverter::new(),
        }
    }

    /// Run both food passes over ranked predictions
    pub fn detect_food(&self, predictions: &[Prediction]) -> Option<FoodDetection> {
        let cfg = &self.config;

        for p in predictions.iter().take(cfg.keyword_window) {
            let label = normalize_label(&p.label);
            if matches_any(&label, NON_FOOD_DENYLIST) {
                debug!(label = %p.label, "Skipping denylisted label");
                continue;
            }
            if matches_any(&label, FOOD_KEYWORDS) && p.score > cfg.keyword_threshold {
                return Some(FoodDetection {
                    label: p.label.clone(),
                    score: p.score,
                });
            }
        }

        predictions
            .iter()
            .take(cfg.core_term_window)
            .find(|p| {
                matches_any(&normalize_label(&p.label), CORE_FOOD_TERMS)
                    && p.score > cfg.core_term_threshold
            })
            .map(|p| FoodDetection {
                label: p.label.clone(),
                score: p.score,
            })
    }

    /// Name the non-food object behind a rejection, if one can be identified
    pub fn identify_non_food(&self, image: &RawImage, predictions: &[Prediction]) -> Option<String> {
        let cfg = &self.config;

        let object = predictions.iter().take(cfg.keyword_window).find(|p| {
            matches_any(&normalize_label(&p.label), NON_FOOD_OBJECTS)
                && p.score > cfg.non_food_object_threshold
        });
        if let Some(p) = object {
            return Some(p.label.clone());
        }

        let ratio = self.skin_ratio(image);
        debug!(skin_ratio = ratio, "Skin-tone check");
        if ratio > cfg.skin_ratio_threshold {
            return Some(SKIN_DETECTED_LABEL.to_string());
        }
        None
    }

    /// Share of pixels inside the skin-tone HSV box
    pub fn skin_ratio(&self, image: &RawImage) -> f32 {
        if image.is_empty() {
            return 0.0;
        }
        let skin = image
            .pixels()
            .pixels()
            .filter(|p| {
                let hsv = self.converter.rgb_to_hsv(p.0);
                hsv.h.round() <= SKIN_HUE_MAX
                    && hsv.s.round() >= SKIN_SATURATION_MIN
                    && hsv.v.round() >= SKIN_VALUE_MIN
            })
            .count();
        skin as f32 / image.pixel_count() as f32
    }

    /// Full gate decision
    pub fn evaluate(&self, image: &RawImage, predictions: &[Prediction]) -> GateDecision {
        if let Some(food) = self.detect_food(predictions) {
            return GateDecision::Food(food);
        }
        if let Some(object) = self.identify_non_food(image, predictions) {
            return GateDecision::NonFoodObject { object };
        }
        GateDecision::NotFood {
            detected: predictions
                .first()
                .map(|p| p.label.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(pairs: &[(&str, f32)]) -> Vec<Prediction> {
        pairs.iter().map(|(l, s)| Prediction::new(*l, *s)).collect()
    }

    fn neutral_image() -> RawImage {
        RawImage::uniform(16, [40, 90, 200])
    }

    #[test]
    fn test_keyword_match_above_threshold() {
        let gate = FoodGate::default();
        let found = gate.detect_food(&preds(&[("strawberry", 0.62)])).unwrap();
        assert_eq!(found.label, "strawberry");
        assert_eq!(found.score, 0.62);
    }

    #[test]
    fn test_denylisted_label_is_skipped() {
        let gate = FoodGate::default();
        let found = gate
            .detect_food(&preds(&[("theater_curtain", 0.8), ("French_loaf_bread", 0.4)]))
            .unwrap();
        assert_eq!(found.label, "French_loaf_bread");
    }

    #[test]
    fn test_keyword_beyond_window_is_ignored() {
        let gate = FoodGate::default();
        let predictions = preds(&[("stage", 0.2), ("chair", 0.2), ("desk", 0.2), ("pizza", 0.9)]);
        assert!(gate.detect_food(&predictions).is_none());
    }

    #[test]
    fn test_low_score_keyword_is_not_food() {
        let gate = FoodGate::default();
        assert!(gate.detect_food(&preds(&[("strawberry", 0.25)])).is_none());
        assert!(gate.detect_food(&preds(&[("cheeseburger", 0.3)])).is_none());
    }

    #[test]
    fn test_core_term_pass_ignores_denylist() {
        // Skipped in the keyword pass, accepted by the stricter second pass
        let gate = FoodGate::default();
        let found = gate.detect_food(&preds(&[("stage_pizza", 0.6)])).unwrap();
        assert_eq!(found.label, "stage_pizza");

        assert!(gate.detect_food(&preds(&[("stage_pizza", 0.45)])).is_none());
    }

    #[test]
    fn test_underscored_keyword_matches() {
        let gate = FoodGate::default();
        let found = gate.detect_food(&preds(&[("hot_dog", 0.5)])).unwrap();
        assert_eq!(found.label, "hot_dog");
    }

    #[test]
    fn test_non_food_object_reported() {
        let gate = FoodGate::default();
        let decision = gate.evaluate(&neutral_image(), &preds(&[("soup_plate", 0.2), ("plate", 0.7)]));
        // "soup plate" is a food keyword but below threshold
        assert_eq!(
            decision,
            GateDecision::NonFoodObject {
                object: "plate".to_string()
            }
        );
    }

    #[test]
    fn test_skin_tone_image_reported() {
        let gate = FoodGate::default();
        let skin = RawImage::uniform(16, [220, 170, 140]);
        assert!(gate.skin_ratio(&skin) > 0.99);

        let decision = gate.evaluate(&skin, &preds(&[("plate", 0.4)]));
        assert_eq!(
            decision,
            GateDecision::NonFoodObject {
                object: "human_skin_detected".to_string()
            }
        );
    }

    #[test]
    fn test_not_food_carries_top_label() {
        let gate = FoodGate::default();
        let decision = gate.evaluate(&neutral_image(), &preds(&[("theater_curtain", 0.9)]));
        assert_eq!(
            decision,
            GateDecision::NotFood {
                detected: "theater_curtain".to_string()
            }
        );
        assert_eq!(gate.skin_ratio(&neutral_image()), 0.0);
    }
}
