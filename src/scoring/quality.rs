//! Quality score, grade, shelf life and donation eligibility
//!
//! ```text
//! boost = min(1, confidence · confidence_boost)
//! raw   = ratio · freshness_weight + texture · texture_weight + boost · confidence_weight
//! score = clamp(raw · category_multiplier, score_min, score_max)
//! shelf = clamp(round(base_shelf_days · score / 100 · freshness_factor), min_days, max_days)
//! ```

use crate::catalog::{match_profile, FoodCategory, FoodCategoryProfile};
use crate::config::QualityConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Discrete quality grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityGrade {
    pub fn label(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "Excellent",
            QualityGrade::Good => "Good",
            QualityGrade::Fair => "Fair",
            QualityGrade::Poor => "Poor",
        }
    }

    /// Display emoji for the grade
    pub fn badge(&self) -> &'static str {
        match self {
            QualityGrade::Excellent => "⭐",
            QualityGrade::Good => "✅",
            QualityGrade::Fair => "⚡",
            QualityGrade::Poor => "⚠️",
        }
    }

    /// Badge and label, e.g. "⭐ Excellent"
    pub fn display(&self) -> String {
        format!("{} {}", self.badge(), self.label())
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the quality engine for one food item
#[derive(Debug, Clone, PartialEq)]
pub struct QualityAssessment {
    /// Freshness score in [score_min, score_max]
    pub freshness_score: f32,
    pub quality_grade: QualityGrade,
    pub shelf_life_days: u32,
    pub donation_suitable: bool,
    /// Reference profile matched from the food label
    pub profile: FoodCategoryProfile,
}

impl QualityAssessment {
    pub fn category(&self) -> FoodCategory {
        self.profile.category
    }
}

/// Computes scores, grades and shelf life
#[derive(Debug, Clone, Default)]
pub struct QualityEngine {
    config: QualityConfig,
}

impl QualityEngine {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Bounded freshness score
    ///
    /// # Arguments
    ///
    /// * `freshness_ratio` - scorer output in [0, 1]
    /// * `texture_score` - sharpness score in [0, 100]
    /// * `confidence` - classifier score of the food label in [0, 1]
    /// * `category` - category selecting the multiplier
    pub fn freshness_score(
        &self,
        freshness_ratio: f32,
        texture_score: f32,
        confidence: f32,
        category: FoodCategory,
    ) -> f32 {
        let cfg = &self.config;
        let boost = (confidence * cfg.confidence_boost).min(1.0);
        let raw = freshness_ratio * cfg.freshness_weight
            + texture_score * cfg.texture_weight
            + boost * cfg.confidence_weight;
        let adjusted = raw * cfg.multipliers.for_category(category);

        if !adjusted.is_finite() {
            return cfg.score_min;
        }
        adjusted.clamp(cfg.score_min, cfg.score_max)
    }

    /// Shelf life in days for a score and profile
    pub fn shelf_life_days(&self, freshness_score: f32, profile: &FoodCategoryProfile) -> u32 {
        let cfg = &self.config;
        let days = (profile.base_shelf_days as f32 * (freshness_score / 100.0) * profile.freshness_factor)
            .round();
        let days = if days.is_finite() && days > 0.0 { days as u32 } else { 0 };
        days.clamp(cfg.shelf_life_min_days, cfg.shelf_life_max_days)
    }

    /// Grade for a score (inclusive lower bounds)
    pub fn grade(&self, freshness_score: f32) -> QualityGrade {
        let grades = &self.config.grades;
        if freshness_score >= grades.excellent {
            QualityGrade::Excellent
        } else if freshness_score >= grades.good {
            QualityGrade::Good
        } else if freshness_score >= grades.fair {
            QualityGrade::Fair
        } else {
            QualityGrade::Poor
        }
    }

    pub fn is_donation_suitable(&self, freshness_score: f32, shelf_life_days: u32) -> bool {
        freshness_score >= self.config.donation_min_score
            && shelf_life_days >= self.config.donation_min_shelf_days
    }

    /// Full quality assessment for a detected food label
    pub fn assess(
        &self,
        freshness_ratio: f32,
        texture_score: f32,
        confidence: f32,
        food_label: &str,
    ) -> QualityAssessment {
        let profile = *match_profile(food_label);
        let freshness_score =
            self.freshness_score(freshness_ratio, texture_score, confidence, profile.category);
        let shelf_life_days = self.shelf_life_days(freshness_score, &profile);
        let quality_grade = self.grade(freshness_score);
        let donation_suitable = self.is_donation_suitable(freshness_score, shelf_life_days);

        debug!(
            label = food_label,
            profile = profile.key,
            score = freshness_score,
            shelf_life_days,
            "Quality assessed"
        );

        QualityAssessment {
            freshness_score,
            quality_grade,
            shelf_life_days,
            donation_suitable,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_PROFILE;

    #[test]
    fn test_score_formula_without_texture() {
        let engine = QualityEngine::default();
        // 0.6·50 + 0 + min(1, 0.3·2)·25 = 30 + 15 = 45
        let score = engine.freshness_score(0.6, 0.0, 0.3, FoodCategory::Unknown);
        assert!((score - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_category_multipliers() {
        let engine = QualityEngine::default();
        let fruit = engine.freshness_score(0.6, 0.0, 0.3, FoodCategory::Fruit);
        let fast_food = engine.freshness_score(0.6, 0.0, 0.3, FoodCategory::FastFood);
        assert!((fruit - 49.5).abs() < 1e-4);
        assert!((fast_food - 36.0).abs() < 1e-4);
    }

    #[test]
    fn test_score_is_clamped() {
        let engine = QualityEngine::default();
        assert_eq!(engine.freshness_score(0.0, 0.0, 0.0, FoodCategory::Baked), 20.0);
        assert_eq!(engine.freshness_score(1.0, 100.0, 1.0, FoodCategory::Fruit), 100.0);
        assert_eq!(engine.freshness_score(f32::NAN, 0.0, 0.0, FoodCategory::Fruit), 20.0);
    }

    #[test]
    fn test_grade_boundaries_are_inclusive() {
        let engine = QualityEngine::default();
        assert_eq!(engine.grade(85.0), QualityGrade::Excellent);
        assert_eq!(engine.grade(84.999), QualityGrade::Good);
        assert_eq!(engine.grade(84.9), QualityGrade::Good);
        assert_eq!(engine.grade(70.0), QualityGrade::Good);
        assert_eq!(engine.grade(50.0), QualityGrade::Fair);
        assert_eq!(engine.grade(49.9), QualityGrade::Poor);
    }

    #[test]
    fn test_shelf_life_rounding_and_clamp() {
        let engine = QualityEngine::default();
        let strawberry = match_profile("strawberry");
        // 3 · 0.9 · 2.0 = 5.4 → 5
        assert_eq!(engine.shelf_life_days(90.0, strawberry), 5);
        // 3 · 0.95 · 2.0 = 5.7 → 6
        assert_eq!(engine.shelf_life_days(95.0, strawberry), 6);

        let burger = match_profile("burger");
        // 1 · 0.2 · 1.5 = 0.3 → 0 → clamped to 1
        assert_eq!(engine.shelf_life_days(20.0, burger), 1);

        let carrot = match_profile("carrot");
        assert_eq!(engine.shelf_life_days(100.0, carrot), 11);
    }

    #[test]
    fn test_shelf_life_upper_clamp() {
        let engine = QualityEngine::default();
        let long_lived = FoodCategoryProfile {
            key: "honey",
            base_shelf_days: 60,
            freshness_factor: 1.0,
            category: FoodCategory::Unknown,
        };
        assert_eq!(engine.shelf_life_days(100.0, &long_lived), 21);
    }

    #[test]
    fn test_donation_requires_both_conditions() {
        let engine = QualityEngine::default();
        assert!(engine.is_donation_suitable(60.0, 2));
        assert!(!engine.is_donation_suitable(59.9, 10));
        assert!(!engine.is_donation_suitable(95.0, 1));
    }

    #[test]
    fn test_assess_unmatched_label_uses_default_profile() {
        let engine = QualityEngine::default();
        let assessment = engine.assess(0.6, 0.0, 0.3, "guacamole");
        assert_eq!(assessment.profile, DEFAULT_PROFILE);
        assert!((assessment.freshness_score - 45.0).abs() < 1e-4);
        // 5 · 0.45 · 1.0 = 2.25 → 2
        assert_eq!(assessment.shelf_life_days, 2);
        assert_eq!(assessment.quality_grade, QualityGrade::Poor);
        assert!(!assessment.donation_suitable);
    }

    #[test]
    fn test_fresh_strawberry_end_to_end() {
        let engine = QualityEngine::default();
        // 0.7·50 + 80·25 + min(1, 1.8)·25 → clamped at 100
        let assessment = engine.assess(0.7, 80.0, 0.9, "strawberry");
        assert_eq!(assessment.freshness_score, 100.0);
        assert_eq!(assessment.quality_grade, QualityGrade::Excellent);
        // 3 · 1.0 · 2.0 = 6
        assert_eq!(assessment.shelf_life_days, 6);
        assert!(assessment.donation_suitable);
        assert_eq!(assessment.category(), FoodCategory::Fruit);
    }

    #[test]
    fn test_stale_burger_floor() {
        let engine = QualityEngine::default();
        let assessment = engine.assess(0.0, 0.0, 0.0, "burger");
        assert_eq!(assessment.freshness_score, 20.0);
        assert_eq!(assessment.shelf_life_days, 1);
        assert_eq!(assessment.quality_grade, QualityGrade::Poor);
        assert!(!assessment.donation_suitable);
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(QualityGrade::Excellent.display(), "⭐ Excellent");
        assert_eq!(QualityGrade::Poor.to_string(), "Poor");
    }
}
