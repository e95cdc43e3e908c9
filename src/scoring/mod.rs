//! Freshness scoring and quality grading module
//!
//! This module turns features into a freshness ratio, the ratio into a
//! bounded score with grade and shelf life, and the outcome into advice.

pub mod model;
pub mod quality;
pub mod recommendations;
pub mod scorer;

pub use model::{ForestFreshnessModel, ForestSettings, FreshnessModel, TrainingSample};
pub use quality::{QualityAssessment, QualityEngine, QualityGrade};
pub use recommendations::RecommendationGenerator;
pub use scorer::{FreshnessScorer, ScorerMode};
