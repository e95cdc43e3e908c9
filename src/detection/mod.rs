//! Classification and detection module
//!
//! This module handles the classifier ensemble, the food / non-food gate
//! and portion estimation from image contours.

pub mod ensemble;
pub mod gate;
pub mod portion;

pub use ensemble::{
    EnsembleAggregator, EnsembleOutcome, FixedLabelClassifier, ImageClassifier, Prediction,
};
pub use gate::{FoodDetection, FoodGate, GateDecision};
pub use portion::PortionEstimator;
