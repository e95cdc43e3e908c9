//! Color and texture analysis module
//!
//! This module handles color space conversions, the local texture
//! descriptors and extraction of the freshness feature vector.

pub mod conversion;
pub mod features;
pub mod texture;

pub use conversion::ColorConverter;
pub use features::{FeatureExtractor, FeatureVector};
