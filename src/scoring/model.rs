//! Learned freshness model
//!
//! A bagged forest of `linfa` decision trees over the feature vector,
//! persisted as JSON. The fresh-class probability is the share of trees
//! voting "fresh". When no usable model file exists, a default forest is
//! fitted on seeded synthetic data and written back so later runs load the
//! same trees.

use crate::color::FeatureVector;
use crate::constants::features::FEATURE_COUNT;
use crate::constants::scoring::{
    DEFAULT_MAX_TREE_DEPTH, DEFAULT_TRAINING_SAMPLES, DEFAULT_TRAINING_SEED, DEFAULT_TREE_COUNT,
};
use crate::{AssessmentError, Result};
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Class label of fresh samples
const FRESH: usize = 1;
const NOT_FRESH: usize = 0;

/// Probability model for the "fresh" class
pub trait FreshnessModel: Send + Sync {
    /// Probability in [0, 1] that the features describe fresh food
    fn predict_fresh_probability(&self, features: &FeatureVector) -> Result<f32>;

    /// Whether the model has been fitted and can be evaluated
    fn is_trained(&self) -> bool;
}

/// One labelled training example
#[derive(Debug, Clone, Copy)]
pub struct TrainingSample {
    pub features: FeatureVector,
    pub fresh: bool,
}

/// Forest shape and bootstrap seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestSettings {
    pub tree_count: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            tree_count: DEFAULT_TREE_COUNT,
            max_depth: Some(DEFAULT_MAX_TREE_DEPTH),
            seed: DEFAULT_TRAINING_SEED,
        }
    }
}

/// Random-forest freshness model
#[derive(Serialize, Deserialize)]
pub struct ForestFreshnessModel {
    trees: Vec<DecisionTree<f64, usize>>,
    /// Width of the feature rows the trees were fitted on
    feature_count: usize,
    /// Number of samples the model was fitted on
    training_samples: usize,
}

impl std::fmt::Debug for ForestFreshnessModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestFreshnessModel")
            .field("trees", &self.trees.len())
            .field("feature_count", &self.feature_count)
            .field("training_samples", &self.training_samples)
            .finish()
    }
}

fn feature_rows<'a>(
    features: impl ExactSizeIterator<Item = &'a FeatureVector>,
) -> Result<Array2<f64>> {
    let rows = features.len();
    let flat: Vec<f64> = features
        .flat_map(|f| f.values().iter().map(|v| f64::from(*v)))
        .collect();
    Array2::from_shape_vec((rows, FEATURE_COUNT), flat).map_err(|e| {
        AssessmentError::ModelUnavailable {
            reason: format!("cannot shape feature rows: {}", e),
        }
    })
}

impl ForestFreshnessModel {
    /// Fit one decision tree per bootstrap resample of `samples`
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::InvalidParameter` for an empty training set
    /// or zero trees, and `ModelUnavailable` if a tree cannot be fitted.
    pub fn train(samples: &[TrainingSample], settings: &ForestSettings) -> Result<Self> {
        if samples.is_empty() {
            return Err(AssessmentError::invalid_parameter("training_samples", 0));
        }
        if settings.tree_count == 0 {
            return Err(AssessmentError::invalid_parameter("tree_count", 0));
        }

        let records = feature_rows(samples.iter().map(|s| &s.features))?;
        let targets: Array1<usize> = samples
            .iter()
            .map(|s| if s.fresh { FRESH } else { NOT_FRESH })
            .collect();

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let n = samples.len();
        let mut trees = Vec::with_capacity(settings.tree_count);

        for _ in 0..settings.tree_count {
            let picks: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let bootstrap = DatasetBase::from(records.select(Axis(0), &picks))
                .with_targets(targets.select(Axis(0), &picks));

            let tree = DecisionTree::params()
                .max_depth(settings.max_depth)
                .fit(&bootstrap)
                .map_err(|e| AssessmentError::ModelUnavailable {
                    reason: format!("decision tree fitting failed: {}", e),
                })?;
            trees.push(tree);
        }
        debug!(trees = trees.len(), samples = n, "Fitted freshness forest");

        Ok(Self {
            trees,
            feature_count: FEATURE_COUNT,
            training_samples: n,
        })
    }

    /// Synthetic training set: uniform random features with random labels
    pub fn synthetic_samples(count: usize, seed: u64) -> Vec<TrainingSample> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let values: [f32; FEATURE_COUNT] = std::array::from_fn(|_| rng.gen::<f32>());
                TrainingSample {
                    features: FeatureVector::new(values),
                    fresh: rng.gen_bool(0.5),
                }
            })
            .collect()
    }

    /// Default forest fitted on the seeded synthetic set
    pub fn train_default() -> Result<Self> {
        let samples = Self::synthetic_samples(DEFAULT_TRAINING_SAMPLES, DEFAULT_TRAINING_SEED);
        Self::train(&samples, &ForestSettings::default())
    }

    /// Load a model from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssessmentError::persistence(format!("Cannot read model {}", path.display()), e)
        })?;
        let model: Self = serde_json::from_str(&content).map_err(|e| {
            AssessmentError::persistence(format!("Cannot parse model {}", path.display()), e)
        })?;
        if model.feature_count != FEATURE_COUNT || model.trees.is_empty() {
            return Err(AssessmentError::ModelPersistence {
                message: format!(
                    "Model {} has {} trees over {} features, expected {} features",
                    path.display(),
                    model.trees.len(),
                    model.feature_count,
                    FEATURE_COUNT
                ),
                source: None,
            });
        }
        Ok(model)
    }

    /// Save the model as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AssessmentError::persistence(format!("Cannot create {}", parent.display()), e)
            })?;
        }
        let json = serde_json::to_string(self)
            .map_err(|e| AssessmentError::persistence("Cannot serialize model", e))?;
        std::fs::write(path, json).map_err(|e| {
            AssessmentError::persistence(format!("Cannot write model {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Load the model at `path`, or train and persist a default one
    ///
    /// Missing or unreadable files fall back to training. Failing to save
    /// the new model is logged and does not fail the call.
    pub fn load_or_create(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path.filter(|p| p.exists()) {
            match Self::load(path) {
                Ok(model) => {
                    info!("Loaded freshness model from {}", path.display());
                    return Ok(model);
                }
                Err(e) => warn!("{}; training a default model", e),
            }
        }

        let model = Self::train_default()?;
        info!(
            samples = model.training_samples,
            trees = model.trees.len(),
            "Trained default freshness model"
        );

        if let Some(path) = path {
            if let Err(e) = model.save(path) {
                warn!("{}", e);
            }
        }
        Ok(model)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }
}

impl FreshnessModel for ForestFreshnessModel {
    fn predict_fresh_probability(&self, features: &FeatureVector) -> Result<f32> {
        if !self.is_trained() {
            return Err(AssessmentError::ModelUnavailable {
                reason: "model has not been trained".to_string(),
            });
        }
        let row = feature_rows(std::iter::once(features))?;
        let fresh_votes = self
            .trees
            .iter()
            .filter(|tree| {
                let predicted: Array1<usize> = tree.predict(&row);
                predicted.get(0) == Some(&FRESH)
            })
            .count();
        Ok(fresh_votes as f32 / self.trees.len() as f32)
    }

    fn is_trained(&self) -> bool {
        !self.trees.is_empty() && self.training_samples > 0 && self.feature_count == FEATURE_COUNT
    }
}
