//! Classifier seam and ensemble aggregation
//!
//! Pretrained image classifiers live outside this crate and plug in through
//! [`ImageClassifier`]. The aggregator runs every registered classifier on
//! its own worker thread, collects each result within a time budget, and
//! merges the surviving predictions into one ranked list.

use crate::config::EnsembleConfig;
use crate::image_loader::RawImage;
use crate::{AssessmentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One (label, score) pair from a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A pretrained image classifier
///
/// Implementations return their top predictions sorted by descending score.
pub trait ImageClassifier: Send + Sync {
    /// Stable name used in logs and in `models_used`
    fn name(&self) -> &str;

    /// Classify an analysis raster
    fn classify(&self, image: &RawImage) -> Result<Vec<Prediction>>;
}

/// Classifier that answers every image with a fixed prediction list
///
/// Stands in for a pretrained network in demos and tests.
#[derive(Debug, Clone)]
pub struct FixedLabelClassifier {
    name: String,
    predictions: Vec<Prediction>,
}

impl FixedLabelClassifier {
    pub fn new(name: impl Into<String>, predictions: Vec<Prediction>) -> Self {
        Self {
            name: name.into(),
            predictions,
        }
    }

    /// Single-label classifier
    pub fn single(name: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self::new(name, vec![Prediction::new(label, score)])
    }
}

impl ImageClassifier for FixedLabelClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, _image: &RawImage) -> Result<Vec<Prediction>> {
        Ok(self.predictions.clone())
    }
}

/// Merged ensemble output
#[derive(Debug, Clone, Default)]
pub struct EnsembleOutcome {
    /// Ranked predictions, at most `top_k`
    pub predictions: Vec<Prediction>,
    /// Classifiers that contributed, in registration order
    pub models_used: Vec<String>,
    /// Classifiers that failed or timed out
    pub failed: Vec<String>,
}

/// A classifier call that outlived its deadline
#[derive(Debug)]
struct Straggler {
    classifier: String,
    finished: Arc<AtomicBool>,
}

/// Runs classifiers and merges their predictions
#[derive(Debug, Clone)]
pub struct EnsembleAggregator {
    top_k: usize,
    timeout: Duration,
    stragglers: Arc<Mutex<Vec<Straggler>>>,
}

impl Default for EnsembleAggregator {
    fn default() -> Self {
        Self::new(&EnsembleConfig::default())
    }
}

impl EnsembleAggregator {
    pub fn new(config: &EnsembleConfig) -> Self {
        Self {
            top_k: config.top_k,
            timeout: Duration::from_millis(config.classifier_timeout_ms),
            stragglers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Whether an earlier call of `classifier` is still running past its deadline
    fn is_straggling(&self, classifier: &str) -> bool {
        let mut stragglers = self.stragglers.lock().unwrap_or_else(PoisonError::into_inner);
        stragglers.retain(|s| !s.finished.load(Ordering::Acquire));
        stragglers.iter().any(|s| s.classifier == classifier)
    }

    /// Merge per-classifier predictions
    ///
    /// A single contributing classifier passes through unchanged. With
    /// several, scores are averaged per label (labels keep first-seen order
    /// on ties), re-sorted descending and truncated to `top_k`.
    pub fn aggregate(&self, per_classifier: &[(String, Vec<Prediction>)]) -> Vec<Prediction> {
        match per_classifier {
            [] => Vec::new(),
            [(_, only)] => only.clone(),
            many => {
                let mut order: Vec<String> = Vec::new();
                let mut scores: HashMap<String, Vec<f32>> = HashMap::new();
                for (_, predictions) in many {
                    for p in predictions {
                        let entry = scores.entry(p.label.clone()).or_insert_with(|| {
                            order.push(p.label.clone());
                            Vec::new()
                        });
                        entry.push(p.score);
                    }
                }

                let mut merged: Vec<Prediction> = order
                    .into_iter()
                    .map(|label| {
                        let s = &scores[&label];
                        let mean = s.iter().sum::<f32>() / s.len() as f32;
                        Prediction::new(label, mean)
                    })
                    .collect();
                merged.sort_by(|a, b| b.score.total_cmp(&a.score));
                merged.truncate(self.top_k);
                merged
            }
        }
    }

    /// Run every classifier and merge the results
    ///
    /// Classifiers run concurrently. Each one must answer before the shared
    /// deadline; late, failing or panicking classifiers are logged and left
    /// out of the merge. A classifier that is still running at the deadline
    /// finishes in the background and its answer is discarded; until it
    /// does, later runs skip that classifier instead of stacking another
    /// worker thread behind it. A classifier that never returns therefore
    /// holds exactly one thread for the life of the process.
    pub fn run(&self, classifiers: &[Arc<dyn ImageClassifier>], image: &RawImage) -> EnsembleOutcome {
        let (tx, rx) = mpsc::channel::<(usize, Result<Vec<Prediction>>)>();
        let mut slots: Vec<Option<Result<Vec<Prediction>>>> =
            (0..classifiers.len()).map(|_| None).collect();
        let mut finished_flags: Vec<Option<Arc<AtomicBool>>> =
            (0..classifiers.len()).map(|_| None).collect();
        let mut pending = 0usize;

        for (index, classifier) in classifiers.iter().enumerate() {
            if self.is_straggling(classifier.name()) {
                slots[index] = Some(Err(AssessmentError::ClassifierFailure {
                    classifier: classifier.name().to_string(),
                    reason: "previous call is still running past its deadline".to_string(),
                }));
                continue;
            }

            let tx = tx.clone();
            let worker = Arc::clone(classifier);
            let image = image.clone();
            let finished = Arc::new(AtomicBool::new(false));
            let worker_finished = Arc::clone(&finished);
            let spawned = thread::Builder::new()
                .name(format!("classifier-{}", classifier.name()))
                .spawn(move || {
                    let result = catch_unwind(AssertUnwindSafe(|| worker.classify(&image)))
                        .unwrap_or_else(|_| {
                            Err(AssessmentError::ClassifierFailure {
                                classifier: worker.name().to_string(),
                                reason: "classifier panicked".to_string(),
                            })
                        });
                    worker_finished.store(true, Ordering::Release);
                    // Receiver is gone once the deadline has passed
                    let _ = tx.send((index, result));
                });

            match spawned {
                Ok(_) => {
                    finished_flags[index] = Some(finished);
                    pending += 1;
                }
                Err(e) => {
                    slots[index] = Some(Err(AssessmentError::ClassifierFailure {
                        classifier: classifier.name().to_string(),
                        reason: format!("cannot spawn worker: {}", e),
                    }));
                }
            }
        }
        drop(tx);

        let deadline = Instant::now() + self.timeout;
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((index, result)) => {
                    slots[index] = Some(result);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if pending > 0 {
            let mut stragglers = self.stragglers.lock().unwrap_or_else(PoisonError::into_inner);
            for ((classifier, slot), flag) in classifiers.iter().zip(&slots).zip(finished_flags) {
                if let (None, Some(finished)) = (slot, flag) {
                    stragglers.push(Straggler {
                        classifier: classifier.name().to_string(),
                        finished,
                    });
                }
            }
        }

        let mut outcome = EnsembleOutcome::default();
        let mut per_classifier = Vec::new();
        for (classifier, slot) in classifiers.iter().zip(slots) {
            let name = classifier.name().to_string();
            match slot {
                Some(Ok(mut predictions)) => {
                    predictions.truncate(self.top_k);
                    debug!(
                        classifier = %name,
                        top = ?predictions.iter().take(3).map(|p| &p.label).collect::<Vec<_>>(),
                        "Classifier answered"
                    );
                    outcome.models_used.push(name.clone());
                    per_classifier.push((name, predictions));
                }
                Some(Err(e)) => {
                    warn!("{}", e);
                    outcome.failed.push(name);
                }
                None => {
                    let e = AssessmentError::ClassifierTimeout {
                        classifier: name.clone(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    };
                    warn!("{}", e);
                    outcome.failed.push(name);
                }
            }
        }

        outcome.predictions = self.aggregate(&per_classifier);
        outcome
    }
}
