//! Error types for the freshscan library

use thiserror::Error;

/// Result type alias for freshscan operations
pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Error kinds raised while assessing a food photograph
#[derive(Error, Debug)]
pub enum AssessmentError {
    /// Image payload was malformed, undersized or could not be decoded
    #[error("Failed to decode image: {message}")]
    DecodeFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Every registered classifier failed or timed out
    #[error("Analysis failed - no valid predictions from any model")]
    NoClassifierOutput,

    /// The food gate rejected the image
    #[error("No food detected (detected: {detected})")]
    NotFood { detected: String },

    /// The food gate identified a specific non-food object or human skin
    #[error("Non-food object detected: {object}")]
    NonFoodObjectDetected { object: String },

    /// Feature extraction could not produce a vector; substituted internally
    #[error("Feature extraction degraded: {reason}")]
    FeatureExtractionDegraded { reason: String },

    /// A single classifier failed; the ensemble continues without it
    #[error("Classifier '{classifier}' failed: {reason}")]
    ClassifierFailure { classifier: String, reason: String },

    /// A single classifier did not answer within its time budget
    #[error("Classifier '{classifier}' timed out after {timeout_ms}ms")]
    ClassifierTimeout { classifier: String, timeout_ms: u64 },

    /// The learned freshness model cannot be evaluated
    #[error("Freshness model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// Loading or saving the learned freshness model failed
    #[error("Model persistence error: {message}")]
    ModelPersistence {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read or written
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Catch-all for anything the pipeline did not anticipate
    #[error("Analysis failed: {message}")]
    UnexpectedAssessmentFailure { message: String },
}

impl AssessmentError {
    /// Create a decode error with context
    pub fn decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DecodeFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a decode error without an underlying cause
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create a model persistence error with context
    pub fn persistence<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelPersistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error is stage-local and has a neutral substitute
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AssessmentError::FeatureExtractionDegraded { .. }
                | AssessmentError::ClassifierFailure { .. }
                | AssessmentError::ClassifierTimeout { .. }
                | AssessmentError::ModelUnavailable { .. }
                | AssessmentError::ModelPersistence { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AssessmentError::DecodeFailure { message, .. } => format!(
                "Analysis failed: {}. Please try again with a clearer image.",
                message
            ),
            AssessmentError::NoClassifierOutput => {
                "Analysis failed - no valid predictions from any model".to_string()
            }
            AssessmentError::NotFood { detected } => format!(
                "No food detected! Detected: {}. Please scan actual food items. 🥗📱",
                detected
            ),
            AssessmentError::NonFoodObjectDetected { object } => format!(
                "Non-food object detected: {}. Please scan actual food items. 🥗📱",
                object
            ),
            AssessmentError::UnexpectedAssessmentFailure { message } => format!(
                "Analysis failed: {}. Please try again with a clearer image.",
                message
            ),
            _ => "Analysis failed. Please try again with a clearer image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_food_user_message_names_detected_label() {
        let err = AssessmentError::NotFood {
            detected: "theater_curtain".to_string(),
        };
        let message = err.user_message();
        assert!(message.starts_with("No food detected!"));
        assert!(message.contains("theater_curtain"));
    }

    #[test]
    fn test_non_food_object_message() {
        let err = AssessmentError::NonFoodObjectDetected {
            object: "human_skin_detected".to_string(),
        };
        assert!(err.user_message().contains("human_skin_detected"));
        assert_eq!(err.to_string(), "Non-food object detected: human_skin_detected");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(AssessmentError::FeatureExtractionDegraded {
            reason: "empty image".into()
        }
        .is_recoverable());
        assert!(AssessmentError::ClassifierTimeout {
            classifier: "mobilenet".into(),
            timeout_ms: 10
        }
        .is_recoverable());
        assert!(!AssessmentError::NoClassifierOutput.is_recoverable());
        assert!(!AssessmentError::NotFood {
            detected: "stage".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_decode_error_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = AssessmentError::decode("Failed to read image", io);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("Failed to read image"));
    }
}
