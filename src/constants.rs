//! Reference values and thresholds for freshness assessment
//!
//! The numeric constants here are empirically chosen defaults. They seed
//! [`AssessmentConfig::default`](crate::AssessmentConfig) and can be
//! overridden from a JSON configuration file.

/// Image intake parameters
pub mod analysis {
    /// Side length of the square analysis raster
    pub const RESOLUTION: u32 = 224;

    /// Payloads shorter than this cannot hold a real image
    pub const MIN_PAYLOAD_LEN: usize = 100;
}

/// Color-space feature extraction parameters
///
/// Channel thresholds are expressed in 8-bit channel units: Lab L* is
/// scaled to [0, 255] and a*/b* are offset by 128; hue is stored as
/// degrees / 2 in [0, 180).
pub mod features {
    /// Number of entries in a feature vector
    pub const FEATURE_COUNT: usize = 10;

    /// Hue channel range in 8-bit units
    pub const HUE_RANGE: f32 = 180.0;

    /// a* above this marks a brown (decay) pixel
    pub const BROWN_A_THRESHOLD: f32 = 128.0;

    /// L* below this marks a dark spot
    pub const DARK_L_THRESHOLD: f32 = 50.0;

    /// Canny hysteresis thresholds
    pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
    pub const CANNY_HIGH_THRESHOLD: f32 = 150.0;

    /// Hue × saturation histogram bins
    pub const HISTOGRAM_HUE_BINS: usize = 50;
    pub const HISTOGRAM_SATURATION_BINS: usize = 60;

    /// Brightness a fresh item is expected to center on
    pub const BRIGHTNESS_TARGET: f32 = 0.7;
}

/// Local texture descriptor parameters
pub mod texture {
    /// Sampling radius in pixels
    pub const LBP_RADIUS: u32 = 1;

    /// Number of samples on the circle
    pub const LBP_POINTS: usize = 8;

    /// Laplacian variance is divided by this before capping
    pub const SHARPNESS_SCALE: f32 = 100.0;

    /// Upper bound of the texture score
    pub const SHARPNESS_CAP: f32 = 100.0;
}

/// Food / non-food gate vocabulary and thresholds
pub mod gate {
    /// Labels that indicate food when matched as substrings
    pub const FOOD_KEYWORDS: &[&str] = &[
        "apple", "banana", "orange", "strawberry", "grape", "lemon", "lime",
        "tomato", "carrot", "broccoli", "lettuce", "spinach", "potato", "onion",
        "bread", "pizza", "sandwich", "pasta", "rice", "noodle", "soup",
        "meat", "chicken", "beef", "fish", "salmon", "tuna", "egg",
        "cheese", "milk", "yogurt", "cake", "cookie", "pie", "fruit",
        "vegetable", "salad", "burger", "hamburger", "cheeseburger", "hot dog", "taco", "burrito",
        "french fries", "fries", "bagel", "muffin", "donut", "pretzel", "waffle", "pancake",
    ];

    /// Stricter vocabulary for the second pass
    pub const CORE_FOOD_TERMS: &[&str] =
        &["pizza", "burger", "sandwich", "bread", "meat", "chicken", "pasta"];

    /// Labels never accepted as food even when a keyword matches
    pub const NON_FOOD_DENYLIST: &[&str] = &[
        "baraca", "theater", "curtain", "stage", "performance", "building", "architecture",
    ];

    /// Physical objects commonly confused with food
    pub const NON_FOOD_OBJECTS: &[&str] = &[
        "person", "face", "hand", "finger", "body",
        "plate", "bowl", "cup", "glass", "utensil", "fork", "knife", "spoon",
        "table", "chair", "kitchen", "restaurant",
        "plastic", "paper", "cardboard", "packaging",
    ];

    /// Reported object name when skin-tone pixels dominate
    pub const SKIN_DETECTED_LABEL: &str = "human_skin_detected";

    /// First pass: number of predictions examined and minimum score
    pub const KEYWORD_WINDOW: usize = 3;
    pub const KEYWORD_THRESHOLD: f32 = 0.3;

    /// Second pass: number of predictions examined and minimum score
    pub const CORE_TERM_WINDOW: usize = 2;
    pub const CORE_TERM_THRESHOLD: f32 = 0.5;

    /// Minimum score for a non-food object to be reported
    pub const NON_FOOD_OBJECT_THRESHOLD: f32 = 0.5;

    /// Skin-tone HSV box in 8-bit units (hue 0-180)
    pub const SKIN_HUE_MAX: f32 = 20.0;
    pub const SKIN_SATURATION_MIN: f32 = 20.0;
    pub const SKIN_VALUE_MIN: f32 = 70.0;

    /// Fraction of skin-tone pixels that flags a person
    pub const SKIN_RATIO_THRESHOLD: f32 = 0.2;
}

/// Ensemble aggregation parameters
pub mod ensemble {
    /// Predictions kept per classifier and after merging
    pub const TOP_K: usize = 5;

    /// Time budget for a single classifier
    pub const CLASSIFIER_TIMEOUT_MS: u64 = 10_000;
}

/// Freshness scorer parameters
pub mod scoring {
    /// Fallback weights, one per feature
    pub const FALLBACK_WEIGHTS: [f32; super::features::FEATURE_COUNT] =
        [0.15, 0.15, 0.15, 0.10, 0.10, 0.10, 0.10, 0.05, 0.05, 0.05];

    /// Freshness ratio used when features cannot be extracted
    pub const NEUTRAL_FRESHNESS: f32 = 0.5;

    /// Synthetic training set for the default learned model
    pub const DEFAULT_TRAINING_SAMPLES: usize = 1000;
    pub const DEFAULT_TRAINING_SEED: u64 = 42;

    /// Default forest shape
    pub const DEFAULT_TREE_COUNT: usize = 100;
    pub const DEFAULT_MAX_TREE_DEPTH: usize = 10;
}

/// Quality score, grade and shelf-life parameters
pub mod quality {
    /// Contribution of each signal to the raw score
    pub const FRESHNESS_WEIGHT: f32 = 50.0;
    pub const TEXTURE_WEIGHT: f32 = 25.0;
    pub const CONFIDENCE_WEIGHT: f32 = 25.0;

    /// Classifier confidence is multiplied by this before capping at 1
    pub const CONFIDENCE_BOOST: f32 = 2.0;

    /// Bounds of the final freshness score
    pub const SCORE_MIN: f32 = 20.0;
    pub const SCORE_MAX: f32 = 100.0;

    /// Per-category score multipliers
    pub const FRUIT_MULTIPLIER: f32 = 1.1;
    pub const COOKED_MULTIPLIER: f32 = 0.9;
    pub const FAST_FOOD_MULTIPLIER: f32 = 0.8;
    pub const NEUTRAL_MULTIPLIER: f32 = 1.0;

    /// Inclusive lower bounds of each grade
    pub const EXCELLENT_THRESHOLD: f32 = 85.0;
    pub const GOOD_THRESHOLD: f32 = 70.0;
    pub const FAIR_THRESHOLD: f32 = 50.0;

    /// Donation gate
    pub const DONATION_MIN_SCORE: f32 = 60.0;
    pub const DONATION_MIN_SHELF_DAYS: u32 = 2;

    /// Shelf-life bounds in days
    pub const SHELF_LIFE_MIN_DAYS: u32 = 1;
    pub const SHELF_LIFE_MAX_DAYS: u32 = 21;

    /// Contour area (px²) that makes up one serving
    pub const SERVING_AREA: f64 = 15_000.0;
}

/// Recommendation rule thresholds
pub mod recommendations {
    /// Below this score risk-mitigation advice is added
    pub const RISK_SCORE: f32 = 60.0;

    /// Below this score baked goods get reheating advice
    pub const REHEAT_SCORE: f32 = 70.0;

    /// Sustainability advice at or above this score
    pub const SHARING_SCORE: f32 = 60.0;

    /// Shelf life needed for food-bank delivery
    pub const FOOD_BANK_MIN_DAYS: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_weights_sum_to_one() {
        let sum: f32 = scoring::FALLBACK_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(quality::FAIR_THRESHOLD < quality::GOOD_THRESHOLD);
        assert!(quality::GOOD_THRESHOLD < quality::EXCELLENT_THRESHOLD);
        assert!(quality::SCORE_MIN < quality::SCORE_MAX);
        assert!(quality::SHELF_LIFE_MIN_DAYS <= quality::SHELF_LIFE_MAX_DAYS);
        assert!(gate::KEYWORD_THRESHOLD < gate::CORE_TERM_THRESHOLD);
    }

    #[test]
    fn test_vocabularies_are_lowercase_without_underscores() {
        for word in gate::FOOD_KEYWORDS
            .iter()
            .chain(gate::CORE_FOOD_TERMS)
            .chain(gate::NON_FOOD_DENYLIST)
            .chain(gate::NON_FOOD_OBJECTS)
        {
            assert_eq!(*word, word.to_lowercase());
            assert!(!word.contains('_'), "{word} should use spaces");
        }
    }
}
