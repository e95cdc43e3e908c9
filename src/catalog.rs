//! Static food reference table
//!
//! Maps predicted labels to a baseline shelf life, a freshness sensitivity
//! factor and a broad category. Matching is a deliberate heuristic: a
//! profile applies when its key is a substring of the label or the label is
//! a substring of the key, and the first entry in table order wins.

use serde::{Deserialize, Serialize};

/// Broad food category used for score multipliers and storage advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Cooked,
    FastFood,
    Baked,
    Unknown,
}

impl FoodCategory {
    /// Name as reported to clients
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Fruit => "fruit",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Cooked => "cooked",
            FoodCategory::FastFood => "fast_food",
            FoodCategory::Baked => "baked",
            FoodCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference entry for one food label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FoodCategoryProfile {
    /// Lowercase key matched against labels
    pub key: &'static str,
    /// Shelf life in days for a perfectly fresh item
    pub base_shelf_days: u32,
    /// Freshness sensitivity multiplier
    pub freshness_factor: f32,
    /// Broad category
    pub category: FoodCategory,
}

const fn profile(
    key: &'static str,
    base_shelf_days: u32,
    freshness_factor: f32,
    category: FoodCategory,
) -> FoodCategoryProfile {
    FoodCategoryProfile {
        key,
        base_shelf_days,
        freshness_factor,
        category,
    }
}

/// Profile used when no table entry matches
pub const DEFAULT_PROFILE: FoodCategoryProfile = profile("", 5, 1.0, FoodCategory::Unknown);

/// Reference table, in matching priority order
pub const FOOD_PROFILES: &[FoodCategoryProfile] = &[
    // Fruits
    profile("apple", 7, 1.2, FoodCategory::Fruit),
    profile("banana", 5, 1.5, FoodCategory::Fruit),
    profile("orange", 10, 1.0, FoodCategory::Fruit),
    profile("strawberry", 3, 2.0, FoodCategory::Fruit),
    profile("grapes", 7, 1.3, FoodCategory::Fruit),
    // Vegetables
    profile("broccoli", 5, 1.4, FoodCategory::Vegetable),
    profile("carrot", 14, 0.8, FoodCategory::Vegetable),
    profile("lettuce", 7, 1.6, FoodCategory::Vegetable),
    profile("tomato", 7, 1.2, FoodCategory::Vegetable),
    // Cooked
    profile("pizza", 3, 0.9, FoodCategory::Cooked),
    profile("sandwich", 2, 1.1, FoodCategory::Cooked),
    profile("pasta", 4, 0.8, FoodCategory::Cooked),
    profile("rice", 4, 0.7, FoodCategory::Cooked),
    // Fast food
    profile("burger", 1, 1.5, FoodCategory::FastFood),
    profile("hamburger", 1, 1.5, FoodCategory::FastFood),
    profile("cheeseburger", 1, 1.5, FoodCategory::FastFood),
    profile("french fries", 1, 2.0, FoodCategory::FastFood),
    // Baked goods
    profile("bread", 5, 1.0, FoodCategory::Baked),
    profile("cake", 3, 0.9, FoodCategory::Baked),
    profile("cookie", 7, 0.6, FoodCategory::Baked),
];

/// Lowercase a classifier label and turn underscores into spaces
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace('_', " ")
}

/// Find the reference profile for a predicted label
///
/// Falls back to [`DEFAULT_PROFILE`] when nothing matches or the label is empty.
pub fn match_profile(label: &str) -> &'static FoodCategoryProfile {
    let label = normalize_label(label);
    if label.is_empty() {
        return &DEFAULT_PROFILE;
    }

    FOOD_PROFILES
        .iter()
        .find(|p| label.contains(p.key) || p.key.contains(label.as_str()))
        .unwrap_or(&DEFAULT_PROFILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_match() {
        let p = match_profile("strawberry");
        assert_eq!(p.base_shelf_days, 3);
        assert_eq!(p.freshness_factor, 2.0);
        assert_eq!(p.category, FoodCategory::Fruit);
    }

    #[test]
    fn test_key_contained_in_label() {
        assert_eq!(match_profile("Granny_Smith_apple").key, "apple");
        assert_eq!(match_profile("French_loaf_bread").key, "bread");
    }

    #[test]
    fn test_label_contained_in_key() {
        // "grape" is a substring of the "grapes" key
        assert_eq!(match_profile("grape").key, "grapes");
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // "cheeseburger" contains "burger", which is listed first
        assert_eq!(match_profile("cheeseburger").key, "burger");
    }

    #[test]
    fn test_underscore_labels_match_spaced_keys() {
        let p = match_profile("french_fries");
        assert_eq!(p.category, FoodCategory::FastFood);
        assert_eq!(p.freshness_factor, 2.0);
    }

    #[test]
    fn test_unmatched_label_uses_default() {
        let p = match_profile("guacamole");
        assert_eq!(p.base_shelf_days, 5);
        assert_eq!(p.freshness_factor, 1.0);
        assert_eq!(p.category, FoodCategory::Unknown);
    }

    #[test]
    fn test_empty_label_uses_default() {
        assert_eq!(match_profile("  ").category, FoodCategory::Unknown);
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&FoodCategory::FastFood).unwrap();
        assert_eq!(json, "\"fast_food\"");
        assert_eq!(FoodCategory::FastFood.to_string(), "fast_food");
    }
}
