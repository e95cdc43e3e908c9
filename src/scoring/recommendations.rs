//! Recommendation generator
//!
//! A fixed rule list evaluated in order. Every rule appends; nothing is
//! replaced or reordered:
//!
//! 1. Quality tier: a headline plus a tier-specific follow-up.
//! 2. Storage: the first matching food group, with extra advice for
//!    bananas and for baked goods below the reheat score.
//! 3. Risk mitigation below the risk score.
//! 4. Donation channel, or personal use.
//! 5. Sustainability at or above the sharing score.

use crate::catalog::normalize_label;
use crate::constants::recommendations::{FOOD_BANK_MIN_DAYS, REHEAT_SCORE, RISK_SCORE, SHARING_SCORE};
use crate::scoring::quality::{QualityAssessment, QualityGrade};

/// Storage advice group, matched by label substring
struct StorageGroup {
    terms: &'static [&'static str],
    kind: StorageKind,
}

#[derive(Clone, Copy)]
enum StorageKind {
    Fruit,
    Vegetable,
    Baked,
    Meat,
    Cooked,
}

const STORAGE_GROUPS: &[StorageGroup] = &[
    StorageGroup {
        terms: &["fruit", "apple", "banana", "berry", "grape", "orange"],
        kind: StorageKind::Fruit,
    },
    StorageGroup {
        terms: &["vegetable", "salad", "lettuce", "broccoli", "carrot"],
        kind: StorageKind::Vegetable,
    },
    StorageGroup {
        terms: &["bread", "cake", "pastry", "cookie"],
        kind: StorageKind::Baked,
    },
    StorageGroup {
        terms: &["meat", "fish", "chicken", "beef"],
        kind: StorageKind::Meat,
    },
    StorageGroup {
        terms: &["pizza", "sandwich", "pasta", "rice"],
        kind: StorageKind::Cooked,
    },
];

/// Builds the ordered advice list for an assessment
#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    risk_score: f32,
    reheat_score: f32,
    sharing_score: f32,
    food_bank_min_days: u32,
}

impl Default for RecommendationGenerator {
    fn default() -> Self {
        Self {
            risk_score: RISK_SCORE,
            reheat_score: REHEAT_SCORE,
            sharing_score: SHARING_SCORE,
            food_bank_min_days: FOOD_BANK_MIN_DAYS,
        }
    }
}

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate recommendations for an assessed food label
    pub fn generate(&self, assessment: &QualityAssessment, food_label: &str) -> Vec<String> {
        let score = assessment.freshness_score;
        let days = assessment.shelf_life_days;
        let mut out = Vec::new();

        match assessment.quality_grade {
            QualityGrade::Excellent => {
                out.push("⭐ Premium quality - perfect for donation and sharing".to_string());
                out.push("🎯 Ideal for food banks and community programs".to_string());
            }
            QualityGrade::Good => {
                out.push("✅ Excellent for donation - high quality food".to_string());
                out.push("🤝 Great for immediate sharing with neighbors".to_string());
            }
            QualityGrade::Fair => {
                out.push("⚡ Good for immediate donation or consumption".to_string());
                out.push("⏰ Share within 24-48 hours for best quality".to_string());
            }
            QualityGrade::Poor => {
                out.push("⚠️ Not recommended for donation - consume immediately".to_string());
                out.push("🏠 Best kept for personal/family consumption".to_string());
            }
        }

        let label = normalize_label(food_label);
        let group = STORAGE_GROUPS
            .iter()
            .find(|g| g.terms.iter().any(|t| label.contains(t)))
            .map(|g| g.kind);
        match group {
            Some(StorageKind::Fruit) => {
                out.push(format!("🍎 Store in cool, dry place - best within {} days", days));
                if label.contains("banana") {
                    out.push("🍌 Separate from other fruits to prevent over-ripening".to_string());
                }
            }
            Some(StorageKind::Vegetable) => {
                out.push(format!("🥬 Refrigerate immediately - use within {} days", days));
                out.push("💧 Keep in crisper drawer with proper humidity".to_string());
            }
            Some(StorageKind::Baked) => {
                out.push(format!("🍞 Store in airtight container - best within {} days", days));
                if score < self.reheat_score {
                    out.push("🔥 Consider toasting bread or reheating baked goods".to_string());
                }
            }
            Some(StorageKind::Meat) => {
                out.push(format!("🍖 Keep refrigerated - use within {} days", days));
                out.push("🌡️ Ensure proper temperature control during transport".to_string());
            }
            Some(StorageKind::Cooked) => {
                out.push(format!("🍕 Refrigerate and consume within {} days", days));
                out.push("♨️ Reheat thoroughly before consumption".to_string());
            }
            None => out.push(format!("📅 Best consumed within {} days", days)),
        }

        if score < self.risk_score {
            out.push("❄️ Consider freezing to extend shelf life".to_string());
            out.push("🔍 Inspect carefully before consumption".to_string());
        }

        if assessment.donation_suitable {
            out.push("📱 Use FoodShare app to connect with local recipients".to_string());
            if days >= self.food_bank_min_days {
                out.push("🚚 Suitable for food bank delivery programs".to_string());
            }
        } else {
            out.push("🏠 Best for personal consumption or composting".to_string());
        }

        if score >= self.sharing_score {
            out.push("🌱 Help reduce food waste by sharing with community".to_string());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::quality::QualityEngine;

    fn assessment(score: f32, days: u32, donation: bool) -> QualityAssessment {
        let engine = QualityEngine::default();
        QualityAssessment {
            freshness_score: score,
            quality_grade: engine.grade(score),
            shelf_life_days: days,
            donation_suitable: donation,
            profile: crate::catalog::DEFAULT_PROFILE,
        }
    }

    #[test]
    fn test_excellent_fruit_full_list() {
        let recs = RecommendationGenerator::new().generate(&assessment(92.0, 6, true), "strawberry");
        assert_eq!(
            recs,
            vec![
                "⭐ Premium quality - perfect for donation and sharing",
                "🎯 Ideal for food banks and community programs",
                "🍎 Store in cool, dry place - best within 6 days",
                "📱 Use FoodShare app to connect with local recipients",
                "🚚 Suitable for food bank delivery programs",
                "🌱 Help reduce food waste by sharing with community",
            ]
        );
    }

    #[test]
    fn test_poor_unknown_food() {
        let recs = RecommendationGenerator::new().generate(&assessment(40.0, 2, false), "guacamole");
        assert_eq!(
            recs,
            vec![
                "⚠️ Not recommended for donation - consume immediately",
                "🏠 Best kept for personal/family consumption",
                "📅 Best consumed within 2 days",
                "❄️ Consider freezing to extend shelf life",
                "🔍 Inspect carefully before consumption",
                "🏠 Best for personal consumption or composting",
            ]
        );
    }

    #[test]
    fn test_banana_gets_ripening_advice() {
        let recs = RecommendationGenerator::new().generate(&assessment(75.0, 4, true), "banana");
        assert_eq!(recs[2], "🍎 Store in cool, dry place - best within 4 days");
        assert_eq!(recs[3], "🍌 Separate from other fruits to prevent over-ripening");
        assert!(!recs.iter().any(|r| r.starts_with("🚚")));
    }

    #[test]
    fn test_baked_goods_below_reheat_score() {
        let generator = RecommendationGenerator::new();
        let fair = generator.generate(&assessment(65.0, 3, true), "French_loaf_bread");
        assert!(fair.contains(&"🔥 Consider toasting bread or reheating baked goods".to_string()));

        let good = generator.generate(&assessment(72.0, 3, true), "bagel_bread");
        assert!(!good.iter().any(|r| r.starts_with("🔥")));
    }

    #[test]
    fn test_group_order_wins() {
        // "fruit cake" matches the fruit group before the baked group
        let recs = RecommendationGenerator::new().generate(&assessment(72.0, 3, true), "fruit_cake");
        assert!(recs[2].starts_with("🍎"));
    }

    #[test]
    fn test_cooked_and_meat_groups() {
        let generator = RecommendationGenerator::new();
        let pizza = generator.generate(&assessment(55.0, 2, false), "pizza");
        assert_eq!(pizza[2], "🍕 Refrigerate and consume within 2 days");
        assert_eq!(pizza[3], "♨️ Reheat thoroughly before consumption");

        let chicken = generator.generate(&assessment(55.0, 2, false), "chicken_wings");
        assert_eq!(chicken[2], "🍖 Keep refrigerated - use within 2 days");
    }

    #[test]
    fn test_fair_tier_messages() {
        let recs = RecommendationGenerator::new().generate(&assessment(55.0, 3, false), "carrot");
        assert_eq!(recs[0], "⚡ Good for immediate donation or consumption");
        assert_eq!(recs[1], "⏰ Share within 24-48 hours for best quality");
        assert_eq!(recs[2], "🥬 Refrigerate immediately - use within 3 days");
    }
}
