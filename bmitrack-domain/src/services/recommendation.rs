use serde::{Deserialize, Serialize};

use crate::entities::measurement::BmiCategory;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// An exercise routine suggested for a BMI band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Routine {
    /// Short routine name
    pub name: String,

    /// What the routine involves
    pub description: String,
}

/// A diet suggested for a BMI band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Diet {
    /// Short diet name
    pub name: String,

    /// What the diet involves
    pub description: String,
}

/// Static recommendation content for one BMI band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RecommendationSet {
    /// Suggested exercise routines
    pub routines: Vec<Routine>,

    /// Suggested diets
    pub diets: Vec<Diet>,
}

fn routine(name: &str, description: &str) -> Routine {
    Routine {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn diet(name: &str, description: &str) -> Diet {
    Diet {
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// Look up the static routine and diet content for a BMI band.
///
/// The catalogue is fixed content, standing in for what a real deployment
/// would serve from an editorial backend.
pub fn recommendations_for(category: BmiCategory) -> RecommendationSet {
    match category {
        BmiCategory::Underweight => RecommendationSet {
            routines: vec![
                routine(
                    "Strength training",
                    "Full-body resistance sessions three times a week to build muscle mass",
                ),
                routine(
                    "Light cardio",
                    "Short walks or easy cycling to support appetite without burning excess calories",
                ),
            ],
            diets: vec![diet(
                "Calorie surplus diet",
                "Energy-dense meals with frequent snacks, focused on protein and healthy fats",
            )],
        },
        BmiCategory::Normal => RecommendationSet {
            routines: vec![routine(
                "Maintenance mix",
                "Alternate moderate cardio and resistance work, three to five sessions a week",
            )],
            diets: vec![diet(
                "Balanced diet",
                "Maintain current intake with a balance of whole grains, protein, and vegetables",
            )],
        },
        BmiCategory::Overweight => RecommendationSet {
            routines: vec![
                routine(
                    "Cardio focus",
                    "Brisk walking, cycling, or swimming for 30-45 minutes most days",
                ),
                routine(
                    "Bodyweight circuit",
                    "Twice-weekly circuit of squats, push-ups, and planks",
                ),
            ],
            diets: vec![diet(
                "Moderate deficit diet",
                "Reduce portion sizes and limit refined sugar for a mild calorie deficit",
            )],
        },
        BmiCategory::ObesityClass1 => RecommendationSet {
            routines: vec![routine(
                "Low-impact cardio",
                "Daily walking or water aerobics, building up duration gradually",
            )],
            diets: vec![diet(
                "Structured deficit diet",
                "Planned meals with controlled portions and a registered calorie target",
            )],
        },
        BmiCategory::ObesityClass2 => RecommendationSet {
            routines: vec![routine(
                "Supervised activity",
                "Short, frequent low-impact sessions planned with a health professional",
            )],
            diets: vec![diet(
                "Clinical nutrition plan",
                "Dietitian-guided plan with regular follow-up on progress",
            )],
        },
        BmiCategory::ObesityClass3 => RecommendationSet {
            routines: vec![routine(
                "Medical guidance",
                "Activity only as cleared by a physician, starting with mobility work",
            )],
            diets: vec![diet(
                "Medically supervised plan",
                "Comprehensive treatment plan under medical supervision",
            )],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_band_has_content() {
        let categories = [
            BmiCategory::Underweight,
            BmiCategory::Normal,
            BmiCategory::Overweight,
            BmiCategory::ObesityClass1,
            BmiCategory::ObesityClass2,
            BmiCategory::ObesityClass3,
        ];

        for category in categories {
            let set = recommendations_for(category);
            assert!(!set.routines.is_empty(), "no routines for {}", category);
            assert!(!set.diets.is_empty(), "no diets for {}", category);
        }
    }

    #[test]
    fn test_content_differs_between_bands() {
        let normal = recommendations_for(BmiCategory::Normal);
        let obese = recommendations_for(BmiCategory::ObesityClass3);
        assert_ne!(normal.routines[0].name, obese.routines[0].name);
    }
}
