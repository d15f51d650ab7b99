use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a recorded BMI measurement.
///
/// Immutable once created; each user's measurements form an append-only
/// history ordered by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Measurement {
    /// Unique identifier for the measurement
    pub id: String,

    /// Identifier of the owning user
    pub user_id: String,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Body height in meters
    pub height_m: f64,

    /// Computed body mass index (weight / height²)
    pub bmi: f64,

    /// Classification band the BMI value falls into
    pub category: BmiCategory,

    /// When the measurement was recorded (RFC 3339)
    pub created_at: String,
}

/// Request payload for recording a new measurement
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMeasurementRequest {
    /// Body weight in kilograms
    #[validate(range(min = 30.0, max = 300.0, message = "Weight must be between 30 and 300 kg"))]
    pub weight_kg: f64,

    /// Body height in meters
    #[validate(range(min = 1.0, max = 2.5, message = "Height must be between 1.0 and 2.5 m"))]
    pub height_m: f64,
}

/// BMI classification bands.
///
/// The six bands partition the BMI axis into half-open intervals; a
/// boundary value always belongs to the band starting at that value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BmiCategory {
    /// BMI below 18.5
    Underweight,

    /// BMI in [18.5, 25)
    Normal,

    /// BMI in [25, 30)
    Overweight,

    /// BMI in [30, 35)
    ObesityClass1,

    /// BMI in [35, 40)
    ObesityClass2,

    /// BMI of 40 or above
    ObesityClass3,
}

impl BmiCategory {
    /// Human-readable band label, also used as the storage representation
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::ObesityClass1 => "Obesity class I",
            BmiCategory::ObesityClass2 => "Obesity class II",
            BmiCategory::ObesityClass3 => "Obesity class III",
        }
    }

    /// Parse a band from its storage label
    pub fn from_label(label: &str) -> Result<Self, &'static str> {
        match label {
            "Underweight" => Ok(BmiCategory::Underweight),
            "Normal" => Ok(BmiCategory::Normal),
            "Overweight" => Ok(BmiCategory::Overweight),
            "Obesity class I" => Ok(BmiCategory::ObesityClass1),
            "Obesity class II" => Ok(BmiCategory::ObesityClass2),
            "Obesity class III" => Ok(BmiCategory::ObesityClass3),
            _ => Err("Invalid BMI category label"),
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate statistics over a user's measurement history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MeasurementInsights {
    /// Average BMI over the analysis period
    pub avg_bmi: f64,

    /// Lowest BMI recorded during the period
    pub min_bmi: f64,

    /// Highest BMI recorded during the period
    pub max_bmi: f64,

    /// Average weight in kilograms over the period
    pub avg_weight_kg: f64,

    /// Weight change from the oldest to the newest measurement in the period
    pub weight_change_kg: f64,

    /// Classification band of the average BMI
    pub category: BmiCategory,

    /// Number of measurements analyzed
    pub measurement_count: usize,

    /// Analysis period in days
    pub period_days: u32,

    /// Timestamp of the analysis
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip() {
        let categories = [
            BmiCategory::Underweight,
            BmiCategory::Normal,
            BmiCategory::Overweight,
            BmiCategory::ObesityClass1,
            BmiCategory::ObesityClass2,
            BmiCategory::ObesityClass3,
        ];

        for category in categories {
            assert_eq!(BmiCategory::from_label(category.label()), Ok(category));
        }

        assert!(BmiCategory::from_label("Severely obese").is_err());
    }

    #[test]
    fn test_create_request_validation_ranges() {
        let valid = CreateMeasurementRequest {
            weight_kg: 70.0,
            height_m: 1.75,
        };
        assert!(valid.validate().is_ok());

        let too_light = CreateMeasurementRequest {
            weight_kg: 25.0,
            height_m: 1.75,
        };
        assert!(too_light.validate().is_err());

        let too_tall = CreateMeasurementRequest {
            weight_kg: 70.0,
            height_m: 2.6,
        };
        assert!(too_tall.validate().is_err());
    }
}
