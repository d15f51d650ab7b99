use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::measurement::BmiCategory;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Error type for BMI computation
#[derive(Debug, Error, PartialEq)]
pub enum BmiError {
    /// Weight or height was not a positive finite number
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Compute the body mass index from weight and height.
///
/// BMI = weight (kg) / height (m)².
pub fn compute_bmi(weight_kg: f64, height_m: f64) -> Result<f64, BmiError> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(BmiError::InvalidInput(format!(
            "Weight must be a positive number, got {}",
            weight_kg
        )));
    }

    if !height_m.is_finite() || height_m <= 0.0 {
        return Err(BmiError::InvalidInput(format!(
            "Height must be a positive number, got {}",
            height_m
        )));
    }

    Ok(weight_kg / (height_m * height_m))
}

/// Classify a BMI value into its band.
///
/// Total over all values `compute_bmi` can produce: the bands are half-open
/// intervals, so each boundary value belongs to the band starting there.
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi >= 40.0 {
        BmiCategory::ObesityClass3
    } else if bmi >= 35.0 {
        BmiCategory::ObesityClass2
    } else if bmi >= 30.0 {
        BmiCategory::ObesityClass1
    } else if bmi >= 25.0 {
        BmiCategory::Overweight
    } else if bmi >= 18.5 {
        BmiCategory::Normal
    } else {
        BmiCategory::Underweight
    }
}

/// One row of the classification table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BmiBand {
    /// The band this row describes
    pub category: BmiCategory,

    /// Inclusive lower bound of the band
    pub min: f64,

    /// Exclusive upper bound; `None` for the open-ended top band
    pub max: Option<f64>,
}

/// The full six-band classification table, in ascending order
pub fn classification_bands() -> Vec<BmiBand> {
    vec![
        BmiBand {
            category: BmiCategory::Underweight,
            min: 0.0,
            max: Some(18.5),
        },
        BmiBand {
            category: BmiCategory::Normal,
            min: 18.5,
            max: Some(25.0),
        },
        BmiBand {
            category: BmiCategory::Overweight,
            min: 25.0,
            max: Some(30.0),
        },
        BmiBand {
            category: BmiCategory::ObesityClass1,
            min: 30.0,
            max: Some(35.0),
        },
        BmiBand {
            category: BmiCategory::ObesityClass2,
            min: 35.0,
            max: Some(40.0),
        },
        BmiBand {
            category: BmiCategory::ObesityClass3,
            min: 40.0,
            max: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_bmi_formula() {
        let bmi = compute_bmi(70.0, 1.75).unwrap();
        assert!((bmi - 22.857).abs() < 0.001);

        let bmi = compute_bmi(120.0, 1.70).unwrap();
        assert!((bmi - 41.522).abs() < 0.001);

        // Arbitrary positive inputs follow the formula exactly
        let bmi = compute_bmi(55.5, 1.62).unwrap();
        assert_eq!(bmi, 55.5 / (1.62 * 1.62));
    }

    #[test]
    fn test_compute_bmi_rejects_non_positive_weight() {
        assert!(matches!(
            compute_bmi(0.0, 1.75),
            Err(BmiError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_bmi(-70.0, 1.75),
            Err(BmiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_bmi_rejects_non_positive_height() {
        assert!(matches!(
            compute_bmi(70.0, 0.0),
            Err(BmiError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_bmi(70.0, -1.75),
            Err(BmiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_compute_bmi_rejects_non_finite_input() {
        assert!(compute_bmi(f64::NAN, 1.75).is_err());
        assert!(compute_bmi(70.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify_bmi(10.0), BmiCategory::Underweight);
        assert_eq!(classify_bmi(22.86), BmiCategory::Normal);
        assert_eq!(classify_bmi(27.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(32.0), BmiCategory::ObesityClass1);
        assert_eq!(classify_bmi(37.0), BmiCategory::ObesityClass2);
        assert_eq!(classify_bmi(41.52), BmiCategory::ObesityClass3);
    }

    #[test]
    fn test_classify_boundaries_belong_to_upper_band() {
        assert_eq!(classify_bmi(18.5), BmiCategory::Normal);
        assert_eq!(classify_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(classify_bmi(30.0), BmiCategory::ObesityClass1);
        assert_eq!(classify_bmi(35.0), BmiCategory::ObesityClass2);
        assert_eq!(classify_bmi(40.0), BmiCategory::ObesityClass3);

        // Just below a boundary stays in the lower band
        assert_eq!(classify_bmi(18.499), BmiCategory::Underweight);
        assert_eq!(classify_bmi(24.999), BmiCategory::Normal);
        assert_eq!(classify_bmi(39.999), BmiCategory::ObesityClass2);
    }

    #[test]
    fn test_reference_values() {
        let bmi = compute_bmi(70.0, 1.75).unwrap();
        assert_eq!(classify_bmi(bmi), BmiCategory::Normal);

        let bmi = compute_bmi(120.0, 1.70).unwrap();
        assert_eq!(classify_bmi(bmi), BmiCategory::ObesityClass3);
    }

    #[test]
    fn test_band_table_is_contiguous_and_matches_classify() {
        let bands = classification_bands();
        assert_eq!(bands.len(), 6);

        // Each band's upper bound is the next band's lower bound
        for pair in bands.windows(2) {
            assert_eq!(pair[0].max, Some(pair[1].min));
        }
        assert!(bands.last().unwrap().max.is_none());

        // classify agrees with the table at every lower bound
        for band in &bands {
            if band.min > 0.0 {
                assert_eq!(classify_bmi(band.min), band.category);
            }
        }
    }
}
