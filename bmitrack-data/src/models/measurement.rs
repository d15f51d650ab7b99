use serde::{Deserialize, Serialize};

/// Storage model for a BMI measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Unique identifier for the measurement
    pub id: String,

    /// Identifier of the user the measurement belongs to
    pub user_id: String,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Body height in meters
    pub height_m: f64,

    /// Computed body mass index (weight / height²)
    pub bmi: f64,

    /// Classification band the BMI value falls into
    pub classification: String,

    /// When the measurement was recorded (RFC 3339)
    pub created_at: String,
}

/// Input data for creating a new measurement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeasurementRecord {
    /// Identifier of the user the measurement belongs to
    pub user_id: String,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Body height in meters
    pub height_m: f64,

    /// Computed body mass index (weight / height²)
    pub bmi: f64,

    /// Classification band the BMI value falls into
    pub classification: String,

    /// When the measurement was recorded (RFC 3339)
    pub created_at: String,
}
