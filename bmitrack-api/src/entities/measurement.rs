use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Public representation of a BMI measurement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Measurement {
    /// Unique identifier for the measurement
    pub id: Uuid,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Height in metres
    pub height_m: f64,

    /// Computed body mass index
    pub bmi: f64,

    /// Classification band label, e.g. "Normal" or "Obesity class II"
    pub classification: String,

    /// When the measurement was recorded
    pub created_at: DateTime<Utc>,
}

/// Request payload for recording a new measurement
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMeasurementRequest {
    /// Body weight in kilograms
    #[validate(range(min = 30.0, max = 300.0, message = "Weight must be between 30 and 300 kg"))]
    pub weight_kg: f64,

    /// Height in metres
    #[validate(range(min = 1.0, max = 2.5, message = "Height must be between 1.0 and 2.5 m"))]
    pub height_m: f64,
}
