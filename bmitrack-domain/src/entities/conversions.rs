use uuid::Uuid;

use crate::entities::measurement::{BmiCategory, Measurement};

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Helper function to safely parse a string ID to UUID
///
/// Centralizes UUID parsing so invalid IDs produce one consistent message.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert from data model to domain entity for a measurement.
///
/// Fails when the stored classification label is not one of the six bands,
/// which would indicate a corrupted record.
pub fn convert_to_domain_measurement(
    record: bmi_track_data::models::measurement::MeasurementRecord,
) -> Result<Measurement, &'static str> {
    let category = BmiCategory::from_label(&record.classification)?;

    Ok(Measurement {
        id: record.id,
        user_id: record.user_id,
        weight_kg: record.weight_kg,
        height_m: record.height_m,
        bmi: record.bmi,
        category,
        created_at: record.created_at,
    })
}

/// Convert from domain entity to data model for a measurement create request
pub fn convert_to_data_create_record(
    user_id: &str,
    weight_kg: f64,
    height_m: f64,
    bmi: f64,
    category: BmiCategory,
    created_at: String,
) -> bmi_track_data::models::measurement::CreateMeasurementRecord {
    bmi_track_data::models::measurement::CreateMeasurementRecord {
        user_id: user_id.to_string(),
        weight_kg,
        height_m,
        bmi,
        classification: category.label().to_string(),
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_convert_to_domain_measurement() {
        let record = bmi_track_data::models::measurement::MeasurementRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            user_id: "user-1".to_string(),
            weight_kg: 70.0,
            height_m: 1.75,
            bmi: 22.857,
            classification: "Normal".to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let measurement = convert_to_domain_measurement(record.clone()).unwrap();

        assert_eq!(measurement.id, record.id);
        assert_eq!(measurement.user_id, record.user_id);
        assert_eq!(measurement.weight_kg, record.weight_kg);
        assert_eq!(measurement.height_m, record.height_m);
        assert_eq!(measurement.bmi, record.bmi);
        assert_eq!(measurement.category, BmiCategory::Normal);
        assert_eq!(measurement.created_at, record.created_at);
    }

    #[test]
    fn test_convert_rejects_unknown_classification() {
        let record = bmi_track_data::models::measurement::MeasurementRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            user_id: "user-1".to_string(),
            weight_kg: 70.0,
            height_m: 1.75,
            bmi: 22.857,
            classification: "Gigantic".to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        assert!(convert_to_domain_measurement(record).is_err());
    }

    #[test]
    fn test_convert_to_data_create_record() {
        let created_at = Utc::now().to_rfc3339();
        let record = convert_to_data_create_record(
            "user-1",
            70.0,
            1.75,
            22.857,
            BmiCategory::Normal,
            created_at.clone(),
        );

        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.weight_kg, 70.0);
        assert_eq!(record.height_m, 1.75);
        assert_eq!(record.bmi, 22.857);
        assert_eq!(record.classification, "Normal");
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn test_parse_string_to_uuid() {
        assert!(parse_string_to_uuid("123e4567-e89b-12d3-a456-426614174000").is_ok());
        assert!(parse_string_to_uuid("not-a-uuid").is_err());
    }
}
