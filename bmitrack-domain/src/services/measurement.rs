use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::entities::conversions;
use crate::entities::measurement::{CreateMeasurementRequest, Measurement, MeasurementInsights};
use crate::services::classification::{classify_bmi, compute_bmi};
use bmi_track_data::repository::{MeasurementRepositoryTrait, RepositoryError};

/// Measurement service errors
#[derive(Debug, Error)]
pub enum MeasurementServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Measurement not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Insufficient data error
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Trait for measurement service operations
#[async_trait]
pub trait MeasurementServiceTrait {
    /// Validate a create measurement request
    fn validate_create_request(
        &self,
        request: &CreateMeasurementRequest,
    ) -> Result<(), MeasurementServiceError>;

    /// Calculate aggregate insights from a slice of measurements
    fn calculate_insights(
        &self,
        measurements: &[Measurement],
        timeframe_days: u32,
    ) -> Result<MeasurementInsights, MeasurementServiceError>;

    /// Compute, classify, and persist a new measurement for a user
    async fn create_measurement(
        &self,
        user_id: &str,
        request: CreateMeasurementRequest,
    ) -> Result<Measurement, MeasurementServiceError>;

    /// Get a user's measurement by ID
    async fn get_measurement_by_id(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Measurement, MeasurementServiceError>;

    /// Get the latest measurement for a user, if any
    async fn get_latest_measurement(
        &self,
        user_id: &str,
    ) -> Result<Option<Measurement>, MeasurementServiceError>;

    /// Get a filtered page of a user's measurement history
    async fn get_filtered_measurements(
        &self,
        user_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<Measurement>, usize), MeasurementServiceError>;
}

/// Measurement service for domain logic
pub struct MeasurementService<R: MeasurementRepositoryTrait> {
    repository: R,
}

impl<R: MeasurementRepositoryTrait> MeasurementService<R> {
    /// Create a new measurement service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> MeasurementServiceError {
        MeasurementServiceError::RepositoryError(err.to_string())
    }

    /// Map a stored record to a domain measurement
    fn to_domain(
        &self,
        record: bmi_track_data::models::measurement::MeasurementRecord,
    ) -> Result<Measurement, MeasurementServiceError> {
        conversions::convert_to_domain_measurement(record)
            .map_err(|e| MeasurementServiceError::RepositoryError(e.to_string()))
    }
}

#[async_trait]
impl<R: MeasurementRepositoryTrait + Send + Sync> MeasurementServiceTrait for MeasurementService<R> {
    /// Validate a create measurement request
    fn validate_create_request(
        &self,
        request: &CreateMeasurementRequest,
    ) -> Result<(), MeasurementServiceError> {
        // Use the validator crate's range checks first
        if let Err(validation_errors) = request.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(MeasurementServiceError::ValidationError(error_message));
        }

        Ok(())
    }

    /// Calculate aggregate insights from a slice of measurements
    fn calculate_insights(
        &self,
        measurements: &[Measurement],
        timeframe_days: u32,
    ) -> Result<MeasurementInsights, MeasurementServiceError> {
        if measurements.is_empty() {
            return Err(MeasurementServiceError::InsufficientData(
                "No measurements available to generate insights".to_string(),
            ));
        }

        let mut bmi_sum = 0.0;
        let mut weight_sum = 0.0;
        let mut min_bmi = f64::MAX;
        let mut max_bmi = f64::MIN;

        // Track the oldest and newest measurements for the weight trend
        let mut oldest = &measurements[0];
        let mut newest = &measurements[0];

        for measurement in measurements {
            bmi_sum += measurement.bmi;
            weight_sum += measurement.weight_kg;
            min_bmi = min_bmi.min(measurement.bmi);
            max_bmi = max_bmi.max(measurement.bmi);

            if measurement.created_at < oldest.created_at {
                oldest = measurement;
            }
            if measurement.created_at > newest.created_at {
                newest = measurement;
            }
        }

        let avg_bmi = bmi_sum / measurements.len() as f64;
        let avg_weight_kg = weight_sum / measurements.len() as f64;
        let weight_change_kg = newest.weight_kg - oldest.weight_kg;

        Ok(MeasurementInsights {
            avg_bmi,
            min_bmi,
            max_bmi,
            avg_weight_kg,
            weight_change_kg,
            category: classify_bmi(avg_bmi),
            measurement_count: measurements.len(),
            period_days: timeframe_days,
            generated_at: Utc::now(),
        })
    }

    /// Compute, classify, and persist a new measurement for a user
    async fn create_measurement(
        &self,
        user_id: &str,
        request: CreateMeasurementRequest,
    ) -> Result<Measurement, MeasurementServiceError> {
        // Validate the request
        self.validate_create_request(&request)?;

        // Run the engine: compute then classify
        let bmi = compute_bmi(request.weight_kg, request.height_m)
            .map_err(|e| MeasurementServiceError::ValidationError(e.to_string()))?;
        let category = classify_bmi(bmi);

        debug!(
            "Computed BMI {:.2} ({}) for user {}",
            bmi, category, user_id
        );

        let data_request = conversions::convert_to_data_create_record(
            user_id,
            request.weight_kg,
            request.height_m,
            bmi,
            category,
            Utc::now().to_rfc3339(),
        );

        let record = self
            .repository
            .create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        self.to_domain(record)
    }

    /// Get a user's measurement by ID
    async fn get_measurement_by_id(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Measurement, MeasurementServiceError> {
        let id_uuid = conversions::parse_string_to_uuid(id)
            .map_err(MeasurementServiceError::ValidationError)?;

        let record = self
            .repository
            .get_by_id(user_id, id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| {
                MeasurementServiceError::NotFound(format!(
                    "Measurement with ID {} not found",
                    id
                ))
            })?;

        self.to_domain(record)
    }

    /// Get the latest measurement for a user, if any
    async fn get_latest_measurement(
        &self,
        user_id: &str,
    ) -> Result<Option<Measurement>, MeasurementServiceError> {
        let record = self
            .repository
            .get_latest(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        record.map(|r| self.to_domain(r)).transpose()
    }

    /// Get a filtered page of a user's measurement history
    async fn get_filtered_measurements(
        &self,
        user_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<Measurement>, usize), MeasurementServiceError> {
        let (records, total_count) = self
            .repository
            .get_filtered(user_id, start_date, end_date, limit, offset, sort_desc)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let measurements = records
            .into_iter()
            .map(|r| self.to_domain(r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((measurements, total_count))
    }
}

/// Create a default measurement service using the repository from the data layer
pub fn create_default_measurement_service() -> impl MeasurementServiceTrait + Send + Sync {
    let repository = bmi_track_data::repository::MeasurementRepository::new();
    MeasurementService::new(repository)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::measurement::BmiCategory;
    use bmi_track_data::repository::tests::MockMeasurementRepository;
    use chrono::Duration;

    fn measurement(weight_kg: f64, height_m: f64, created_at: String) -> Measurement {
        let bmi = weight_kg / (height_m * height_m);
        Measurement {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            weight_kg,
            height_m,
            bmi,
            category: classify_bmi(bmi),
            created_at,
        }
    }

    #[test]
    fn test_validate_create_request_valid() {
        let request = CreateMeasurementRequest {
            weight_kg: 70.0,
            height_m: 1.75,
        };

        let service = MeasurementService::new(MockMeasurementRepository::new());
        assert!(service.validate_create_request(&request).is_ok());
    }

    #[test]
    fn test_validate_create_request_weight_out_of_range() {
        let request = CreateMeasurementRequest {
            weight_kg: 320.0,
            height_m: 1.75,
        };

        let service = MeasurementService::new(MockMeasurementRepository::new());
        let result = service.validate_create_request(&request);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Weight"));
    }

    #[test]
    fn test_validate_create_request_height_out_of_range() {
        let request = CreateMeasurementRequest {
            weight_kg: 70.0,
            height_m: 0.8,
        };

        let service = MeasurementService::new(MockMeasurementRepository::new());
        let result = service.validate_create_request(&request);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Height"));
    }

    #[tokio::test]
    async fn test_create_measurement_computes_and_classifies() {
        let service = MeasurementService::new(MockMeasurementRepository::new());

        let created = service
            .create_measurement(
                "user-1",
                CreateMeasurementRequest {
                    weight_kg: 70.0,
                    height_m: 1.75,
                },
            )
            .await
            .unwrap();

        assert!((created.bmi - 22.857).abs() < 0.001);
        assert_eq!(created.category, BmiCategory::Normal);
        assert_eq!(created.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_create_measurement_rejects_invalid_input() {
        let service = MeasurementService::new(MockMeasurementRepository::new());

        let result = service
            .create_measurement(
                "user-1",
                CreateMeasurementRequest {
                    weight_kg: -70.0,
                    height_m: 1.75,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(MeasurementServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_get_measurement_by_id_not_found() {
        let service = MeasurementService::new(MockMeasurementRepository::new());

        let result = service
            .get_measurement_by_id("user-1", "123e4567-e89b-12d3-a456-426614174000")
            .await;

        assert!(matches!(result, Err(MeasurementServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_measurement_by_id_invalid_uuid() {
        let service = MeasurementService::new(MockMeasurementRepository::new());

        let result = service.get_measurement_by_id("user-1", "nope").await;
        assert!(matches!(
            result,
            Err(MeasurementServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_calculate_insights() {
        let now = Utc::now();
        let measurements = vec![
            measurement(70.0, 1.75, (now - Duration::days(2)).to_rfc3339()),
            measurement(72.0, 1.75, (now - Duration::days(1)).to_rfc3339()),
            measurement(74.0, 1.75, now.to_rfc3339()),
        ];

        let service = MeasurementService::new(MockMeasurementRepository::new());
        let insights = service.calculate_insights(&measurements, 30).unwrap();

        assert_eq!(insights.measurement_count, 3);
        assert_eq!(insights.period_days, 30);
        assert_eq!(insights.avg_weight_kg, 72.0);
        assert!((insights.weight_change_kg - 4.0).abs() < 1e-9);
        assert!(insights.min_bmi < insights.max_bmi);
        assert_eq!(insights.category, BmiCategory::Normal);
    }

    #[test]
    fn test_calculate_insights_empty_history() {
        let service = MeasurementService::new(MockMeasurementRepository::new());

        let result = service.calculate_insights(&[], 30);
        assert!(matches!(
            result,
            Err(MeasurementServiceError::InsufficientData(_))
        ));
    }
}
