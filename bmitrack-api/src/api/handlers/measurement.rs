use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// Import domain entities and services
use bmi_track_domain::auth::UserInfo;
use bmi_track_domain::entities::measurement::Measurement as DomainMeasurement;
use bmi_track_domain::services::classification::{classification_bands, BmiBand};
use bmi_track_domain::services::{create_default_measurement_service, MeasurementServiceTrait};

// Import our entities
use crate::entities::common::PublicErrorResponse;
use crate::entities::measurement::{CreateMeasurementRequest, Measurement};

/// Query parameters for retrieving measurement history
#[derive(Debug, Deserialize, Clone, IntoParams, ToSchema)]
pub struct HistoryQueryParams {
    /// ISO 8601 start date (default: 30 days ago)
    pub start_date: Option<String>,

    /// ISO 8601 end date (default: current date)
    pub end_date: Option<String>,

    /// Maximum number of results (default: 100, max: 1000)
    pub limit: Option<usize>,

    /// Pagination offset (default: 0)
    pub offset: Option<usize>,

    /// Sort direction (asc/desc, default: desc)
    pub sort: Option<String>,
}

/// Query parameters for retrieving measurement insights
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InsightsQueryParams {
    /// Analysis period in days (default: 30, max: 365)
    pub timeframe: Option<u32>,
}

/// Paginated response for measurement data
#[derive(Serialize, ToSchema)]
#[aliases(MeasurementPaginatedResponse = PaginatedResponse<Measurement>)]
pub struct PaginatedResponse<T> {
    /// Total count of items available
    pub total_count: usize,

    /// Current offset
    pub offset: usize,

    /// Current limit
    pub limit: usize,

    /// URL for the next page (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// URL for the previous page (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,

    /// Actual data items
    pub data: Vec<T>,
}

/// Error response format for API
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Service type for dependency injection
pub type MeasurementService = Arc<dyn MeasurementServiceTrait + Send + Sync>;

/// Create a default service for the handlers to use
pub fn create_service() -> MeasurementService {
    Arc::new(create_default_measurement_service())
}

/// Get a single measurement by ID
#[utoipa::path(
    get,
    path = "/api/v1/measurements/{id}",
    params(
        ("id" = String, Path, description = "Measurement ID")
    ),
    responses(
        (status = 200, description = "Measurement found", body = Measurement),
        (status = 404, description = "Measurement not found", body = PublicErrorResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "measurements"
)]
#[instrument(skip(service, user_info))]
pub async fn get_measurement(
    State(service): State<MeasurementService>,
    Extension(user_info): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, Response> {
    info!("Fetching measurement with ID: {}", id);

    match service
        .get_measurement_by_id(&user_info.user_id, &id.to_string())
        .await
    {
        Ok(measurement) => {
            let public_measurement = convert_to_public_measurement(measurement);
            Ok((StatusCode::OK, Json(public_measurement)))
        }
        Err(e) => {
            let error_message = e.to_string();
            if error_message.contains("not found") {
                info!("Measurement not found: {}", id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::not_found("measurement")),
                )
                    .into_response())
            } else {
                error!("Error retrieving measurement: {}", error_message);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
                    .into_response())
            }
        }
    }
}

/// Record a new measurement
#[utoipa::path(
    post,
    path = "/api/v1/measurements",
    request_body = CreateMeasurementRequest,
    responses(
        (status = 201, description = "Measurement created", body = Measurement),
        (status = 400, description = "Invalid request", body = PublicErrorResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "measurements"
)]
#[instrument(skip(service, user_info, request))]
pub async fn create_measurement(
    State(service): State<MeasurementService>,
    Extension(user_info): Extension<UserInfo>,
    Json(request): Json<CreateMeasurementRequest>,
) -> Result<impl IntoResponse, Response> {
    info!("Recording new measurement for user {}", user_info.user_id);

    let domain_request = convert_to_domain_request(request);

    match service
        .create_measurement(&user_info.user_id, domain_request)
        .await
    {
        Ok(measurement) => {
            info!("Measurement created with ID: {}", measurement.id);
            let public_measurement = convert_to_public_measurement(measurement);
            Ok((StatusCode::CREATED, Json(public_measurement)))
        }
        Err(e) => {
            let error_message = e.to_string();
            if error_message.contains("Validation") || error_message.contains("Invalid input") {
                warn!("Invalid measurement data: {}", error_message);
                Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::validation_error(&error_message, None)),
                )
                    .into_response())
            } else {
                error!("Error creating measurement: {}", error_message);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
                    .into_response())
            }
        }
    }
}

/// Build a page URL from the base path and the effective query parameters
fn build_page_url(
    base_url: &str,
    params: &HistoryQueryParams,
    offset: usize,
    limit: usize,
) -> String {
    let mut query_parts = Vec::new();

    if let Some(start) = &params.start_date {
        query_parts.push(format!("start_date={}", start));
    }
    if let Some(end) = &params.end_date {
        query_parts.push(format!("end_date={}", end));
    }
    query_parts.push(format!("limit={}", limit));
    query_parts.push(format!("offset={}", offset));
    if let Some(sort) = &params.sort {
        query_parts.push(format!("sort={}", sort));
    }

    format!("{}?{}", base_url, query_parts.join("&"))
}

/// Generate pagination links from the current request
fn generate_pagination_links(
    total_count: usize,
    limit: usize,
    offset: usize,
    base_url: &str,
    query_params: &HistoryQueryParams,
) -> (Option<String>, Option<String>) {
    let next = if offset + limit < total_count {
        Some(build_page_url(base_url, query_params, offset + limit, limit))
    } else {
        None
    };

    let previous = if offset > 0 {
        Some(build_page_url(
            base_url,
            query_params,
            offset.saturating_sub(limit),
            limit,
        ))
    } else {
        None
    };

    (next, previous)
}

/// Get paginated measurement history
#[utoipa::path(
    get,
    path = "/api/v1/measurements",
    params(
        HistoryQueryParams
    ),
    responses(
        (status = 200, description = "Measurement history retrieved", body = MeasurementPaginatedResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "measurements"
)]
#[instrument(skip(service, user_info))]
pub async fn get_measurement_history(
    State(service): State<MeasurementService>,
    Extension(user_info): Extension<UserInfo>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<impl IntoResponse, Response> {
    // Process query parameters
    let limit = params.limit.unwrap_or(100).min(1000); // Cap at 1000
    let offset = params.offset.unwrap_or(0);

    // Default to sorting by most recent if not specified
    let sort_desc = !matches!(params.sort.as_deref(), Some("asc"));

    // Parse date range
    let now = Utc::now();
    let thirty_days_ago = now - chrono::Duration::days(30);

    let start_date = if let Some(ref date_str) = params.start_date {
        match chrono::DateTime::parse_from_rfc3339(date_str) {
            Ok(date) => date.with_timezone(&Utc),
            Err(_) => {
                let error = ErrorResponse::bad_request(
                    "Invalid start_date format. Use ISO 8601 (e.g. 2023-03-15T08:30:00Z)",
                );
                return Err((StatusCode::BAD_REQUEST, Json(error)).into_response());
            }
        }
    } else {
        thirty_days_ago
    };

    let end_date = if let Some(ref date_str) = params.end_date {
        match chrono::DateTime::parse_from_rfc3339(date_str) {
            Ok(date) => date.with_timezone(&Utc),
            Err(_) => {
                let error = ErrorResponse::bad_request(
                    "Invalid end_date format. Use ISO 8601 (e.g. 2023-03-15T08:30:00Z)",
                );
                return Err((StatusCode::BAD_REQUEST, Json(error)).into_response());
            }
        }
    } else {
        now
    };

    let start_date_str = Some(start_date.to_rfc3339());
    let end_date_str = Some(end_date.to_rfc3339());

    match service
        .get_filtered_measurements(
            &user_info.user_id,
            start_date_str,
            end_date_str,
            Some(limit),
            Some(offset),
            Some(sort_desc),
        )
        .await
    {
        Ok((domain_measurements, total_count)) => {
            let base_url = "/api/v1/measurements";

            let (next, previous) =
                generate_pagination_links(total_count, limit, offset, base_url, &params);

            let public_measurements = domain_measurements
                .into_iter()
                .map(convert_to_public_measurement)
                .collect();

            let response = PaginatedResponse {
                total_count,
                offset,
                limit,
                next,
                previous,
                data: public_measurements,
            };

            Ok((StatusCode::OK, Json(response)))
        }
        Err(e) => {
            error!("Failed to get measurement history: {}", e);
            let error = ErrorResponse::internal_error();
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response())
        }
    }
}

/// Get measurement insights and analysis
#[utoipa::path(
    get,
    path = "/api/v1/measurements/insights",
    params(
        InsightsQueryParams
    ),
    responses(
        (status = 200, description = "Measurement insights generated", body = serde_json::Value),
        (status = 404, description = "Not enough data to generate insights", body = PublicErrorResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "measurements"
)]
#[instrument(skip(service, user_info))]
pub async fn get_measurement_insights(
    State(service): State<MeasurementService>,
    Extension(user_info): Extension<UserInfo>,
    Query(params): Query<InsightsQueryParams>,
) -> Result<impl IntoResponse, Response> {
    // Default to 30 days, max 1 year
    let timeframe = params.timeframe.unwrap_or(30).min(365);

    info!("Generating measurement insights for {} days", timeframe);

    let now = Utc::now();
    let start_date = now - chrono::Duration::days(timeframe as i64);
    let start_date_str = Some(start_date.to_rfc3339());
    let end_date_str = Some(now.to_rfc3339());

    match service
        .get_filtered_measurements(
            &user_info.user_id,
            start_date_str,
            end_date_str,
            None,
            None,
            None,
        )
        .await
    {
        Ok((domain_measurements, _)) => {
            match service.calculate_insights(&domain_measurements, timeframe) {
                Ok(insights) => {
                    info!("Measurement insights generated successfully");
                    Ok((StatusCode::OK, Json(insights)).into_response())
                }
                Err(e) => {
                    let error_message = e.to_string();
                    if error_message.contains("Insufficient") {
                        info!("Insufficient data for insights");
                        Ok((
                            StatusCode::NOT_FOUND,
                            Json(ErrorResponse {
                                error: "insufficient_data".to_string(),
                                message: "Not enough data to generate insights".to_string(),
                                details: None,
                            }),
                        )
                            .into_response())
                    } else {
                        error!("Error generating measurement insights: {}", e);
                        Ok((
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(ErrorResponse::internal_error()),
                        )
                            .into_response())
                    }
                }
            }
        }
        Err(e) => {
            error!("Failed to retrieve measurements: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error()),
            )
                .into_response())
        }
    }
}

/// One row of the public classification table
#[derive(Debug, Serialize, ToSchema)]
pub struct BmiClassRow {
    /// Band label, e.g. "Normal"
    pub label: String,

    /// Inclusive lower bound of the band
    pub min: f64,

    /// Exclusive upper bound; absent for the open-ended top band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<BmiBand> for BmiClassRow {
    fn from(band: BmiBand) -> Self {
        Self {
            label: band.category.label().to_string(),
            min: band.min,
            max: band.max,
        }
    }
}

/// Get the BMI classification table
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    responses(
        (status = 200, description = "Classification table", body = Vec<BmiClassRow>),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "measurements"
)]
#[instrument]
pub async fn get_classes() -> impl IntoResponse {
    let rows: Vec<BmiClassRow> = classification_bands()
        .into_iter()
        .map(BmiClassRow::from)
        .collect();

    (StatusCode::OK, Json(rows))
}

// Convert public request to domain request
fn convert_to_domain_request(
    request: CreateMeasurementRequest,
) -> bmi_track_domain::entities::measurement::CreateMeasurementRequest {
    bmi_track_domain::entities::measurement::CreateMeasurementRequest {
        weight_kg: request.weight_kg,
        height_m: request.height_m,
    }
}

// Convert domain measurement to public measurement
fn convert_to_public_measurement(measurement: DomainMeasurement) -> Measurement {
    let created_at = match chrono::DateTime::parse_from_rfc3339(&measurement.created_at) {
        Ok(dt) => dt.with_timezone(&chrono::Utc),
        Err(_) => chrono::Utc::now(), // Fallback to current time if parsing fails
    };

    Measurement {
        id: uuid::Uuid::parse_str(&measurement.id).unwrap_or_else(|_| uuid::Uuid::new_v4()),
        weight_kg: measurement.weight_kg,
        height_m: measurement.height_m,
        bmi: measurement.bmi,
        classification: measurement.category.label().to_string(),
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_link_generation() {
        let query_params = HistoryQueryParams {
            start_date: Some("2023-01-01T00:00:00Z".to_string()),
            end_date: Some("2023-02-01T00:00:00Z".to_string()),
            limit: Some(10),
            offset: Some(20),
            sort: Some("desc".to_string()),
        };

        // Test with more results available
        let (next, prev) =
            generate_pagination_links(50, 10, 20, "/api/v1/measurements", &query_params);

        assert!(next.is_some());
        assert!(prev.is_some());

        let next_url = next.unwrap();
        let prev_url = prev.unwrap();

        assert!(next_url.contains("offset=30"));
        assert!(prev_url.contains("offset=10"));

        // First page
        let (next, prev) =
            generate_pagination_links(50, 10, 0, "/api/v1/measurements", &query_params);
        assert!(next.is_some());
        assert!(prev.is_none());

        // Last page
        let (next, prev) =
            generate_pagination_links(50, 10, 40, "/api/v1/measurements", &query_params);
        assert!(next.is_none());
        assert!(prev.is_some());
    }

    #[test]
    fn test_class_table_rows() {
        let rows: Vec<BmiClassRow> = classification_bands()
            .into_iter()
            .map(BmiClassRow::from)
            .collect();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].label, "Underweight");
        assert_eq!(rows[0].min, 0.0);
        assert_eq!(rows[5].label, "Obesity class III");
        assert!(rows[5].max.is_none());
    }
}
