use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use bmi_track_domain::auth::UserInfo;
use bmi_track_domain::services::recommendation::{recommendations_for, Diet, Routine};

use crate::api::handlers::measurement::{ErrorResponse, MeasurementService};
use crate::entities::common::PublicErrorResponse;

/// Recommendations derived from the user's latest measurement
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    /// Classification band of the latest measurement
    pub classification: String,

    /// BMI of the latest measurement
    pub bmi: f64,

    /// Suggested exercise routines for the band
    pub routines: Vec<Routine>,

    /// Suggested diets for the band
    pub diets: Vec<Diet>,
}

/// Get routine and diet recommendations for the user's latest measurement
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    responses(
        (status = 200, description = "Recommendations for the latest measurement", body = RecommendationResponse),
        (status = 404, description = "No measurements recorded yet", body = PublicErrorResponse),
        (status = 500, description = "Internal server error", body = PublicErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "recommendations"
)]
#[instrument(skip(service, user_info))]
pub async fn get_recommendations(
    State(service): State<MeasurementService>,
    Extension(user_info): Extension<UserInfo>,
) -> Result<impl IntoResponse, Response> {
    info!("Fetching recommendations for user {}", user_info.user_id);

    match service.get_latest_measurement(&user_info.user_id).await {
        Ok(Some(measurement)) => {
            let set = recommendations_for(measurement.category);

            let response = RecommendationResponse {
                classification: measurement.category.label().to_string(),
                bmi: measurement.bmi,
                routines: set.routines,
                diets: set.diets,
            };

            Ok((StatusCode::OK, Json(response)))
        }
        Ok(None) => {
            info!("No measurements recorded for user {}", user_info.user_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found("measurement")),
            )
                .into_response())
        }
        Err(e) => {
            error!("Failed to fetch latest measurement: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error()),
            )
                .into_response())
        }
    }
}
