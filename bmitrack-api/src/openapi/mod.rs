use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Measurement endpoints
        crate::api::handlers::measurement::get_measurement,
        crate::api::handlers::measurement::create_measurement,
        crate::api::handlers::measurement::get_measurement_history,
        crate::api::handlers::measurement::get_measurement_insights,
        crate::api::handlers::measurement::get_classes,

        // Recommendation endpoints
        crate::api::handlers::recommendation::get_recommendations,

        // Auth endpoints
        bmi_track_domain::auth::auth_info,
        bmi_track_domain::auth::refresh_token,
        bmi_track_domain::auth::logout,
        bmi_track_domain::auth::login,
        bmi_track_domain::auth::register,
    ),
    components(
        schemas(
            // Entities
            crate::entities::measurement::Measurement,
            crate::entities::measurement::CreateMeasurementRequest,
            crate::entities::common::PublicErrorResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,

            // Measurement handlers
            crate::api::handlers::measurement::ErrorResponse,
            crate::api::handlers::measurement::MeasurementPaginatedResponse,
            crate::api::handlers::measurement::HistoryQueryParams,
            crate::api::handlers::measurement::InsightsQueryParams,
            crate::api::handlers::measurement::BmiClassRow,

            // Recommendation handlers
            crate::api::handlers::recommendation::RecommendationResponse,
            bmi_track_domain::services::recommendation::Routine,
            bmi_track_domain::services::recommendation::Diet,

            // Domain schemas
            bmi_track_domain::entities::measurement::BmiCategory,
            bmi_track_domain::entities::measurement::MeasurementInsights,

            // Auth schemas
            bmi_track_domain::auth::LoginRequest,
            bmi_track_domain::auth::LoginResponse,
            bmi_track_domain::auth::RegisterRequest,
            bmi_track_domain::auth::RegisterResponse,
            bmi_track_domain::auth::UserInfo,
            bmi_track_domain::auth::Claims,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "measurements", description = "BMI measurement endpoints"),
        (name = "recommendations", description = "Routine and diet recommendation endpoints"),
        (name = "Authentication", description = "Authentication and authorization endpoints")
    ),
    info(
        title = "BmiTrack API",
        version = "0.1.0",
        description = "API for computing, classifying, and tracking body mass index measurements",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
struct ApiDoc;
