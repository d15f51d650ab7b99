use axum::{middleware, routing::get, routing::post, Extension, Router};
use tracing::debug;

use crate::api::handlers::{health, measurement, recommendation};
use crate::openapi::configure_swagger_routes;
use bmi_track_domain::auth::{auth_middleware, configure_auth};

type AppState = measurement::MeasurementService;

/// Create the application router
pub async fn create_app() -> Router {
    debug!("Creating application router");

    // Create the measurement service using the factory function
    let measurement_service = measurement::create_service();

    // Create the health service using the factory function
    let health_service = health::create_health_service();

    // Set up API routes that require authentication
    let api_routes = Router::new()
        // Define specific routes before parametrized routes to avoid conflicts
        .route(
            "/measurements/insights",
            get(measurement::get_measurement_insights),
        )
        .route(
            "/measurements",
            get(measurement::get_measurement_history).post(measurement::create_measurement),
        )
        .route("/measurements/:id", get(measurement::get_measurement))
        .route("/classes", get(measurement::get_classes))
        .route("/recommendations", get(recommendation::get_recommendations))
        .layer(middleware::from_fn_with_state(
            measurement_service.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("API routes configured");

    // Set up public routes that don't require authentication
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(bmi_track_domain::auth::login))
        .route("/auth/register", post(bmi_track_domain::auth::register))
        .route("/auth/refresh", post(bmi_track_domain::auth::refresh_token))
        .layer(Extension(health_service));

    debug!("Public routes configured");

    // Set up authentication routes
    let auth_routes = Router::new()
        .route("/auth/info", get(bmi_track_domain::auth::auth_info))
        .route("/auth/logout", post(bmi_track_domain::auth::logout))
        .layer(middleware::from_fn_with_state(
            measurement_service.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("Auth routes configured");

    // Combine all routes
    let app = Router::new().merge(public_routes).merge(auth_routes);

    let app = app
        .nest("/api/v1", api_routes)
        .with_state(measurement_service);

    debug!("API routes nested");

    // Configure the Swagger UI using the helper function
    let app = add_swagger_ui(app);

    debug!("Swagger UI merged");

    // Apply security configuration
    let app = configure_auth(app);
    debug!("Security configuration applied");

    // Initialize health check service startup time
    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    let swagger = configure_swagger_routes();
    app.merge(swagger)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Create a test application
    pub async fn create_test_app() -> Router {
        super::create_app().await
    }
}
