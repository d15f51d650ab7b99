use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, instrument};
use utoipa::ToSchema;

// Use the trait from domain layer
use bmi_track_domain::health;
use bmi_track_domain::health::{
    ComponentStatus as DomainComponentStatus, HealthComponent as DomainHealthComponent,
    HealthServiceTrait, SystemHealth, SystemStatus,
};

/// Health check response model with system information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Current application version from Cargo manifest
    pub version: String,
    /// Timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Details about various components of the system
    pub components: ComponentStatus,
    /// Environment information
    pub environment: String,
}

/// Status of individual system components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// In-memory storage status
    pub storage: ComponentHealthStatus,
    /// API status
    pub api: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Track the time when the server started using a thread-safe OnceCell
static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

// Initialize the server start time
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = SERVER_START_TIME.set(start_time);
    });
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait + Send + Sync>>,
) -> Result<impl IntoResponse, axum::response::Response> {
    info!("Health check requested");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Calculate uptime if server start time is available
    let uptime = SERVER_START_TIME
        .get()
        .map(|&start_time| now.saturating_sub(start_time));

    let system_health = health_service.get_system_health().await;

    // Map domain status to API status
    let overall_status = match system_health.status {
        SystemStatus::Healthy => "ok",
        SystemStatus::Degraded => "degraded",
        SystemStatus::Unhealthy => "error",
    };

    let component_statuses = ComponentStatus {
        storage: ComponentHealthStatus {
            status: map_component_status(
                &system_health
                    .components
                    .get("storage")
                    .map(|c| c.status.clone())
                    .unwrap_or(DomainComponentStatus::Healthy),
            ),
            message: system_health
                .components
                .get("storage")
                .and_then(|c| c.details.clone()),
        },
        api: ComponentHealthStatus {
            status: map_component_status(
                &system_health
                    .components
                    .get("api")
                    .map(|c| c.status.clone())
                    .unwrap_or(DomainComponentStatus::Healthy),
            ),
            message: system_health
                .components
                .get("api")
                .and_then(|c| c.details.clone()),
        },
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: component_statuses,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    // Return appropriate status code based on overall status
    match overall_status {
        "ok" => Ok((StatusCode::OK, Json(response))),
        "degraded" => Ok((StatusCode::SERVICE_UNAVAILABLE, Json(response))),
        _ => Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(response))),
    }
}

/// Map domain component status to API status string
fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

/// Implementation of the health service
#[derive(Debug)]
pub struct HealthService {}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthService {
    /// Create a new health service
    pub fn new() -> Self {
        HealthService {}
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        let storage_status = match self.check_storage_status().await {
            Ok(true) => DomainComponentStatus::Healthy,
            Ok(false) => DomainComponentStatus::Degraded,
            Err(_) => DomainComponentStatus::Unhealthy,
        };

        components.insert(
            "storage".to_string(),
            DomainHealthComponent {
                status: storage_status.clone(),
                details: match storage_status {
                    DomainComponentStatus::Healthy => None,
                    DomainComponentStatus::Degraded => {
                        Some("Storage is available but degraded".to_string())
                    }
                    DomainComponentStatus::Unhealthy => Some("Storage is unavailable".to_string()),
                },
            },
        );

        // API component is always healthy in this implementation
        components.insert(
            "api".to_string(),
            DomainHealthComponent {
                status: DomainComponentStatus::Healthy,
                details: None,
            },
        );

        let system_status = if components
            .values()
            .any(|c| c.status == DomainComponentStatus::Unhealthy)
        {
            SystemStatus::Unhealthy
        } else if components
            .values()
            .any(|c| c.status == DomainComponentStatus::Degraded)
        {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        SystemHealth {
            status: system_status,
            components,
        }
    }

    async fn check_storage_status(&self) -> Result<bool, String> {
        health::check_storage_status().await
    }
}

/// Factory function to create a health service
pub fn create_health_service() -> Arc<dyn HealthServiceTrait + Send + Sync> {
    Arc::new(HealthService::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_response() {
        initialize_server_start_time();

        let health_service = create_health_service();

        let response = health_check(Extension(health_service)).await.unwrap();
        let response = response.into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
