//! Domain layer health check functionality
//! This module provides health check services for the application

use async_trait::async_trait;
use bmi_track_data::repository::user_store;
use std::collections::HashMap;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the in-memory storage
    /// Returns true if storage is healthy, an error if the check
    /// could not be performed
    async fn check_storage_status(&self) -> Result<bool, String>;
}

/// Check if the in-memory storage is available
///
/// The store is unavailable only when its lock has been poisoned by a
/// panicking writer.
pub async fn check_storage_status() -> Result<bool, String> {
    match user_store().find_by_email("admin@bmitrack.local") {
        Ok(_) => Ok(true),
        Err(e) => Err(format!("Storage error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_storage_status() {
        let healthy = check_storage_status().await.unwrap();
        assert!(healthy);
    }
}
