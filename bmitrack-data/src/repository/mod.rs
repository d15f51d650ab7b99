// Repository module structure
pub mod errors;
mod in_memory;
mod measurement;
pub mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use measurement::{MeasurementRepository, MeasurementRepositoryTrait};
pub use user::{user_store, UserStore};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use measurement::tests;
