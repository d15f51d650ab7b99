// Business logic services
pub mod classification;
pub mod measurement;
pub mod recommendation;

// Re-export commonly used types for easier imports
pub use classification::{classify_bmi, compute_bmi, BmiError};
pub use measurement::{
    create_default_measurement_service, MeasurementService, MeasurementServiceError,
    MeasurementServiceTrait,
};
