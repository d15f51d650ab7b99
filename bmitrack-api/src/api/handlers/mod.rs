pub mod health;
pub mod measurement;
pub mod recommendation;

// Re-export handlers for easier imports
pub use health::health_check;
pub use measurement::{
    create_measurement, get_classes, get_measurement, get_measurement_history,
    get_measurement_insights,
};
pub use recommendation::get_recommendations;
