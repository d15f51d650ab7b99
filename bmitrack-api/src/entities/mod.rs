// Public entities for the BmiTrack API
// This module contains data structures that are shared across the application boundary

// Re-export data structures for measurements
pub mod measurement;

// Common entities for error handling, pagination, etc.
pub mod common;
