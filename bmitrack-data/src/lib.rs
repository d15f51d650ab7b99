// BmiTrack Data
// This crate handles data access for the BmiTrack application

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
