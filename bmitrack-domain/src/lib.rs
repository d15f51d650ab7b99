// BmiTrack Domain
// This crate contains the business logic for the BmiTrack application

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;
