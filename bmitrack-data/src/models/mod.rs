// Storage models for BmiTrack
pub mod measurement;
pub mod user;
