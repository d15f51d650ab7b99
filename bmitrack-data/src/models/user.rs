use serde::{Deserialize, Serialize};

/// Storage model for a registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: String,

    /// Email address, unique across accounts
    pub email: String,

    /// Password in clear text; the store is an in-memory stand-in for a
    /// real backend and never persists to disk
    pub password: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the account was created (RFC 3339)
    pub created_at: String,
}
