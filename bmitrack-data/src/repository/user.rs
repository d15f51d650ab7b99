use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use once_cell::sync::Lazy;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::models::user::UserRecord;

/// Global user store.
///
/// Auth handlers are free functions, so the store is a process-wide
/// singleton rather than injected state. It is thread-safe and can be
/// accessed from multiple request handlers concurrently.
static USER_STORE: Lazy<UserStore> = Lazy::new(UserStore::with_seed_account);

/// Access the global user store
pub fn user_store() -> &'static UserStore {
    &USER_STORE
}

/// In-memory store for registered user accounts, keyed by email
pub struct UserStore {
    users: Arc<Mutex<HashMap<String, UserRecord>>>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    /// Create a new empty user store
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a store pre-populated with the development account
    pub fn with_seed_account() -> Self {
        let store = Self::new();
        let admin = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: "admin@bmitrack.local".to_string(),
            password: "12345".to_string(),
            name: Some("Admin".to_string()),
            created_at: Utc::now().to_rfc3339(),
        };
        if let Ok(mut users) = store.users.lock() {
            users.insert(admin.email.clone(), admin);
        }
        store
    }

    /// Insert a new user; fails with `Conflict` if the email is taken
    pub fn insert(&self, user: UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;

        if users.contains_key(&user.email) {
            return Err(RepositoryError::Conflict(format!(
                "Email {} is already registered",
                user.email
            )));
        }

        debug!("Registering user {} ({})", user.id, user.email);
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    /// Look up a user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self
            .users
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(users.get(email).cloned())
    }

    /// Look up a user by ID
    pub fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self
            .users
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(users.values().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            name: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = UserStore::new();
        let inserted = store.insert(user("alice@example.com")).unwrap();

        let by_email = store.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, inserted.id);

        let by_id = store.find_by_id(&inserted.id).unwrap().unwrap();
        assert_eq!(by_id.email, "alice@example.com");

        assert!(store.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = UserStore::new();
        store.insert(user("alice@example.com")).unwrap();

        let result = store.insert(user("alice@example.com"));
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[test]
    fn test_seed_account_present() {
        let store = UserStore::with_seed_account();
        let admin = store.find_by_email("admin@bmitrack.local").unwrap();
        assert!(admin.is_some());
    }
}
