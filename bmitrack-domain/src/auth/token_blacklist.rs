use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Global token blacklist for revoked tokens
///
/// Singleton access point to the blacklist, safe to use from
/// multiple threads concurrently.
static TOKEN_BLACKLIST: Lazy<TokenBlacklist> = Lazy::new(TokenBlacklist::new);

/// Token blacklist structure for tracking revoked tokens
///
/// Maintains a thread-safe collection of revoked tokens with a maximum
/// size limit to prevent unbounded growth. Expired tokens are removed
/// during cleanup operations.
pub struct TokenBlacklist {
    /// Map of token identifiers (user ids) to
    /// (expiration timestamp, revocation timestamp)
    revoked_tokens: Arc<Mutex<HashMap<String, (SystemTime, SystemTime)>>>,

    /// Maximum size of the blacklist before aggressive pruning
    max_size: usize,
}

impl Default for TokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBlacklist {
    /// Create a new token blacklist with default settings
    pub fn new() -> Self {
        Self {
            revoked_tokens: Arc::new(Mutex::new(HashMap::new())),
            max_size: 10000,
        }
    }

    /// Create a new token blacklist with a custom maximum size
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            revoked_tokens: Arc::new(Mutex::new(HashMap::new())),
            max_size,
        }
    }

    /// Add a token to the blacklist with a specific expiration
    ///
    /// When the blacklist reaches its maximum size it first drops expired
    /// tokens; if still at capacity it removes the oldest entries by
    /// revocation time.
    pub fn revoke_token(&self, token_id: &str, expiration: SystemTime) {
        let revocation_time = SystemTime::now();
        let mut tokens = self.revoked_tokens.lock().unwrap();

        if tokens.len() >= self.max_size {
            warn!(
                "Token blacklist reached max size ({}), performing aggressive cleanup",
                self.max_size
            );
            self.cleanup_expired_tokens_internal(&mut tokens);

            if tokens.len() >= self.max_size {
                self.remove_oldest_entries(&mut tokens, self.max_size / 2);
            }
        }

        tokens.insert(token_id.to_string(), (expiration, revocation_time));
        info!("Token revoked: {}", token_id);
    }

    /// Check if a token is in the blacklist (has been revoked)
    ///
    /// Entries past their stored expiration no longer block, even before
    /// the scheduled cleanup removes them.
    pub fn is_revoked(&self, token_id: &str) -> bool {
        let tokens = self.revoked_tokens.lock().unwrap();
        match tokens.get(token_id) {
            Some((expiration, _)) => SystemTime::now() < *expiration,
            None => false,
        }
    }

    /// Remove a token from the blacklist, restoring its validity
    ///
    /// Returns true if an entry was removed.
    pub fn clear_revocation(&self, token_id: &str) -> bool {
        let mut tokens = self.revoked_tokens.lock().unwrap();
        tokens.remove(token_id).is_some()
    }

    /// Get the number of tokens in the blacklist
    pub fn size(&self) -> usize {
        let tokens = self.revoked_tokens.lock().unwrap();
        tokens.len()
    }

    /// Remove expired tokens from the blacklist
    ///
    /// Returns the number of tokens that were removed.
    pub fn cleanup_expired_tokens(&self) -> usize {
        let mut tokens = self.revoked_tokens.lock().unwrap();
        self.cleanup_expired_tokens_internal(&mut tokens)
    }

    fn cleanup_expired_tokens_internal(
        &self,
        tokens: &mut HashMap<String, (SystemTime, SystemTime)>,
    ) -> usize {
        let now = SystemTime::now();
        let before_count = tokens.len();

        // Keep entries whose expiration is still in the future
        tokens.retain(|_, (expiration, _)| now.duration_since(*expiration).is_err());

        let removed = before_count - tokens.len();
        if removed > 0 {
            debug!("Removed {} expired tokens from blacklist", removed);
        }

        removed
    }

    fn remove_oldest_entries(
        &self,
        tokens: &mut HashMap<String, (SystemTime, SystemTime)>,
        count: usize,
    ) {
        let mut entries: Vec<(String, SystemTime)> = tokens
            .iter()
            .map(|(k, (_, revoked_at))| (k.clone(), *revoked_at))
            .collect();

        // Oldest revocations first
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        for (key, _) in entries.iter().take(count) {
            tokens.remove(key.as_str());
        }

        debug!("Removed {} oldest entries from token blacklist", count);
    }
}

/// Get a reference to the global token blacklist
pub fn blacklist() -> &'static TokenBlacklist {
    &TOKEN_BLACKLIST
}

/// Start a background task to periodically clean up the token blacklist
///
/// Spawns a Tokio task that runs every hour to remove expired tokens.
/// Call during application startup.
pub fn start_cleanup_task() {
    use std::time::Duration;
    use tokio::time;

    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(3600);
        let mut interval = time::interval(cleanup_interval);

        loop {
            interval.tick().await;
            debug!("Running scheduled token blacklist cleanup");
            let removed = blacklist().cleanup_expired_tokens();
            debug!(
                "Removed {} expired tokens, {} remain in blacklist",
                removed,
                blacklist().size()
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_revoke_and_check_token() {
        let blacklist = TokenBlacklist::new();

        let expiration = SystemTime::now() + Duration::from_secs(1);
        blacklist.revoke_token("test-token-1", expiration);

        assert!(blacklist.is_revoked("test-token-1"));
        assert!(!blacklist.is_revoked("unknown-token"));
    }

    #[test]
    fn test_cleanup_expired_tokens() {
        let blacklist = TokenBlacklist::new();

        let expired = SystemTime::now() - Duration::from_secs(1);
        let not_expired = SystemTime::now() + Duration::from_secs(60);

        blacklist.revoke_token("expired-token", expired);
        blacklist.revoke_token("valid-token", not_expired);

        assert_eq!(blacklist.size(), 2);

        let removed = blacklist.cleanup_expired_tokens();

        assert_eq!(removed, 1);
        assert_eq!(blacklist.size(), 1);
        assert!(!blacklist.is_revoked("expired-token"));
        assert!(blacklist.is_revoked("valid-token"));
    }

    #[test]
    fn test_expired_entry_does_not_block() {
        let blacklist = TokenBlacklist::new();

        let expired = SystemTime::now() - Duration::from_secs(1);
        blacklist.revoke_token("stale-token", expired);

        // Still in the map until cleanup, but no longer blocking
        assert_eq!(blacklist.size(), 1);
        assert!(!blacklist.is_revoked("stale-token"));
    }

    #[test]
    fn test_clear_revocation() {
        let blacklist = TokenBlacklist::new();

        let expiration = SystemTime::now() + Duration::from_secs(60);
        blacklist.revoke_token("cleared-token", expiration);
        assert!(blacklist.is_revoked("cleared-token"));

        assert!(blacklist.clear_revocation("cleared-token"));
        assert!(!blacklist.is_revoked("cleared-token"));
        assert!(!blacklist.clear_revocation("cleared-token"));
    }

    #[test]
    fn test_max_size_and_oldest_removal() {
        let blacklist = TokenBlacklist::with_max_size(5);

        for i in 0..5 {
            let expiration = SystemTime::now() + Duration::from_secs(300);
            blacklist.revoke_token(&format!("token-{}", i), expiration);
            // Ensure distinct revocation times
            sleep(Duration::from_millis(10));
        }

        assert_eq!(blacklist.size(), 5);

        let expiration = SystemTime::now() + Duration::from_secs(300);
        blacklist.revoke_token("new-token", expiration);

        assert_eq!(blacklist.size(), 5);
        assert!(!blacklist.is_revoked("token-0"));
        assert!(blacklist.is_revoked("new-token"));
    }
}
