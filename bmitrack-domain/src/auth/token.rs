use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::env;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
use crate::auth::token_blacklist;
use crate::auth::Claims;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

impl TokenType {
    /// Get the expiration duration for this token type
    fn expiration(&self) -> Duration {
        match self {
            TokenType::Access => {
                let expiration_minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse::<i64>()
                    .unwrap_or(15);

                Duration::minutes(expiration_minutes)
            }
            TokenType::Refresh => {
                let expiration_days = env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse::<i64>()
                    .unwrap_or(7);

                Duration::days(expiration_days)
            }
        }
    }
}

/// Generate a new JWT token
pub fn generate_token(user_id: &str, token_type: TokenType) -> Result<String, SecurityError> {
    let jwt_secret = env::var("JWT_SECRET").map_err(|e| {
        error!("JWT_SECRET environment variable not found: {}", e);
        SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
    })?;

    let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "bmitrack-api".to_string());

    let now = Utc::now();
    let expiration = now + token_type.expiration();

    let claims = Claims {
        sub: user_id.to_string(),
        iss: issuer,
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation (but not the token itself)
    info!("Generated {:?} token for user {}", token_type, user_id);
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a JWT token and return the decoded claims
pub fn validate_token(token: &str) -> Result<Claims, SecurityError> {
    let jwt_secret = env::var("JWT_SECRET").map_err(|e| {
        error!("JWT_SECRET environment variable not found: {}", e);
        SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
    })?;

    let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "bmitrack-api".to_string());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_issuer(&[issuer]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    // Check if the user's tokens have been revoked
    if token_blacklist::blacklist().is_revoked(&token_data.claims.sub) {
        return Err(SecurityError::TokenRevoked);
    }

    Ok(token_data.claims)
}

/// Revoke a user's tokens
pub fn revoke_token(user_id: &str) -> Result<(), SecurityError> {
    info!("Revoking tokens for user {}", user_id);

    // Blacklist long enough to outlive any outstanding access token
    let expiration = std::time::SystemTime::now() + std::time::Duration::from_secs(86400);
    token_blacklist::blacklist().revoke_token(user_id, expiration);

    let event =
        AuthEvent::new(AuthEventType::TokenRevocation, Some(user_id), true).with_auth_method("jwt");
    log_auth_event(event);

    Ok(())
}

/// Lift a user's token revocation so newly issued tokens are accepted again
///
/// Called on a fresh login; without it a logout would lock the account
/// out until the blacklist entry expires.
pub fn clear_revocation(user_id: &str) {
    if token_blacklist::blacklist().clear_revocation(user_id) {
        info!("Cleared token revocation for user {}", user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_only");
        std::env::set_var("JWT_ISSUER", "test-issuer");
    }

    #[test]
    fn test_generate_and_validate_token() {
        setup_test_env();

        let user_id = "test-user-123";
        let token = generate_token(user_id, TokenType::Access).unwrap();

        assert!(!token.is_empty());

        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_token_expiration() {
        setup_test_env();

        let user_id = "test-user-456";

        // Encode a token with an expiration in the past
        let claims = Claims {
            sub: user_id.to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() - 3600,
        };

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or("test-secret".to_string());
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_bytes()),
        )
        .unwrap();

        let result = validate_token(&token);
        assert!(result.is_err(), "Token validation should fail for expired token");

        match result {
            Err(SecurityError::TokenExpired) => {}
            err => panic!("Expected TokenExpired error but got: {:?}", err),
        }
    }

    #[test]
    fn test_invalid_token() {
        setup_test_env();

        let result = validate_token("invalid.token.format");
        assert!(result.is_err());

        match result {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            _ => panic!("Expected InvalidToken or TokenValidation error"),
        }
    }

    #[test]
    fn test_revoked_token_rejected() {
        setup_test_env();

        let user_id = "revoked-user-789";
        let token = generate_token(user_id, TokenType::Access).unwrap();

        revoke_token(user_id).unwrap();

        let result = validate_token(&token);
        assert!(matches!(result, Err(SecurityError::TokenRevoked)));
    }

    #[test]
    fn test_clear_revocation_restores_access() {
        setup_test_env();

        let user_id = "relogin-user-321";
        revoke_token(user_id).unwrap();

        let rejected = generate_token(user_id, TokenType::Access).unwrap();
        assert!(matches!(
            validate_token(&rejected),
            Err(SecurityError::TokenRevoked)
        ));

        clear_revocation(user_id);

        let fresh = generate_token(user_id, TokenType::Access).unwrap();
        assert_eq!(validate_token(&fresh).unwrap().sub, user_id);
    }

    #[test]
    fn test_different_token_types() {
        setup_test_env();
        std::env::set_var("ACCESS_TOKEN_EXPIRATION_MINUTES", "15");
        std::env::set_var("REFRESH_TOKEN_EXPIRATION_DAYS", "7");

        assert_eq!(TokenType::Access.expiration(), Duration::minutes(15));
        assert_eq!(TokenType::Refresh.expiration(), Duration::days(7));
    }
}
