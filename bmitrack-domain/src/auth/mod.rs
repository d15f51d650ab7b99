//! Authentication module for the BmiTrack API
//!
//! Provides mock credential-based authentication backed by the in-memory
//! user store, plus JWT middleware for securing API endpoints.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use validator::Validate;

use crate::auth::logging::{
    log_auth_event, log_failed_login, log_logout, log_registration, log_successful_login,
    log_token_refresh, AuthEvent, AuthEventType,
};

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

// JWT handling
pub mod token;

// Token blacklist for revocation
pub mod token_blacklist;

// Structured auth event logging
pub mod logging;

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// User information extracted from authenticated requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserInfo {
    /// User ID
    pub user_id: String,
    /// User roles
    pub roles: Vec<String>,
    /// User email (if available)
    pub email: Option<String>,
    /// User display name (if available)
    pub name: Option<String>,
    /// Authentication source (e.g., "jwt", "password")
    pub auth_source: String,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Password
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginResponse {
    /// JWT access token
    pub access_token: String,
    /// JWT refresh token
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// User information
    pub user: UserInfo,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterRequest {
    /// Account email, must be unique
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,

    /// Password, at least 5 characters
    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    pub password: String,

    /// Optional display name
    pub name: Option<String>,
}

/// Registration response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterResponse {
    /// Newly created user ID
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Status message
    pub message: String,
}

/// Authentication middleware for protected routes
#[cfg(feature = "with-axum")]
pub async fn auth_middleware<S>(_state: State<S>, mut req: Request<Body>, next: Next) -> Response {
    let request_path = req.uri().path().to_string();

    // Extract the token from the Authorization header
    let auth_header = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(auth_str) => auth_str,
            Err(_) => {
                warn!("Invalid Authorization header format for {}", request_path);

                let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                    .with_details("Invalid Authorization header format")
                    .with_auth_method("jwt");
                log_auth_event(event);

                return Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .body(Body::empty())
                    .unwrap_or_default();
            }
        },
        None => {
            debug!("Missing Authorization header for {}", request_path);

            let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details("Missing Authorization header")
                .with_auth_method("jwt");
            log_auth_event(event);

            return Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .body(Body::empty())
                .unwrap_or_default();
        }
    };

    // Check if it's a Bearer token
    if !auth_header.starts_with("Bearer ") {
        warn!("Authorization header does not contain Bearer token");

        let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
            .with_details("Authorization header does not contain Bearer token")
            .with_auth_method("jwt");
        log_auth_event(event);

        return Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(Body::empty())
            .unwrap_or_default();
    }

    let token = &auth_header[7..]; // Skip "Bearer " prefix

    match token::validate_token(token) {
        Ok(claims) => {
            debug!("Token validated for user: {}", claims.sub);

            let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), true)
                .with_auth_method("jwt");
            log_auth_event(event);

            // Enrich from the user store when the account is known
            let stored = bmi_track_data::repository::user_store()
                .find_by_id(&claims.sub)
                .ok()
                .flatten();

            let user_info = UserInfo {
                user_id: claims.sub.clone(),
                roles: vec!["user".to_string()],
                email: stored.as_ref().map(|u| u.email.clone()),
                name: stored.and_then(|u| u.name),
                auth_source: "jwt".to_string(),
            };

            req.extensions_mut().insert(user_info);
            req.extensions_mut().insert(claims);

            next.run(req).await
        }
        Err(e) => {
            warn!("Token validation failed: {}", e);

            let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
                .with_details(format!("Token validation failed: {}", e))
                .with_auth_method("jwt");
            log_auth_event(event);

            Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .body(Body::empty())
                .unwrap_or_default()
        }
    }
}

/// Configure authentication for the application
#[cfg(all(feature = "with-axum", feature = "with-web"))]
pub fn configure_auth(app: axum::Router) -> axum::Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::set_header::SetResponseHeaderLayer;

    let auth_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            header::HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; script-src 'self'; connect-src 'self'; img-src 'self' data:; style-src 'self' 'unsafe-inline'; font-src 'self'; frame-ancestors 'none'; form-action 'self'; base-uri 'self'",
            ),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            axum::http::HeaderName::from_static("referrer-policy"),
            header::HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(auth_cors).layer(security_headers)
}

/// Auth info endpoint
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    get,
    path = "/auth/info",
    responses(
        (status = 200, description = "Authentication information", body = serde_json::Value)
    ),
    tag = "Authentication",
    security(
        ("jwt_auth" = [])
    )
))]
pub async fn auth_info(Extension(user_info): Extension<UserInfo>) -> axum::Json<serde_json::Value> {
    use serde_json::json;
    axum::Json(json!({
        "message": "Authentication info",
        "user_id": user_info.user_id,
        "email": user_info.email,
        "name": user_info.name,
        "roles": user_info.roles,
        "status": "authenticated"
    }))
}

/// Refresh token endpoint
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed successfully", body = serde_json::Value),
        (status = 401, description = "Invalid refresh token", body = serde_json::Value)
    ),
    request_body(
        content = serde_json::Value,
        description = "No body required. Send the refresh token in the Authorization header as a Bearer token.",
        content_type = "application/json"
    ),
    tag = "Authentication"
))]
pub async fn refresh_token(
    headers: axum::http::HeaderMap,
) -> Result<axum::Json<serde_json::Value>, (StatusCode, axum::Json<serde_json::Value>)> {
    use serde_json::json;

    let auth_header = match headers.get(header::AUTHORIZATION) {
        Some(value) => match value.to_str() {
            Ok(auth_str) => auth_str,
            Err(_) => {
                let event = AuthEvent::new(AuthEventType::TokenRefresh, None, false)
                    .with_details("Invalid Authorization header format")
                    .with_auth_method("refresh_token");
                log_auth_event(event);

                return Err((
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({
                        "error": "invalid_request",
                        "error_description": "Invalid Authorization header format"
                    })),
                ));
            }
        },
        None => {
            let event = AuthEvent::new(AuthEventType::TokenRefresh, None, false)
                .with_details("Missing Authorization header")
                .with_auth_method("refresh_token");
            log_auth_event(event);

            return Err((
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({
                    "error": "invalid_request",
                    "error_description": "Missing Authorization header"
                })),
            ));
        }
    };

    if !auth_header.starts_with("Bearer ") {
        let event = AuthEvent::new(AuthEventType::TokenRefresh, None, false)
            .with_details("Authorization header must start with Bearer")
            .with_auth_method("refresh_token");
        log_auth_event(event);

        return Err((
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({
                "error": "invalid_request",
                "error_description": "Authorization header must start with Bearer"
            })),
        ));
    }

    let refresh_token = &auth_header[7..];

    match token::validate_token(refresh_token) {
        Ok(claims) => {
            debug!("Refresh token valid for user: {}", claims.sub);

            match token::generate_token(&claims.sub, token::TokenType::Access) {
                Ok(new_token) => {
                    log_token_refresh(&claims.sub, true, None);

                    Ok(axum::Json(json!({
                        "access_token": new_token,
                        "token_type": "Bearer",
                        "expires_in": 900, // 15 minutes in seconds
                        "user_id": claims.sub
                    })))
                }
                Err(e) => {
                    error!("Failed to generate new access token: {}", e);
                    log_token_refresh(
                        &claims.sub,
                        false,
                        Some(&format!("Failed to generate new token: {}", e)),
                    );

                    Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(json!({
                            "error": "server_error",
                            "error_description": "Failed to generate new token"
                        })),
                    ))
                }
            }
        }
        Err(e) => {
            warn!("Invalid refresh token: {}", e);

            let event = AuthEvent::new(AuthEventType::TokenRefresh, None, false)
                .with_details(format!("Invalid or expired refresh token: {}", e))
                .with_auth_method("refresh_token");
            log_auth_event(event);

            Err((
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({
                    "error": "invalid_token",
                    "error_description": "Invalid or expired refresh token"
                })),
            ))
        }
    }
}

/// Logout endpoint
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out successfully", body = serde_json::Value),
        (status = 401, description = "Not authenticated", body = serde_json::Value)
    ),
    tag = "Authentication",
    security(
        ("jwt_auth" = [])
    )
))]
pub async fn logout(Extension(user_info): Extension<UserInfo>) -> axum::Json<serde_json::Value> {
    use serde_json::json;

    if let Err(e) = token::revoke_token(&user_info.user_id) {
        error!("Failed to revoke token: {}", e);
    }

    log_logout(&user_info.user_id);

    axum::Json(json!({
        "message": "Logged out successfully",
        "status": "success"
    }))
}

/// Login endpoint - authenticate against the in-memory user store
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful. Use the returned access_token in the Authorization header as 'Bearer {token}' for authenticated requests.", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    operation_id = "login"
))]
pub async fn login(
    axum::Json(login_req): axum::Json<LoginRequest>,
) -> Result<axum::Json<LoginResponse>, (StatusCode, axum::Json<serde_json::Value>)> {
    use serde_json::json;

    let account = match bmi_track_data::repository::user_store().find_by_email(&login_req.email) {
        Ok(account) => account,
        Err(e) => {
            error!("User store lookup failed: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "Internal server error" })),
            ));
        }
    };

    // Plain-text comparison: credentials are mock fixtures, not real secrets
    let account = match account {
        Some(account) if account.password == login_req.password => account,
        _ => {
            log_failed_login(&login_req.email, "Invalid email or password");

            return Err((
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({ "error": "Invalid email or password" })),
            ));
        }
    };

    // A fresh login lifts any revocation left by a previous logout
    token::clear_revocation(&account.id);

    let access_token = match token::generate_token(&account.id, token::TokenType::Access) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate access token: {}", e);

            let event = AuthEvent::new(AuthEventType::Login, Some(&account.id), false)
                .with_details(format!("Failed to generate token: {}", e))
                .with_auth_method("password");
            log_auth_event(event);

            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "Failed to generate token" })),
            ));
        }
    };

    let refresh_token = match token::generate_token(&account.id, token::TokenType::Refresh) {
        Ok(token) => token,
        Err(e) => {
            error!("Failed to generate refresh token: {}", e);

            let event = AuthEvent::new(AuthEventType::Login, Some(&account.id), false)
                .with_details(format!("Failed to generate refresh token: {}", e))
                .with_auth_method("password");
            log_auth_event(event);

            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "Failed to generate token" })),
            ));
        }
    };

    let user_info = UserInfo {
        user_id: account.id.clone(),
        roles: vec!["user".to_string()],
        email: Some(account.email.clone()),
        name: account.name.clone(),
        auth_source: "password".to_string(),
    };

    let response = LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        user: user_info,
    };

    log_successful_login(&account.id);

    Ok(axum::Json(response))
}

/// Registration endpoint - create a new account in the in-memory user store
#[cfg(feature = "with-axum")]
#[cfg_attr(feature = "with-api", utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    operation_id = "register"
))]
pub async fn register(
    axum::Json(register_req): axum::Json<RegisterRequest>,
) -> Result<(StatusCode, axum::Json<RegisterResponse>), (StatusCode, axum::Json<serde_json::Value>)>
{
    use bmi_track_data::models::user::UserRecord;
    use serde_json::json;

    if let Err(validation_errors) = register_req.validate() {
        let error_messages: Vec<String> = validation_errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.clone().unwrap_or_default()
                    )
                })
            })
            .collect();

        return Err((
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "Validation error",
                "details": error_messages
            })),
        ));
    }

    let record = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        email: register_req.email.clone(),
        password: register_req.password.clone(),
        name: register_req.name.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    match bmi_track_data::repository::user_store().insert(record.clone()) {
        Ok(_) => {
            log_registration(&record.id, true, None);

            Ok((
                StatusCode::CREATED,
                axum::Json(RegisterResponse {
                    user_id: record.id,
                    email: record.email,
                    message: "Account created".to_string(),
                }),
            ))
        }
        Err(bmi_track_data::repository::RepositoryError::Conflict(_)) => {
            log_registration(&register_req.email, false, Some("Email already registered"));

            Err((
                StatusCode::CONFLICT,
                axum::Json(json!({ "error": "Email already registered" })),
            ))
        }
        Err(e) => {
            error!("Failed to store new account: {}", e);

            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "Internal server error" })),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_middleware_exists() {
        let _func = auth_middleware::<()>;
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "someone@example.com".to_string(),
            password: "longenough".to_string(),
            name: None,
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            name: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "someone@example.com".to_string(),
            password: "abc".to_string(),
            name: None,
        };
        assert!(short_password.validate().is_err());
    }
}
