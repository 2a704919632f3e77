//! Session resolution middleware
//!
//! Extracts the session JWT from the HTTP-only cookie (preferred) or the
//! `Authorization: Bearer` header, validates it, and injects an
//! [`AuthUser`] into request extensions. Cookie-borne sessions past half
//! their lifetime are transparently rotated: a fresh token is issued and
//! appended to the response as a new `Set-Cookie`, so an active user
//! never hits a hard expiry.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use fleetup_auth::{JwtClaims, JwtValidator, TOKEN_TYPE_SESSION};

use crate::cookies;
use crate::models::ErrorResponse;

/// Issuer claim stamped into every token this API signs.
pub const TOKEN_ISSUER: &str = "fleetup-api";
/// Audience claim stamped into every token this API signs.
pub const TOKEN_AUDIENCE: &str = "fleetup-web";

/// How long a session token is valid.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Authenticated principal extracted from the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// User UUID
    pub user_id: Uuid,
    /// Account email, if the token carried it
    pub email: Option<String>,
}

/// Session validation state shared across middleware instances
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<JwtValidator>,
    secret: String,
    secure_cookies: bool,
}

impl AuthState {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret.as_bytes())),
            secret: secret.to_string(),
            secure_cookies,
        }
    }
}

fn unauthenticated(message: &str, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: format!("{}. Log in at /api/auth/login", message),
            code: Some(code.to_string()),
        }),
    )
}

/// Authentication middleware that validates session tokens
///
/// # Requirements
/// - Token must be present in the `session_token` cookie or the
///   `Authorization: Bearer <token>` header
/// - Token must be valid (signature + expiration)
/// - Token type must be `session` (impersonation tokens are not a login)
///
/// # Errors
/// Returns 401 Unauthorized (with the login path as a hint) if any of
/// the above fails. The failure is final for the request: no protected
/// handler runs.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // Try the cookie first (preferred for the web app)
    let cookie_token = cookies::get(request.headers(), cookies::SESSION_COOKIE).map(str::to_string);
    let from_cookie = cookie_token.is_some();

    // Fall back to the Authorization header (for API clients)
    let token = match cookie_token {
        Some(t) => t,
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    unauthenticated(
                        "Missing authentication token (cookie or Authorization header)",
                        "MISSING_AUTH",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    unauthenticated(
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                        "INVALID_AUTH_FORMAT",
                    )
                })?
                .to_string()
        }
    };

    // Validate signature and expiration
    let claims = state
        .validator
        .validate(&token)
        .map_err(|e| unauthenticated(&format!("Invalid or expired token: {}", e), "INVALID_TOKEN"))?;

    // Only session tokens authenticate a request
    match claims.token_type.as_deref() {
        Some(TOKEN_TYPE_SESSION) => {}
        Some(other) => {
            return Err(unauthenticated(
                &format!("Invalid token type '{}'. Expected 'session'", other),
                "INVALID_TOKEN_TYPE",
            ));
        }
        None => {
            return Err(unauthenticated(
                "Token missing 'token_type' claim",
                "MISSING_TOKEN_TYPE",
            ));
        }
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| unauthenticated("Token subject is not a user id", "INVALID_SUBJECT"))?;

    let auth_user = AuthUser {
        user_id,
        email: claims.email.clone(),
    };

    request.extensions_mut().insert(auth_user);

    // Rotate cookie-borne sessions once they pass half their lifetime
    let rotate = from_cookie && claims.remaining_secs() * 2 < claims.lifetime_secs();

    let mut response = next.run(request).await;

    if rotate {
        let fresh = JwtClaims::new(
            claims.sub,
            TOKEN_ISSUER.to_string(),
            TOKEN_AUDIENCE.to_string(),
            Duration::hours(SESSION_TTL_HOURS),
        )
        .with_token_type(TOKEN_TYPE_SESSION);
        let fresh = match claims.email {
            Some(email) => fresh.with_email(email),
            None => fresh,
        };

        // Rotation is best-effort: the current token is still valid, so a
        // failure here must not fail the request
        if let Ok(fresh_token) = JwtValidator::encode(state.secret.as_bytes(), &fresh) {
            let cookie = cookies::build(
                cookies::SESSION_COOKIE,
                &fresh_token,
                SESSION_TTL_HOURS * 3600,
                state.secure_cookies,
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }

    Ok(response)
}
