//! Authentication handlers: signup, login, logout, current user

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_auth::{hash_password, verify_password, JwtClaims, JwtValidator, TOKEN_TYPE_SESSION};
use fleetup_db::entities::{organization_member, prelude::*, user};

use crate::cookies;
use crate::handlers::{bad_request, db_error, ApiError};
use crate::middleware::auth::{AuthUser, SESSION_TTL_HOURS, TOKEN_AUDIENCE, TOKEN_ISSUER};
use crate::models::*;
use crate::AppState;

/// Issue a session token for a user.
fn issue_session(
    state: &AppState,
    account: &user::Model,
) -> Result<(String, chrono::DateTime<Utc>), ApiError> {
    let validity = Duration::hours(SESSION_TTL_HOURS);
    let expires_at = Utc::now() + validity;

    let claims = JwtClaims::new(
        account.id.to_string(),
        TOKEN_ISSUER.to_string(),
        TOKEN_AUDIENCE.to_string(),
        validity,
    )
    .with_token_type(TOKEN_TYPE_SESSION)
    .with_email(account.email.clone());

    let token = JwtValidator::encode(state.jwt_secret.as_bytes(), &claims).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to issue session token".to_string(),
                code: Some("TOKEN_ISSUE_FAILED".to_string()),
            }),
        )
    })?;

    Ok((token, expires_at))
}

/// Attach a session cookie to a response.
fn with_session_cookie(mut response: Response, state: &AppState, token: &str) -> Response {
    let cookie = cookies::build(
        cookies::SESSION_COOKIE,
        token,
        SESSION_TTL_HOURS * 3600,
        state.secure_cookies,
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// The slug root of the most recently joined organization, or
/// `/onboarding` with no memberships. Tie-break is explicit: latest
/// `joined_at` wins.
async fn post_login_redirect(state: &AppState, user_id: Uuid) -> Result<String, ApiError> {
    let latest = OrganizationMember::find()
        .filter(organization_member::Column::UserId.eq(user_id))
        .find_also_related(Organization)
        .order_by_desc(organization_member::Column::JoinedAt)
        .limit(1)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    Ok(match latest.and_then(|(_, org)| org) {
        Some(org) => format!("/{}", org.slug),
        None => "/onboarding".to_string(),
    })
}

/// Public authentication configuration
#[utoipa::path(
    get,
    path = "/api/auth/config",
    responses(
        (status = 200, description = "Authentication configuration", body = AuthConfig)
    ),
    tag = "auth"
)]
pub async fn auth_config(State(state): State<Arc<AppState>>) -> Json<AuthConfig> {
    Json(AuthConfig {
        allow_signup: state.allow_signup,
    })
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Signup disabled", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    if !state.allow_signup {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Self-service signup is disabled".to_string(),
                code: Some("SIGNUP_DISABLED".to_string()),
            }),
        ));
    }

    if !request.email.contains('@') {
        return Err(bad_request("Invalid email address", "INVALID_EMAIL"));
    }

    if request.password.len() < 8 {
        return Err(bad_request(
            "Password must be at least 8 characters",
            "WEAK_PASSWORD",
        ));
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    if existing.is_some() {
        return Err(bad_request("Email is already registered", "EMAIL_EXISTS"));
    }

    let password_hash = hash_password(&request.password).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to hash password".to_string(),
                code: Some("HASHING_FAILED".to_string()),
            }),
        )
    })?;

    let now = Utc::now();
    let account = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(request.email.clone()),
        password_hash: Set(password_hash),
        full_name: Set(request.full_name.clone()),
        is_super_admin: Set(false),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(user_id = %account.id, "User registered");

    let (token, expires_at) = issue_session(&state, &account)?;

    let body = RegisterResponse {
        user: account.into(),
        token: token.clone(),
        expires_at,
    };

    let response = (StatusCode::CREATED, Json(body)).into_response();
    Ok(with_session_cookie(response, &state, &token))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid email or password".to_string(),
                code: Some("INVALID_CREDENTIALS".to_string()),
            }),
        )
    };

    let account = User::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(invalid_credentials)?;

    let valid = verify_password(&request.password, &account.password_hash)
        .map_err(|_| invalid_credentials())?;

    if !valid || !account.is_active {
        return Err(invalid_credentials());
    }

    let (token, expires_at) = issue_session(&state, &account)?;
    let redirect_to = post_login_redirect(&state, account.id).await?;

    info!(user_id = %account.id, "User logged in");

    let body = LoginResponse {
        user: account.into(),
        token: token.clone(),
        expires_at,
        redirect_to,
    };

    let response = (StatusCode::OK, Json(body)).into_response();
    Ok(with_session_cookie(response, &state, &token))
}

/// Log out: clear the session and any impersonation state
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Logged out")
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();

    // An impersonation session must never outlive the login that
    // started it
    for cleared in [
        cookies::clear(cookies::SESSION_COOKIE, state.secure_cookies),
        cookies::clear(cookies::IMPERSONATION_COOKIE, state.secure_cookies),
    ] {
        if let Ok(value) = HeaderValue::from_str(&cleared) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let account = User::find_by_id(user.user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Account no longer exists".to_string(),
                code: Some("ACCOUNT_GONE".to_string()),
            }),
        ))?;

    Ok(Json(account.into()))
}

/// Organizations the current user belongs to
#[utoipa::path(
    get,
    path = "/api/auth/organizations",
    responses(
        (status = 200, description = "Memberships of the current user", body = MembershipList),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn list_user_organizations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MembershipList>, ApiError> {
    let memberships = OrganizationMember::find()
        .filter(organization_member::Column::UserId.eq(user.user_id))
        .find_also_related(Organization)
        .order_by_desc(organization_member::Column::JoinedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let organizations: Vec<MembershipSummary> = memberships
        .into_iter()
        .filter_map(|(membership, org)| {
            org.map(|org| MembershipSummary {
                organization: org.into(),
                role: membership.role.into(),
                joined_at: membership.joined_at,
            })
        })
        .collect();

    let total = organizations.len();

    Ok(Json(MembershipList {
        organizations,
        total,
    }))
}
