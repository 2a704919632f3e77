//! API request handlers, one module per feature area

pub mod admin;
pub mod auth;
pub mod finance;
pub mod impersonation;
pub mod invitations;
pub mod members;
pub mod organizations;
pub mod trips;
pub mod vehicles;

use axum::{http::StatusCode, Json};
use sea_orm::DbErr;
use tracing::error;

use crate::middleware::tenant::OrgContext;
use crate::models::{ErrorResponse, HealthResponse};
use crate::permissions::Permission;

/// Shorthand for the error half of every handler result.
pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

/// Storage failures fail closed as opaque 500s; details go to the log,
/// never to the client.
pub(crate) fn db_error(err: DbErr) -> ApiError {
    error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Database error".to_string(),
            code: Some("DATABASE_ERROR".to_string()),
        }),
    )
}

pub(crate) fn not_found(what: &str, code: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{} not found", what),
            code: Some(code.to_string()),
        }),
    )
}

pub(crate) fn bad_request(message: &str, code: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: Some(code.to_string()),
        }),
    )
}

pub(crate) fn conflict(message: &str, code: &str) -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: message.to_string(),
            code: Some(code.to_string()),
        }),
    )
}

/// Gate for sensitive actions: the permission table for members, the
/// elevated impersonation context for super admins, 403 for everyone
/// else. Feature handlers call this before every mutating or sensitive
/// operation, so a forged direct request fails even if the UI hid the
/// button.
pub(crate) fn require_permission(ctx: &OrgContext, permission: Permission) -> Result<(), ApiError> {
    if ctx.can(permission) {
        return Ok(());
    }

    Err((
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: format!("Missing '{}' permission", permission),
            code: Some("FORBIDDEN".to_string()),
        }),
    ))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
