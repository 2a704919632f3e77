//! Super-admin verification middleware
//!
//! Guards the `/api/admin` surface. The `is_super_admin` flag is
//! re-queried from the users table on every request; a client-supplied
//! claim is never trusted for cross-tenant capability, and a revoked
//! flag takes effect immediately.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use sea_orm::EntityTrait;
use std::sync::Arc;
use tracing::warn;

use fleetup_db::entities::prelude::User;

use crate::handlers::db_error;
use crate::middleware::auth::AuthUser;
use crate::models::ErrorResponse;
use crate::AppState;

/// Require a storage-verified super admin.
///
/// Must run after [`super::auth::require_auth`]; failure is a 403, the
/// API equivalent of the unauthorized page.
pub async fn require_super_admin(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let account = User::find_by_id(user.user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    match account {
        Some(account) if account.is_super_admin && account.is_active => Ok(next.run(request).await),
        Some(_) => {
            warn!(user_id = %user.user_id, path = %request.uri().path(), "Admin route denied");
            Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "Super admin access required".to_string(),
                    code: Some("SUPER_ADMIN_REQUIRED".to_string()),
                }),
            ))
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Account no longer exists".to_string(),
                code: Some("ACCOUNT_GONE".to_string()),
            }),
        )),
    }
}
