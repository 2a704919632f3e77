//! Super-admin surface: cross-tenant listings
//!
//! Everything here sits behind the admin gate, which re-verifies the
//! `is_super_admin` flag from storage per request.

use axum::{extract::State, Extension, Json};
use sea_orm::{EntityTrait, QueryOrder};
use std::sync::Arc;
use tracing::debug;

use fleetup_db::entities::{impersonation_log, organization, prelude::*};

use crate::handlers::{db_error, ApiError};
use crate::middleware::auth::AuthUser;
use crate::models::*;
use crate::AppState;

/// All organizations (cross-tenant)
#[utoipa::path(
    get,
    path = "/api/admin/organizations",
    responses(
        (status = 200, description = "All organizations", body = OrganizationList),
        (status = 403, description = "Not a super admin", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_all_organizations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<OrganizationList>, ApiError> {
    debug!(super_admin_id = %user.user_id, "Listing all organizations");

    let rows = Organization::find()
        .order_by_asc(organization::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let organizations: Vec<OrganizationDetails> = rows.into_iter().map(Into::into).collect();
    let total = organizations.len();

    Ok(Json(OrganizationList {
        organizations,
        total,
    }))
}

/// Impersonation audit trail, most recent first
#[utoipa::path(
    get,
    path = "/api/admin/impersonation/logs",
    responses(
        (status = 200, description = "Impersonation audit entries", body = ImpersonationLogList),
        (status = 403, description = "Not a super admin", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_impersonation_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ImpersonationLogList>, ApiError> {
    debug!(super_admin_id = %user.user_id, "Listing impersonation logs");

    let rows = ImpersonationLog::find()
        .order_by_desc(impersonation_log::Column::StartedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let logs: Vec<ImpersonationLogEntry> = rows.into_iter().map(Into::into).collect();
    let total = logs.len();

    Ok(Json(ImpersonationLogList { logs, total }))
}
