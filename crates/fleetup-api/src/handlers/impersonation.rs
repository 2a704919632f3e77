//! Super-admin impersonation handlers
//!
//! Impersonation lets a flagged super admin act inside an organization
//! without holding a membership there. Sessions are time-boxed to four
//! hours by a signed HTTP-only cookie and every session leaves a durable
//! audit row. Starting is super-admin-only (the flag is re-verified from
//! storage by the admin gate); stopping and status work for any
//! authenticated caller and are idempotent.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_auth::{JwtClaims, JwtValidator, TOKEN_TYPE_IMPERSONATION};
use fleetup_db::entities::{impersonation_log, organization, prelude::*};

use crate::cookies;
use crate::handlers::{db_error, not_found, ApiError};
use crate::middleware::auth::{AuthUser, TOKEN_AUDIENCE, TOKEN_ISSUER};
use crate::middleware::tenant::impersonation_claims;
use crate::models::*;
use crate::AppState;

/// Absolute lifetime of an impersonation session.
const IMPERSONATION_TTL_HOURS: i64 = 4;

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn client_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// The open audit row for (admin, organization), if one exists.
async fn find_open_log(
    state: &AppState,
    super_admin_id: Uuid,
    organization_id: Uuid,
) -> Result<Option<impersonation_log::Model>, ApiError> {
    ImpersonationLog::find()
        .filter(impersonation_log::Column::SuperAdminId.eq(super_admin_id))
        .filter(impersonation_log::Column::OrganizationId.eq(organization_id))
        .filter(impersonation_log::Column::EndedAt.is_null())
        .order_by_desc(impersonation_log::Column::StartedAt)
        .one(&state.db)
        .await
        .map_err(db_error)
}

/// Start impersonating an organization
///
/// Routed behind the super-admin gate, which re-verifies the
/// `is_super_admin` flag from storage on every request. The audit row is
/// written before the session cookie is issued; if an open row already
/// exists for this (admin, organization) pair it is re-used, so the
/// at-most-one-active invariant holds and rows orphaned by a crash
/// between the two steps heal on the next start.
#[utoipa::path(
    post,
    path = "/api/admin/impersonation",
    request_body = StartImpersonationRequest,
    responses(
        (status = 200, description = "Impersonation started", body = ImpersonationStatus),
        (status = 403, description = "Not a super admin", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "impersonation"
)]
pub async fn start_impersonation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    Json(request): Json<StartImpersonationRequest>,
) -> Result<Response, ApiError> {
    let org = Organization::find()
        .filter(organization::Column::Slug.eq(request.slug.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Organization", "ORG_NOT_FOUND"))?;

    // Audit first, cookie second
    if find_open_log(&state, user.user_id, org.id).await?.is_none() {
        impersonation_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            super_admin_id: Set(user.user_id),
            organization_id: Set(org.id),
            started_at: Set(Utc::now()),
            ended_at: Set(None),
            ip_address: Set(client_ip(&headers)),
            user_agent: Set(client_user_agent(&headers)),
        }
        .insert(&state.db)
        .await
        .map_err(db_error)?;
    }

    let claims = JwtClaims::new(
        user.user_id.to_string(),
        TOKEN_ISSUER.to_string(),
        TOKEN_AUDIENCE.to_string(),
        Duration::hours(IMPERSONATION_TTL_HOURS),
    )
    .with_token_type(TOKEN_TYPE_IMPERSONATION)
    .with_impersonated_org(org.slug.clone(), org.id.to_string());

    let token = JwtValidator::encode(state.jwt_secret.as_bytes(), &claims).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to issue impersonation token".to_string(),
                code: Some("TOKEN_ISSUE_FAILED".to_string()),
            }),
        )
    })?;

    info!(
        super_admin_id = %user.user_id,
        org_id = %org.id,
        slug = %org.slug,
        "Impersonation started"
    );

    let body = ImpersonationStatus {
        is_impersonating: true,
        organization: Some(org.into()),
    };

    let mut response = (StatusCode::OK, Json(body)).into_response();
    let cookie = cookies::build(
        cookies::IMPERSONATION_COOKIE,
        &token,
        IMPERSONATION_TTL_HOURS * 3600,
        state.secure_cookies,
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Stop impersonating
///
/// Closes the most recent open audit row for (caller, impersonated
/// organization) and clears the session cookie. Stopping twice, or with
/// no active session, is a successful no-op.
#[utoipa::path(
    delete,
    path = "/api/impersonation",
    responses(
        (status = 200, description = "Impersonation stopped", body = ImpersonationStatus)
    ),
    tag = "impersonation"
)]
pub async fn stop_impersonation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let claims = impersonation_claims(&state, &headers)
        .filter(|c| c.sub == user.user_id.to_string());

    if let Some(org_id) = claims
        .and_then(|c| c.org_id)
        .and_then(|id| Uuid::parse_str(&id).ok())
    {
        if let Some(open) = find_open_log(&state, user.user_id, org_id).await? {
            let mut active: impersonation_log::ActiveModel = open.into();
            active.ended_at = Set(Some(Utc::now()));
            active.update(&state.db).await.map_err(db_error)?;

            info!(
                super_admin_id = %user.user_id,
                org_id = %org_id,
                "Impersonation stopped"
            );
        }
    }

    let body = ImpersonationStatus {
        is_impersonating: false,
        organization: None,
    };

    // The cookie goes away even when no audit row was found
    let mut response = (StatusCode::OK, Json(body)).into_response();
    let cleared = cookies::clear(cookies::IMPERSONATION_COOKIE, state.secure_cookies);
    if let Ok(value) = HeaderValue::from_str(&cleared) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Current impersonation status
///
/// Reads only the signed session state and re-fetches the organization
/// live: name and settings may have changed since the session started,
/// so the snapshot embedded at start time is never returned.
#[utoipa::path(
    get,
    path = "/api/impersonation",
    responses(
        (status = 200, description = "Impersonation status", body = ImpersonationStatus)
    ),
    tag = "impersonation"
)]
pub async fn impersonation_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<Json<ImpersonationStatus>, ApiError> {
    let not_impersonating = ImpersonationStatus {
        is_impersonating: false,
        organization: None,
    };

    let Some(claims) = impersonation_claims(&state, &headers)
        .filter(|c| c.sub == user.user_id.to_string())
    else {
        return Ok(Json(not_impersonating));
    };

    let Some(slug) = claims.org_slug else {
        return Ok(Json(not_impersonating));
    };

    let org = Organization::find()
        .filter(organization::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(match org {
        Some(org) => ImpersonationStatus {
            is_impersonating: true,
            organization: Some(org.into()),
        },
        None => not_impersonating,
    }))
}
