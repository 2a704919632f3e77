//! Invitation handlers for staged membership creation
//!
//! An invitation carries a single-use token and an expiry; acceptance is
//! what actually creates the membership row. Email delivery is out of
//! scope: the token is returned to the inviter to share out-of-band.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_db::entities::{
    invitation, invitation::InvitationStatus, organization_member, prelude::*,
};

use crate::handlers::{bad_request, conflict, db_error, not_found, require_permission, ApiError};
use crate::middleware::auth::AuthUser;
use crate::middleware::tenant::OrgContext;
use crate::models::*;
use crate::permissions::{OrgRole, Permission};
use crate::AppState;

/// How long an invitation stays acceptable.
const INVITATION_TTL_DAYS: i64 = 7;

/// Lazily expire a pending invitation that has passed its deadline.
///
/// Expiry is only decided when the invitation is touched; there is no
/// background sweep.
async fn expire_if_due(
    state: &AppState,
    invitation: invitation::Model,
) -> Result<invitation::Model, ApiError> {
    if invitation.status == InvitationStatus::Pending && invitation.expires_at <= Utc::now() {
        let mut active: invitation::ActiveModel = invitation.into();
        active.status = Set(InvitationStatus::Expired);
        return active.update(&state.db).await.map_err(db_error);
    }
    Ok(invitation)
}

/// Invite a member by email
#[utoipa::path(
    post,
    path = "/api/orgs/{slug}/invitations",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created", body = InvitationInfo),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationInfo>), ApiError> {
    require_permission(&ctx, Permission::OrgInvite)?;

    if !request.email.contains('@') {
        return Err(bad_request("Invalid email address", "INVALID_EMAIL"));
    }

    let now = Utc::now();
    let created = invitation::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(ctx.organization_id),
        email: Set(request.email.clone()),
        role: Set(request.role.into()),
        token: Set(Uuid::new_v4().to_string()),
        invited_by: Set(user.user_id),
        status: Set(InvitationStatus::Pending),
        expires_at: Set(now + Duration::days(INVITATION_TTL_DAYS)),
        accepted_at: Set(None),
        created_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(
        org_id = %ctx.organization_id,
        email = %created.email,
        "Invitation created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Invitations of the organization
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}/invitations",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Invitation list", body = InvitationList),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<InvitationList>, ApiError> {
    require_permission(&ctx, Permission::OrgInvite)?;

    let rows = Invitation::find()
        .filter(invitation::Column::OrganizationId.eq(ctx.organization_id))
        .order_by_desc(invitation::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let invitations: Vec<InvitationInfo> = rows.into_iter().map(Into::into).collect();
    let total = invitations.len();

    Ok(Json(InvitationList { invitations, total }))
}

/// Cancel a pending invitation
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}/invitations/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Invitation id")
    ),
    responses(
        (status = 200, description = "Invitation cancelled", body = InvitationInfo),
        (status = 400, description = "Invitation is not pending", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn cancel_invitation(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> Result<Json<InvitationInfo>, ApiError> {
    require_permission(&ctx, Permission::OrgInvite)?;

    let found = Invitation::find_by_id(id)
        .filter(invitation::Column::OrganizationId.eq(ctx.organization_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Invitation", "INVITATION_NOT_FOUND"))?;

    let found = expire_if_due(&state, found).await?;

    if found.status != InvitationStatus::Pending {
        return Err(bad_request(
            "Only pending invitations can be cancelled",
            "INVITATION_NOT_PENDING",
        ));
    }

    let mut active: invitation::ActiveModel = found.into();
    active.status = Set(InvitationStatus::Cancelled);
    let cancelled = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(cancelled.into()))
}

/// What an invitee sees before accepting (public, token is the secret)
#[utoipa::path(
    get,
    path = "/api/invitations/{token}",
    params(
        ("token" = String, Path, description = "Invitation token")
    ),
    responses(
        (status = 200, description = "Invitation preview", body = InvitationPreview),
        (status = 404, description = "Invitation not found", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn preview_invitation(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<InvitationPreview>, ApiError> {
    let found = Invitation::find()
        .filter(invitation::Column::Token.eq(token.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Invitation", "INVITATION_NOT_FOUND"))?;

    let found = expire_if_due(&state, found).await?;

    let org = Organization::find_by_id(found.organization_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Invitation", "INVITATION_NOT_FOUND"))?;

    Ok(Json(InvitationPreview {
        organization_name: org.name,
        email: found.email,
        role: found.role.into(),
        status: found.status.into(),
        expires_at: found.expires_at,
    }))
}

/// Accept an invitation as the current user
#[utoipa::path(
    post,
    path = "/api/invitations/{token}/accept",
    params(
        ("token" = String, Path, description = "Invitation token")
    ),
    responses(
        (status = 200, description = "Membership created", body = AcceptInvitationResponse),
        (status = 400, description = "Invitation expired or not pending", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(token): Path<String>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    let found = Invitation::find()
        .filter(invitation::Column::Token.eq(token.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Invitation", "INVITATION_NOT_FOUND"))?;

    let found = expire_if_due(&state, found).await?;

    match found.status {
        InvitationStatus::Pending => {}
        InvitationStatus::Expired => {
            return Err(bad_request("Invitation has expired", "INVITATION_EXPIRED"));
        }
        InvitationStatus::Accepted | InvitationStatus::Cancelled => {
            return Err(bad_request(
                "Invitation is no longer pending",
                "INVITATION_NOT_PENDING",
            ));
        }
    }

    let existing = OrganizationMember::find_by_id((found.organization_id, user.user_id))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    if existing.is_some() {
        return Err(conflict(
            "Already a member of this organization",
            "ALREADY_MEMBER",
        ));
    }

    let now = Utc::now();
    let membership = organization_member::ActiveModel {
        organization_id: Set(found.organization_id),
        user_id: Set(user.user_id),
        role: Set(found.role),
        invited_by: Set(Some(found.invited_by)),
        joined_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    let role: OrgRole = membership.role.into();

    let mut active: invitation::ActiveModel = found.into();
    active.status = Set(InvitationStatus::Accepted);
    active.accepted_at = Set(Some(now));
    let accepted = active.update(&state.db).await.map_err(db_error)?;

    let org = Organization::find_by_id(accepted.organization_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Organization", "ORG_NOT_FOUND"))?;

    info!(
        org_id = %org.id,
        user_id = %user.user_id,
        "Invitation accepted"
    );

    Ok(Json(AcceptInvitationResponse {
        organization: org.into(),
        role,
    }))
}
