//! Member management handlers
//!
//! Role changes and removals both enforce the sole-owner invariant: an
//! organization must always retain at least one owner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_db::entities::{organization_member, organization_member::OrgRole, prelude::*};

use crate::handlers::{bad_request, db_error, not_found, require_permission, ApiError};
use crate::middleware::tenant::OrgContext;
use crate::models::*;
use crate::permissions::Permission;
use crate::AppState;

async fn count_owners(state: &AppState, organization_id: Uuid) -> Result<u64, ApiError> {
    OrganizationMember::find()
        .filter(organization_member::Column::OrganizationId.eq(organization_id))
        .filter(organization_member::Column::Role.eq(OrgRole::Owner))
        .count(&state.db)
        .await
        .map_err(db_error)
}

/// Members of the organization
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}/members",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Member list", body = MemberList),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<MemberList>, ApiError> {
    require_permission(&ctx, Permission::OrgView)?;

    let rows = OrganizationMember::find()
        .filter(organization_member::Column::OrganizationId.eq(ctx.organization_id))
        .find_also_related(User)
        .order_by_asc(organization_member::Column::JoinedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let members: Vec<Member> = rows
        .into_iter()
        .filter_map(|(membership, account)| {
            account.map(|account| Member {
                user_id: membership.user_id,
                email: account.email,
                full_name: account.full_name,
                role: membership.role.into(),
                joined_at: membership.joined_at,
            })
        })
        .collect();

    let total = members.len();

    Ok(Json(MemberList { members, total }))
}

/// Change a member's role
#[utoipa::path(
    patch,
    path = "/api/orgs/{slug}/members/{user_id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("user_id" = Uuid, Path, description = "Member user id")
    ),
    request_body = UpdateMemberRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Member),
        (status = 400, description = "Would demote the only owner", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn update_member_role(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, user_id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<Json<Member>, ApiError> {
    require_permission(&ctx, Permission::OrgManageMembers)?;

    let membership = OrganizationMember::find_by_id((ctx.organization_id, user_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Member", "MEMBER_NOT_FOUND"))?;

    let new_role: OrgRole = request.role.into();

    // Demoting the last owner would leave the organization unmanageable
    if membership.role == OrgRole::Owner
        && new_role != OrgRole::Owner
        && count_owners(&state, ctx.organization_id).await? == 1
    {
        return Err(bad_request(
            "Cannot demote the only owner",
            "LAST_OWNER",
        ));
    }

    let account = membership
        .find_related(User)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Member", "MEMBER_NOT_FOUND"))?;

    let mut active: organization_member::ActiveModel = membership.into();
    active.role = Set(new_role);
    let updated = active.update(&state.db).await.map_err(db_error)?;

    info!(
        org_id = %ctx.organization_id,
        user_id = %user_id,
        role = %crate::permissions::OrgRole::from(updated.role),
        "Member role updated"
    );

    Ok(Json(Member {
        user_id: updated.user_id,
        email: account.email,
        full_name: account.full_name,
        role: updated.role.into(),
        joined_at: updated.joined_at,
    }))
}

/// Remove a member from the organization
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}/members/{user_id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("user_id" = Uuid, Path, description = "Member user id")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Would remove the only owner", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    tag = "members"
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, user_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_permission(&ctx, Permission::OrgManageMembers)?;

    let membership = OrganizationMember::find_by_id((ctx.organization_id, user_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Member", "MEMBER_NOT_FOUND"))?;

    if membership.role == OrgRole::Owner && count_owners(&state, ctx.organization_id).await? == 1 {
        return Err(bad_request(
            "Cannot remove the only owner",
            "LAST_OWNER",
        ));
    }

    membership.delete(&state.db).await.map_err(db_error)?;

    info!(org_id = %ctx.organization_id, user_id = %user_id, "Member removed");

    Ok(StatusCode::NO_CONTENT)
}
