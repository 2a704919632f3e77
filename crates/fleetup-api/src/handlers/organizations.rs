//! Organization lifecycle handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_db::entities::{organization, organization_member, prelude::*};

use crate::handlers::{bad_request, conflict, db_error, require_permission, ApiError};
use crate::middleware::auth::AuthUser;
use crate::middleware::tenant::OrgContext;
use crate::models::*;
use crate::permissions::Permission;
use crate::AppState;

/// Derive a URL-safe slug from an organization name: lowercase, ASCII
/// alphanumerics, single dashes.
fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Create an organization; the creator becomes its owner
#[utoipa::path(
    post,
    path = "/api/orgs",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationDetails),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Slug already taken", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationDetails>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(bad_request("Organization name is required", "INVALID_NAME"));
    }

    let slug = match request.slug {
        Some(slug) => slug,
        None => generate_slug(&request.name),
    };

    if !is_valid_slug(&slug) {
        return Err(bad_request(
            "Slug must be lowercase letters, digits and dashes",
            "INVALID_SLUG",
        ));
    }

    let taken = Organization::find()
        .filter(organization::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    if taken.is_some() {
        return Err(conflict("Slug is already taken", "SLUG_TAKEN"));
    }

    let now = Utc::now();
    let org = organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(request.name.trim().to_string()),
        slug: Set(slug),
        logo_url: Set(None),
        settings: Set(serde_json::json!({})),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    organization_member::ActiveModel {
        organization_id: Set(org.id),
        user_id: Set(user.user_id),
        role: Set(organization_member::OrgRole::Owner),
        invited_by: Set(None),
        joined_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(org_id = %org.id, slug = %org.slug, owner = %user.user_id, "Organization created");

    Ok((StatusCode::CREATED, Json(org.into())))
}

/// Organization details
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Organization details", body = OrganizationDetails),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<OrganizationDetails>, ApiError> {
    require_permission(&ctx, Permission::OrgView)?;

    let org = Organization::find_by_id(ctx.organization_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| crate::handlers::not_found("Organization", "ORG_NOT_FOUND"))?;

    Ok(Json(org.into()))
}

/// Update organization attributes
#[utoipa::path(
    patch,
    path = "/api/orgs/{slug}",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationDetails),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<Json<OrganizationDetails>, ApiError> {
    require_permission(&ctx, Permission::OrgUpdate)?;

    let org = Organization::find_by_id(ctx.organization_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| crate::handlers::not_found("Organization", "ORG_NOT_FOUND"))?;

    let mut active: organization::ActiveModel = org.into();

    if let Some(name) = request.name {
        if name.trim().is_empty() {
            return Err(bad_request("Organization name is required", "INVALID_NAME"));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(logo_url) = request.logo_url {
        active.logo_url = Set(Some(logo_url));
    }
    if let Some(settings) = request.settings {
        active.settings = Set(settings);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(updated.into()))
}

/// Delete an organization and everything it owns
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<StatusCode, ApiError> {
    require_permission(&ctx, Permission::OrgDelete)?;

    Organization::delete_by_id(ctx.organization_id)
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    info!(org_id = %ctx.organization_id, slug = %ctx.organization_slug, "Organization deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_lowercases_and_dashes() {
        assert_eq!(generate_slug("Acme Logistics"), "acme-logistics");
        assert_eq!(generate_slug("  Fleet  2026  "), "fleet-2026");
        assert_eq!(generate_slug("über_fast GmbH"), "ber-fast-gmbh");
    }

    #[test]
    fn test_generate_slug_strips_edge_dashes() {
        assert_eq!(generate_slug("--Acme--"), "acme");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("acme-logistics-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug("-acme"));
        assert!(!is_valid_slug("acme-"));
        assert!(!is_valid_slug("acme logistics"));
    }
}
