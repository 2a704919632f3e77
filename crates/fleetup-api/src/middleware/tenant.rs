//! Tenant resolution middleware, the core of the request gate
//!
//! Every route under `/api/orgs/{slug}` passes through [`resolve_org`],
//! which turns the slug plus the authenticated principal into an
//! [`OrgContext`] request extension. That extension is the only channel
//! through which feature handlers learn "which tenant, which role";
//! handlers never re-derive membership themselves.
//!
//! Resolution order:
//! 1. organization by slug (exact, case-sensitive),
//! 2. membership by (organization, user),
//! 3. failing that, a signed impersonation token naming this exact slug
//!    and bound to this user,
//! 4. failing that, deny with the same 404 an unknown slug produces, so
//!    responses never reveal whether an organization exists.

use axum::{
    extract::{RawPathParams, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use fleetup_auth::{JwtClaims, TOKEN_TYPE_IMPERSONATION};
use fleetup_db::entities::{organization, prelude::*};

use crate::cookies;
use crate::handlers::db_error;
use crate::middleware::auth::AuthUser;
use crate::models::ErrorResponse;
use crate::permissions::{has_permission, is_role_at_least, OrgRole, Permission};
use crate::AppState;

/// Tenant context attached to every in-scope request.
///
/// `role` is `None` exactly when `impersonating` is true: impersonation
/// is its own elevated, audit-logged context, never a forged membership.
#[derive(Debug, Clone, Serialize)]
pub struct OrgContext {
    /// Resolved organization UUID
    pub organization_id: Uuid,
    /// Resolved organization slug
    pub organization_slug: String,
    /// Membership role, if the principal is a member
    pub role: Option<OrgRole>,
    /// Whether this context comes from a super-admin impersonation
    pub impersonating: bool,
}

impl OrgContext {
    /// Permission check for downstream feature code.
    ///
    /// An impersonating super admin passes every check; otherwise the
    /// static permission table decides.
    pub fn can(&self, permission: Permission) -> bool {
        self.impersonating || has_permission(self.role, permission)
    }

    /// Role-threshold check for downstream feature code.
    pub fn is_at_least(&self, threshold: OrgRole) -> bool {
        self.impersonating || is_role_at_least(self.role, threshold)
    }
}

/// The indistinguishable "unknown slug or no access" response.
fn org_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Organization not found".to_string(),
            code: Some("ORG_NOT_FOUND".to_string()),
        }),
    )
}

/// Validated impersonation claims from the signed cookie, if any.
pub(crate) fn impersonation_claims(state: &AppState, headers: &HeaderMap) -> Option<JwtClaims> {
    let token = cookies::get(headers, cookies::IMPERSONATION_COOKIE)?;
    let claims = state.validator.validate(token).ok()?;

    if claims.token_type.as_deref() == Some(TOKEN_TYPE_IMPERSONATION) {
        Some(claims)
    } else {
        None
    }
}

/// Tenant resolution middleware.
///
/// Must run after [`super::auth::require_auth`].
pub async fn resolve_org(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    params: RawPathParams,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let slug = params
        .iter()
        .find(|(name, _)| *name == "slug")
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Tenant route without a slug segment".to_string(),
                    code: Some("MISSING_SLUG".to_string()),
                }),
            )
        })?;

    // Slugs are generated lowercase; lookup is exact, no normalization
    let org = Organization::find()
        .filter(organization::Column::Slug.eq(slug.as_str()))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(org_not_found)?;

    let membership = OrganizationMember::find_by_id((org.id, user.user_id))
        .one(&state.db)
        .await
        .map_err(db_error)?;

    let ctx = match membership {
        Some(membership) => OrgContext {
            organization_id: org.id,
            organization_slug: org.slug.clone(),
            role: Some(membership.role.into()),
            impersonating: false,
        },
        None => {
            // No membership row: the only remaining path is an active
            // impersonation session naming this exact slug and bound to
            // this user.
            let claims = impersonation_claims(&state, request.headers());
            let matches = claims.as_ref().is_some_and(|c| {
                c.org_slug.as_deref() == Some(slug.as_str()) && c.sub == user.user_id.to_string()
            });

            if !matches {
                warn!(user_id = %user.user_id, slug = %slug, "Tenant access denied");
                return Err(org_not_found());
            }

            debug!(user_id = %user.user_id, slug = %slug, "Impersonated tenant access");

            OrgContext {
                organization_id: org.id,
                organization_slug: org.slug.clone(),
                role: None,
                impersonating: true,
            }
        }
    };

    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_ctx(role: OrgRole) -> OrgContext {
        OrgContext {
            organization_id: Uuid::new_v4(),
            organization_slug: "acme".to_string(),
            role: Some(role),
            impersonating: false,
        }
    }

    #[test]
    fn test_member_context_uses_permission_table() {
        let viewer = member_ctx(OrgRole::Viewer);

        assert!(viewer.can(Permission::VehiclesView));
        assert!(!viewer.can(Permission::VehiclesCreate));
        assert!(!viewer.can(Permission::FinancesView));

        let admin = member_ctx(OrgRole::Admin);
        assert!(admin.can(Permission::VehiclesCreate));
        assert!(admin.can(Permission::FinancesView));
        assert!(!admin.can(Permission::OrgDelete));
    }

    #[test]
    fn test_impersonation_context_is_elevated() {
        let ctx = OrgContext {
            organization_id: Uuid::new_v4(),
            organization_slug: "acme".to_string(),
            role: None,
            impersonating: true,
        };

        for &permission in Permission::ALL {
            assert!(ctx.can(permission));
        }
        assert!(ctx.is_at_least(OrgRole::Owner));
    }

    #[test]
    fn test_roleless_context_without_impersonation_is_denied() {
        let ctx = OrgContext {
            organization_id: Uuid::new_v4(),
            organization_slug: "acme".to_string(),
            role: None,
            impersonating: false,
        };

        for &permission in Permission::ALL {
            assert!(!ctx.can(permission));
        }
        assert!(!ctx.is_at_least(OrgRole::Viewer));
    }
}
