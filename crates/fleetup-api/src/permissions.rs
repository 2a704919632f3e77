//! Role & permission table
//!
//! A static mapping from (permission, role) to allow/deny. Permissions
//! are a closed enumeration organized by feature area; each maps to the
//! set of roles allowed via a `match` over the enum, so a typo in a role
//! or permission name is a compile error rather than a silent deny.
//!
//! Every function here is pure and total: a missing role (`None`, i.e.
//! unauthenticated or no membership) is always denied and nothing ever
//! panics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use fleetup_db::entities::organization_member;

/// Role of a member within an organization.
///
/// Totally ordered by privilege: owner > admin > collaborator > viewer.
/// This is the API-facing twin of the stored
/// [`organization_member::OrgRole`]; conversions at the gate boundary
/// keep the permission table free of persistence concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    /// Full control, including deletion and ownership transfer
    Owner,
    /// Elevated permissions, including member and finance management
    Admin,
    /// Can create operational records but not manage the organization
    Collaborator,
    /// Read-only access to non-sensitive records
    Viewer,
}

impl OrgRole {
    /// Privilege rank used by [`is_role_at_least`].
    fn rank(self) -> u8 {
        match self {
            OrgRole::Owner => 4,
            OrgRole::Admin => 3,
            OrgRole::Collaborator => 2,
            OrgRole::Viewer => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrgRole::Owner => "owner",
            OrgRole::Admin => "admin",
            OrgRole::Collaborator => "collaborator",
            OrgRole::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<organization_member::OrgRole> for OrgRole {
    fn from(role: organization_member::OrgRole) -> Self {
        match role {
            organization_member::OrgRole::Owner => OrgRole::Owner,
            organization_member::OrgRole::Admin => OrgRole::Admin,
            organization_member::OrgRole::Collaborator => OrgRole::Collaborator,
            organization_member::OrgRole::Viewer => OrgRole::Viewer,
        }
    }
}

impl From<OrgRole> for organization_member::OrgRole {
    fn from(role: OrgRole) -> Self {
        match role {
            OrgRole::Owner => organization_member::OrgRole::Owner,
            OrgRole::Admin => organization_member::OrgRole::Admin,
            OrgRole::Collaborator => organization_member::OrgRole::Collaborator,
            OrgRole::Viewer => organization_member::OrgRole::Viewer,
        }
    }
}

/// A named capability, organized by feature area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    // Organization
    OrgView,
    OrgUpdate,
    OrgDelete,
    OrgInvite,
    OrgManageMembers,

    // Vehicles
    VehiclesView,
    VehiclesCreate,
    VehiclesUpdate,
    VehiclesDelete,

    // Trips
    TripsView,
    TripsCreate,
    TripsUpdate,
    TripsDelete,

    // Maintenance
    MaintenanceView,
    MaintenanceCreate,
    MaintenanceUpdate,
    MaintenanceDelete,

    // Finances (sensitive - restricted)
    FinancesView,
    FinancesCreate,
    FinancesUpdate,
    FinancesDelete,

    // Contacts
    ContactsView,
    ContactsCreate,
    ContactsUpdate,
    ContactsDelete,
}

const ALL_ROLES: &[OrgRole] = &[
    OrgRole::Viewer,
    OrgRole::Collaborator,
    OrgRole::Admin,
    OrgRole::Owner,
];
const COLLABORATOR_UP: &[OrgRole] = &[OrgRole::Collaborator, OrgRole::Admin, OrgRole::Owner];
const ADMIN_UP: &[OrgRole] = &[OrgRole::Admin, OrgRole::Owner];
const OWNER_ONLY: &[OrgRole] = &[OrgRole::Owner];

impl Permission {
    /// Every permission in the table, for enumeration.
    pub const ALL: &[Permission] = &[
        Permission::OrgView,
        Permission::OrgUpdate,
        Permission::OrgDelete,
        Permission::OrgInvite,
        Permission::OrgManageMembers,
        Permission::VehiclesView,
        Permission::VehiclesCreate,
        Permission::VehiclesUpdate,
        Permission::VehiclesDelete,
        Permission::TripsView,
        Permission::TripsCreate,
        Permission::TripsUpdate,
        Permission::TripsDelete,
        Permission::MaintenanceView,
        Permission::MaintenanceCreate,
        Permission::MaintenanceUpdate,
        Permission::MaintenanceDelete,
        Permission::FinancesView,
        Permission::FinancesCreate,
        Permission::FinancesUpdate,
        Permission::FinancesDelete,
        Permission::ContactsView,
        Permission::ContactsCreate,
        Permission::ContactsUpdate,
        Permission::ContactsDelete,
    ];

    /// The set of roles allowed to exercise this permission.
    ///
    /// Finance permissions are deliberately restricted to admin/owner for
    /// reads as well as writes: financial data is sensitive, distinct
    /// from general resource visibility.
    pub fn allowed_roles(self) -> &'static [OrgRole] {
        match self {
            Permission::OrgView => ALL_ROLES,
            Permission::OrgUpdate => ADMIN_UP,
            Permission::OrgDelete => OWNER_ONLY,
            Permission::OrgInvite => ADMIN_UP,
            Permission::OrgManageMembers => ADMIN_UP,

            Permission::VehiclesView => ALL_ROLES,
            Permission::VehiclesCreate => ADMIN_UP,
            Permission::VehiclesUpdate => ADMIN_UP,
            Permission::VehiclesDelete => OWNER_ONLY,

            Permission::TripsView => ALL_ROLES,
            Permission::TripsCreate => COLLABORATOR_UP,
            Permission::TripsUpdate => COLLABORATOR_UP,
            Permission::TripsDelete => ADMIN_UP,

            Permission::MaintenanceView => ALL_ROLES,
            Permission::MaintenanceCreate => COLLABORATOR_UP,
            Permission::MaintenanceUpdate => ADMIN_UP,
            Permission::MaintenanceDelete => OWNER_ONLY,

            Permission::FinancesView => ADMIN_UP,
            Permission::FinancesCreate => ADMIN_UP,
            Permission::FinancesUpdate => ADMIN_UP,
            Permission::FinancesDelete => OWNER_ONLY,

            Permission::ContactsView => ALL_ROLES,
            Permission::ContactsCreate => COLLABORATOR_UP,
            Permission::ContactsUpdate => ADMIN_UP,
            Permission::ContactsDelete => ADMIN_UP,
        }
    }

    /// Wire name of the permission, e.g. `finances:view`.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::OrgView => "org:view",
            Permission::OrgUpdate => "org:update",
            Permission::OrgDelete => "org:delete",
            Permission::OrgInvite => "org:invite",
            Permission::OrgManageMembers => "org:manage_members",
            Permission::VehiclesView => "vehicles:view",
            Permission::VehiclesCreate => "vehicles:create",
            Permission::VehiclesUpdate => "vehicles:update",
            Permission::VehiclesDelete => "vehicles:delete",
            Permission::TripsView => "trips:view",
            Permission::TripsCreate => "trips:create",
            Permission::TripsUpdate => "trips:update",
            Permission::TripsDelete => "trips:delete",
            Permission::MaintenanceView => "maintenance:view",
            Permission::MaintenanceCreate => "maintenance:create",
            Permission::MaintenanceUpdate => "maintenance:update",
            Permission::MaintenanceDelete => "maintenance:delete",
            Permission::FinancesView => "finances:view",
            Permission::FinancesCreate => "finances:create",
            Permission::FinancesUpdate => "finances:update",
            Permission::FinancesDelete => "finances:delete",
            Permission::ContactsView => "contacts:view",
            Permission::ContactsCreate => "contacts:create",
            Permission::ContactsUpdate => "contacts:update",
            Permission::ContactsDelete => "contacts:delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a role has a specific permission. `None` is always denied.
pub fn has_permission(role: Option<OrgRole>, permission: Permission) -> bool {
    match role {
        Some(role) => permission.allowed_roles().contains(&role),
        None => false,
    }
}

/// Check if `role` is equal or higher than `threshold` in the privilege
/// order. `None` is always below every threshold.
pub fn is_role_at_least(role: Option<OrgRole>, threshold: OrgRole) -> bool {
    match role {
        Some(role) => role.rank() >= threshold.rank(),
        None => false,
    }
}

/// All permissions granted to a role.
pub fn permissions_for_role(role: OrgRole) -> Vec<Permission> {
    Permission::ALL
        .iter()
        .copied()
        .filter(|p| p.allowed_roles().contains(&role))
        .collect()
}

/// Check multiple permissions (true if ALL are allowed).
pub fn has_all_permissions(role: Option<OrgRole>, permissions: &[Permission]) -> bool {
    permissions.iter().all(|&p| has_permission(role, p))
}

/// Check multiple permissions (true if ANY is allowed).
pub fn has_any_permission(role: Option<OrgRole>, permissions: &[Permission]) -> bool {
    permissions.iter().any(|&p| has_permission(role, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [OrgRole; 4] = [
        OrgRole::Owner,
        OrgRole::Admin,
        OrgRole::Collaborator,
        OrgRole::Viewer,
    ];

    #[test]
    fn test_missing_role_is_denied_everything() {
        for &permission in Permission::ALL {
            assert!(
                !has_permission(None, permission),
                "None must be denied {}",
                permission
            );
        }
    }

    #[test]
    fn test_owner_has_every_permission() {
        for &permission in Permission::ALL {
            assert!(has_permission(Some(OrgRole::Owner), permission));
        }
        assert_eq!(
            permissions_for_role(OrgRole::Owner).len(),
            Permission::ALL.len()
        );
    }

    #[test]
    fn test_role_order_is_reflexive_and_total() {
        for role in ROLES {
            assert!(is_role_at_least(Some(role), role));
        }

        assert!(is_role_at_least(Some(OrgRole::Owner), OrgRole::Admin));
        assert!(is_role_at_least(Some(OrgRole::Admin), OrgRole::Collaborator));
        assert!(is_role_at_least(
            Some(OrgRole::Collaborator),
            OrgRole::Viewer
        ));

        assert!(!is_role_at_least(Some(OrgRole::Viewer), OrgRole::Collaborator));
        assert!(!is_role_at_least(Some(OrgRole::Admin), OrgRole::Owner));
        assert!(!is_role_at_least(None, OrgRole::Viewer));
    }

    #[test]
    fn test_grants_widen_with_rank() {
        // A permission granted to a role is granted to every higher role
        for &permission in Permission::ALL {
            for role in ROLES {
                if has_permission(Some(role), permission) {
                    for higher in ROLES {
                        if is_role_at_least(Some(higher), role) {
                            assert!(
                                has_permission(Some(higher), permission),
                                "{} granted to {} but not {}",
                                permission,
                                role,
                                higher
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_finance_reads_are_restricted() {
        // Most view permissions are open to all four roles; finances are
        // not
        assert!(has_permission(Some(OrgRole::Viewer), Permission::VehiclesView));
        assert!(has_permission(Some(OrgRole::Viewer), Permission::TripsView));

        assert!(!has_permission(Some(OrgRole::Viewer), Permission::FinancesView));
        assert!(!has_permission(
            Some(OrgRole::Collaborator),
            Permission::FinancesView
        ));
        assert!(has_permission(Some(OrgRole::Admin), Permission::FinancesView));
    }

    #[test]
    fn test_viewer_cannot_create_vehicles() {
        assert!(!has_permission(
            Some(OrgRole::Viewer),
            Permission::VehiclesCreate
        ));
        assert!(!has_permission(
            Some(OrgRole::Collaborator),
            Permission::VehiclesCreate
        ));
        assert!(has_permission(Some(OrgRole::Admin), Permission::VehiclesCreate));
    }

    #[test]
    fn test_collaborator_can_create_trips() {
        assert!(has_permission(
            Some(OrgRole::Collaborator),
            Permission::TripsCreate
        ));
        assert!(!has_permission(Some(OrgRole::Viewer), Permission::TripsCreate));
    }

    #[test]
    fn test_batch_checks() {
        let batch = [Permission::TripsView, Permission::TripsCreate];

        assert!(has_all_permissions(Some(OrgRole::Collaborator), &batch));
        assert!(!has_all_permissions(Some(OrgRole::Viewer), &batch));
        assert!(has_any_permission(Some(OrgRole::Viewer), &batch));
        assert!(!has_any_permission(None, &batch));
        assert!(has_all_permissions(Some(OrgRole::Viewer), &[]));
        assert!(!has_any_permission(Some(OrgRole::Owner), &[]));
    }

    #[test]
    fn test_role_conversions_round_trip() {
        use fleetup_db::entities::organization_member;

        for role in ROLES {
            let stored: organization_member::OrgRole = role.into();
            let back: OrgRole = stored.into();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Permission::OrgManageMembers.as_str(), "org:manage_members");
        assert_eq!(Permission::FinancesView.as_str(), "finances:view");
        assert_eq!(OrgRole::Collaborator.as_str(), "collaborator");
    }
}
