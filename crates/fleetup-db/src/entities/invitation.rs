//! Invitation entity, a staged membership creation
//!
//! Invitations are not enforcement: acceptance creates the membership
//! row, and only that row grants access.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::organization_member::OrgRole;

/// Lifecycle of an invitation. `Accepted`, `Expired` and `Cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "accepted")]
    Accepted,

    #[sea_orm(string_value = "expired")]
    Expired,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    /// Invitation UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Organization the invitation grants access to
    pub organization_id: Uuid,

    /// Email address the invitation was issued for
    pub email: String,

    /// Role granted on acceptance
    pub role: OrgRole,

    /// Single-use acceptance token
    #[sea_orm(unique)]
    pub token: String,

    /// Member who issued the invitation
    pub invited_by: Uuid,

    /// Current lifecycle state
    pub status: InvitationStatus,

    /// When the invitation stops being acceptable
    pub expires_at: ChronoDateTimeUtc,

    /// When the invitation was accepted (if it was)
    pub accepted_at: Option<ChronoDateTimeUtc>,

    /// When the invitation was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Invitation belongs to an organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
