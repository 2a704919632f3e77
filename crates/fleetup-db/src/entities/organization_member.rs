//! OrganizationMember entity for tenant membership and roles
//!
//! The composite primary key (organization_id, user_id) makes "one role
//! per user per organization" a schema-level invariant rather than an
//! application check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a member within an organization, ordered by privilege:
/// owner > admin > collaborator > viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    /// Full control, including deletion and ownership transfer
    #[sea_orm(string_value = "owner")]
    Owner,

    /// Elevated permissions, including member and finance management
    #[sea_orm(string_value = "admin")]
    Admin,

    /// Can create operational records (trips) but not manage the org
    #[sea_orm(string_value = "collaborator")]
    Collaborator,

    /// Read-only access to non-sensitive records
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_members")]
pub struct Model {
    /// Organization UUID (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: Uuid,

    /// User UUID (composite primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,

    /// Role of the user in this organization
    pub role: OrgRole,

    /// Who invited this member (None for founding owners)
    pub invited_by: Option<Uuid>,

    /// When the user joined the organization
    pub joined_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Membership belongs to an organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Organization,

    /// Membership belongs to a user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
