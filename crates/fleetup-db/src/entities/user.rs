//! User entity for authentication and account management

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// User email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// User's full name (optional)
    pub full_name: Option<String>,

    /// Cross-tenant administrative capability. Never settable through the
    /// public API; flipped out-of-band by operators.
    pub is_super_admin: bool,

    /// Whether the account is active
    pub is_active: bool,

    /// When the account was created
    pub created_at: ChronoDateTimeUtc,

    /// When the account was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User is a member of organizations
    #[sea_orm(has_many = "super::organization_member::Entity")]
    Memberships,

    /// Impersonation sessions started by this user (super admins only)
    #[sea_orm(has_many = "super::impersonation_log::Entity")]
    ImpersonationLogs,
}

impl Related<super::organization_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::impersonation_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImpersonationLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
