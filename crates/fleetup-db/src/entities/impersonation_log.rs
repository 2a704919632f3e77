//! ImpersonationLog entity: durable audit trail for super-admin access
//!
//! One row per impersonation session. `ended_at = NULL` means the session
//! is open; at most one open row may exist per (super_admin_id,
//! organization_id) pair. Rows are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "impersonation_logs")]
pub struct Model {
    /// Log entry UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// The super admin who impersonated
    pub super_admin_id: Uuid,

    /// The organization that was impersonated
    pub organization_id: Uuid,

    /// When the impersonation session started
    pub started_at: ChronoDateTimeUtc,

    /// When the session ended; NULL while still active
    pub ended_at: Option<ChronoDateTimeUtc>,

    /// Client IP the session was started from
    pub ip_address: Option<String>,

    /// Client user agent the session was started from
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Log entry belongs to the impersonating super admin
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SuperAdminId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SuperAdmin,

    /// Log entry belongs to the impersonated organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Organization,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SuperAdmin.def()
    }
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
