//! Organization entity, the unit of tenancy
//!
//! Every feature record belongs to exactly one organization. The slug is
//! the URL-safe identifier used for tenant resolution in routes; it is
//! generated lowercase at creation and compared exactly at lookup time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Organization UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Organization display name
    pub name: String,

    /// Organization slug (unique, URL-friendly)
    #[sea_orm(unique)]
    pub slug: String,

    /// Logo URL (optional)
    pub logo_url: Option<String>,

    /// Arbitrary per-organization settings blob
    pub settings: Json,

    /// When the organization was created
    pub created_at: ChronoDateTimeUtc,

    /// When the organization was last updated
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Organization has members
    #[sea_orm(has_many = "super::organization_member::Entity")]
    Members,

    /// Organization has pending invitations
    #[sea_orm(has_many = "super::invitation::Entity")]
    Invitations,

    /// Impersonation sessions targeting this organization
    #[sea_orm(has_many = "super::impersonation_log::Entity")]
    ImpersonationLogs,

    /// Organization owns vehicles
    #[sea_orm(has_many = "super::vehicle::Entity")]
    Vehicles,

    /// Organization owns trips
    #[sea_orm(has_many = "super::trip::Entity")]
    Trips,

    /// Organization owns financial transactions
    #[sea_orm(has_many = "super::financial_transaction::Entity")]
    FinancialTransactions,
}

impl Related<super::organization_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::invitation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invitations.def()
    }
}

impl Related<super::impersonation_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImpersonationLogs.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::financial_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
