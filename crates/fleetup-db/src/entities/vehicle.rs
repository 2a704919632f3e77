//! Vehicle entity (tenant-scoped)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operational status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "maintenance")]
    Maintenance,

    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    /// Vehicle UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization
    pub organization_id: Uuid,

    /// Display name
    pub name: String,

    /// License plate (optional)
    pub plate_number: Option<String>,

    pub brand: Option<String>,

    pub model: Option<String>,

    pub year: Option<i32>,

    /// Operational status
    pub status: VehicleStatus,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Vehicle belongs to an organization
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Organization,

    /// Vehicle has trips
    #[sea_orm(has_many = "super::trip::Entity")]
    Trips,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
