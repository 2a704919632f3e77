//! FinancialTransaction entity (tenant-scoped, sensitive)
//!
//! Access is restricted to admins and owners by the permission table,
//! including reads.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "income")]
    Income,

    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_transactions")]
pub struct Model {
    /// Transaction UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization
    pub organization_id: Uuid,

    /// Income or expense
    pub transaction_type: TransactionType,

    /// Amount in the organization's currency
    pub amount: f64,

    pub description: Option<String>,

    /// When the transaction occurred
    pub occurred_at: ChronoDateTimeUtc,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Transaction belongs to an organization
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
