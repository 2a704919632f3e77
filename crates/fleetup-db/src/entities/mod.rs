//! Database entities

pub mod financial_transaction;
pub mod impersonation_log;
pub mod invitation;
pub mod organization;
pub mod organization_member;
pub mod trip;
pub mod user;
pub mod vehicle;

pub use financial_transaction::Entity as FinancialTransaction;
pub use impersonation_log::Entity as ImpersonationLog;
pub use invitation::Entity as Invitation;
pub use organization::Entity as Organization;
pub use organization_member::Entity as OrganizationMember;
pub use trip::Entity as Trip;
pub use user::Entity as User;
pub use vehicle::Entity as Vehicle;

pub mod prelude {
    pub use super::financial_transaction::Entity as FinancialTransaction;
    pub use super::impersonation_log::Entity as ImpersonationLog;
    pub use super::invitation::Entity as Invitation;
    pub use super::organization::Entity as Organization;
    pub use super::organization_member::Entity as OrganizationMember;
    pub use super::trip::Entity as Trip;
    pub use super::user::Entity as User;
    pub use super::vehicle::Entity as Vehicle;
}
