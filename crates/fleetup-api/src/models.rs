//! API request/response models
//!
//! Wire DTOs are kept separate from the SeaORM entities; conversions
//! from storage models live next to the DTO they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use fleetup_db::entities::{
    financial_transaction, impersonation_log, invitation, organization, trip, user, vehicle,
};

use crate::permissions::OrgRole;

/// Error response returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

// ============================================================================
// Authentication Models
// ============================================================================

/// Public authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthConfig {
    /// Whether self-service signup is enabled
    pub allow_signup: bool,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// User email address (must be unique)
    pub email: String,
    /// User password (minimum 8 characters)
    pub password: String,
    /// User full name (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// User registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Newly created user
    pub user: UserProfile,
    /// Session token (also set as an HTTP-only cookie)
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User email address
    pub email: String,
    /// User password
    pub password: String,
}

/// User login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Logged in user
    pub user: UserProfile,
    /// Session token (also set as an HTTP-only cookie)
    pub token: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Where the client should navigate next: the slug root of the most
    /// recently joined organization, or `/onboarding` with none
    pub redirect_to: String,
}

/// User account information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    /// User UUID
    pub id: Uuid,
    /// User email
    pub email: String,
    /// User full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Display-only hint for the admin UI; enforcement always re-reads
    /// the flag from storage
    pub is_super_admin: bool,
    /// Whether the account is active
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            is_super_admin: model.is_super_admin,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

// ============================================================================
// Organization Models
// ============================================================================

/// Compact organization representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationSummary {
    /// Organization UUID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL-safe unique identifier
    pub slug: String,
    /// Logo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl From<organization::Model> for OrganizationSummary {
    fn from(model: organization::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            logo_url: model.logo_url,
        }
    }
}

/// Full organization representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationDetails {
    /// Organization UUID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// URL-safe unique identifier
    pub slug: String,
    /// Logo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Per-organization settings blob
    pub settings: Value,
    /// When the organization was created
    pub created_at: DateTime<Utc>,
    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<organization::Model> for OrganizationDetails {
    fn from(model: organization::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            logo_url: model.logo_url,
            settings: model.settings,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Request to create an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    /// Display name
    pub name: String,
    /// Optional explicit slug; generated from the name when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Request to update an organization
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrganizationRequest {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New logo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Replacement settings blob
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

/// List of organizations (admin surface)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationList {
    pub organizations: Vec<OrganizationDetails>,
    pub total: usize,
}

/// One membership of the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipSummary {
    /// The organization
    pub organization: OrganizationSummary,
    /// The caller's role in it
    pub role: OrgRole,
    /// When the caller joined
    pub joined_at: DateTime<Utc>,
}

/// Memberships of the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipList {
    pub organizations: Vec<MembershipSummary>,
    pub total: usize,
}

// ============================================================================
// Member Models
// ============================================================================

/// A member of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Member {
    /// User UUID
    pub user_id: Uuid,
    /// Account email
    pub email: String,
    /// Account full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Role within the organization
    pub role: OrgRole,
    /// When the member joined
    pub joined_at: DateTime<Utc>,
}

/// Members of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberList {
    pub members: Vec<Member>,
    pub total: usize,
}

/// Request to change a member's role
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMemberRoleRequest {
    /// The new role
    pub role: OrgRole,
}

// ============================================================================
// Invitation Models
// ============================================================================

/// Lifecycle state of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl From<invitation::InvitationStatus> for InvitationStatus {
    fn from(status: invitation::InvitationStatus) -> Self {
        match status {
            invitation::InvitationStatus::Pending => InvitationStatus::Pending,
            invitation::InvitationStatus::Accepted => InvitationStatus::Accepted,
            invitation::InvitationStatus::Expired => InvitationStatus::Expired,
            invitation::InvitationStatus::Cancelled => InvitationStatus::Cancelled,
        }
    }
}

/// Request to invite a member
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateInvitationRequest {
    /// Email address to invite
    pub email: String,
    /// Role granted on acceptance
    pub role: OrgRole,
}

/// An invitation as seen by organization admins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationInfo {
    /// Invitation UUID
    pub id: Uuid,
    /// Invited email address
    pub email: String,
    /// Role granted on acceptance
    pub role: OrgRole,
    /// Lifecycle state
    pub status: InvitationStatus,
    /// Acceptance token (share out-of-band; email delivery is not part
    /// of this service)
    pub token: String,
    /// When the invitation expires
    pub expires_at: DateTime<Utc>,
    /// When the invitation was created
    pub created_at: DateTime<Utc>,
}

impl From<invitation::Model> for InvitationInfo {
    fn from(model: invitation::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role.into(),
            status: model.status.into(),
            token: model.token,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

/// Invitations of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationList {
    pub invitations: Vec<InvitationInfo>,
    pub total: usize,
}

/// What an invitee sees before accepting
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationPreview {
    /// Organization display name
    pub organization_name: String,
    /// Invited email address
    pub email: String,
    /// Role granted on acceptance
    pub role: OrgRole,
    /// Lifecycle state
    pub status: InvitationStatus,
    /// When the invitation expires
    pub expires_at: DateTime<Utc>,
}

/// Result of accepting an invitation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AcceptInvitationResponse {
    /// The organization joined
    pub organization: OrganizationSummary,
    /// The role granted
    pub role: OrgRole,
}

// ============================================================================
// Impersonation Models
// ============================================================================

/// Request to start impersonating an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartImpersonationRequest {
    /// Slug of the organization to impersonate
    pub slug: String,
}

/// Current impersonation state, derived from the signed session state
/// with the organization re-fetched live
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImpersonationStatus {
    /// Whether an impersonation session is active
    pub is_impersonating: bool,
    /// The impersonated organization (live data, not the snapshot taken
    /// when the session started)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationSummary>,
}

/// One impersonation audit entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImpersonationLogEntry {
    /// Log entry UUID
    pub id: Uuid,
    /// The impersonating super admin
    pub super_admin_id: Uuid,
    /// The impersonated organization
    pub organization_id: Uuid,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session ended; null while active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Client IP at session start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Client user agent at session start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl From<impersonation_log::Model> for ImpersonationLogEntry {
    fn from(model: impersonation_log::Model) -> Self {
        Self {
            id: model.id,
            super_admin_id: model.super_admin_id,
            organization_id: model.organization_id,
            started_at: model.started_at,
            ended_at: model.ended_at,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
        }
    }
}

/// Impersonation audit entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImpersonationLogList {
    pub logs: Vec<ImpersonationLogEntry>,
    pub total: usize,
}

// ============================================================================
// Vehicle Models
// ============================================================================

/// Operational status of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Maintenance,
    Inactive,
}

impl From<vehicle::VehicleStatus> for VehicleStatus {
    fn from(status: vehicle::VehicleStatus) -> Self {
        match status {
            vehicle::VehicleStatus::Active => VehicleStatus::Active,
            vehicle::VehicleStatus::Maintenance => VehicleStatus::Maintenance,
            vehicle::VehicleStatus::Inactive => VehicleStatus::Inactive,
        }
    }
}

impl From<VehicleStatus> for vehicle::VehicleStatus {
    fn from(status: VehicleStatus) -> Self {
        match status {
            VehicleStatus::Active => vehicle::VehicleStatus::Active,
            VehicleStatus::Maintenance => vehicle::VehicleStatus::Maintenance,
            VehicleStatus::Inactive => vehicle::VehicleStatus::Inactive,
        }
    }
}

/// A vehicle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<vehicle::Model> for Vehicle {
    fn from(model: vehicle::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            plate_number: model.plate_number,
            brand: model.brand,
            model: model.model,
            year: model.year,
            status: model.status.into(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Vehicles of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VehicleList {
    pub vehicles: Vec<Vehicle>,
    pub total: usize,
}

/// Request to create a vehicle
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateVehicleRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Defaults to `active`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

/// Request to update a vehicle
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateVehicleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VehicleStatus>,
}

// ============================================================================
// Trip Models
// ============================================================================

/// Lifecycle of a trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl From<trip::TripStatus> for TripStatus {
    fn from(status: trip::TripStatus) -> Self {
        match status {
            trip::TripStatus::Planned => TripStatus::Planned,
            trip::TripStatus::InProgress => TripStatus::InProgress,
            trip::TripStatus::Completed => TripStatus::Completed,
            trip::TripStatus::Cancelled => TripStatus::Cancelled,
        }
    }
}

impl From<TripStatus> for trip::TripStatus {
    fn from(status: TripStatus) -> Self {
        match status {
            TripStatus::Planned => trip::TripStatus::Planned,
            TripStatus::InProgress => trip::TripStatus::InProgress,
            TripStatus::Completed => trip::TripStatus::Completed,
            TripStatus::Cancelled => trip::TripStatus::Cancelled,
        }
    }
}

/// A trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Trip {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    pub origin: String,
    pub destination: String,
    pub status: TripStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<trip::Model> for Trip {
    fn from(model: trip::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            origin: model.origin,
            destination: model.destination,
            status: model.status.into(),
            started_at: model.started_at,
            ended_at: model.ended_at,
            distance_km: model.distance_km,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Trips of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripList {
    pub trips: Vec<Trip>,
    pub total: usize,
}

/// Request to create a trip
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTripRequest {
    pub origin: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request to update a trip
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTripRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TripStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Finance Models
// ============================================================================

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl From<financial_transaction::TransactionType> for TransactionType {
    fn from(kind: financial_transaction::TransactionType) -> Self {
        match kind {
            financial_transaction::TransactionType::Income => TransactionType::Income,
            financial_transaction::TransactionType::Expense => TransactionType::Expense,
        }
    }
}

impl From<TransactionType> for financial_transaction::TransactionType {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => financial_transaction::TransactionType::Income,
            TransactionType::Expense => financial_transaction::TransactionType::Expense,
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<financial_transaction::Model> for Transaction {
    fn from(model: financial_transaction::Model) -> Self {
        Self {
            id: model.id,
            transaction_type: model.transaction_type.into(),
            amount: model.amount,
            description: model.description,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
        }
    }
}

/// Transactions of an organization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionList {
    pub transactions: Vec<Transaction>,
    pub total: usize,
}

/// Request to record a transaction
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to now
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
}
