//! Consolidated initial schema migration

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len_null(User::FullName, 255))
                    .col(boolean(User::IsSuperAdmin).not_null().default(false))
                    .col(boolean(User::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create organizations table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(uuid(Organization::Id).primary_key())
                    .col(string_len(Organization::Name, 255).not_null())
                    .col(
                        string_len(Organization::Slug, 255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(string_len_null(Organization::LogoUrl, 512))
                    .col(json(Organization::Settings).not_null())
                    .col(
                        timestamp_with_time_zone(Organization::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Organization::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organizations_slug")
                    .table(Organization::Table)
                    .col(Organization::Slug)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create organization_members junction table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(OrganizationMember::Table)
                    .if_not_exists()
                    .col(uuid(OrganizationMember::OrganizationId).not_null())
                    .col(uuid(OrganizationMember::UserId).not_null())
                    .col(
                        string_len(OrganizationMember::Role, 32)
                            .not_null()
                            .default("viewer"),
                    )
                    .col(uuid_null(OrganizationMember::InvitedBy))
                    .col(
                        timestamp_with_time_zone(OrganizationMember::JoinedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(OrganizationMember::OrganizationId)
                            .col(OrganizationMember::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_members_organization_id")
                            .from(
                                OrganizationMember::Table,
                                OrganizationMember::OrganizationId,
                            )
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_members_user_id")
                            .from(OrganizationMember::Table, OrganizationMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_organization_members_user_id")
                    .table(OrganizationMember::Table)
                    .col(OrganizationMember::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 4. Create invitations table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Invitation::Table)
                    .if_not_exists()
                    .col(uuid(Invitation::Id).primary_key())
                    .col(uuid(Invitation::OrganizationId).not_null())
                    .col(string_len(Invitation::Email, 255).not_null())
                    .col(string_len(Invitation::Role, 32).not_null())
                    .col(string_len(Invitation::Token, 64).not_null().unique_key())
                    .col(uuid(Invitation::InvitedBy).not_null())
                    .col(
                        string_len(Invitation::Status, 32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp_with_time_zone(Invitation::ExpiresAt).not_null())
                    .col(timestamp_with_time_zone_null(Invitation::AcceptedAt))
                    .col(
                        timestamp_with_time_zone(Invitation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invitations_organization_id")
                            .from(Invitation::Table, Invitation::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_invitations_organization_id")
                    .table(Invitation::Table)
                    .col(Invitation::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_invitations_token")
                    .table(Invitation::Table)
                    .col(Invitation::Token)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create impersonation_logs audit table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ImpersonationLog::Table)
                    .if_not_exists()
                    .col(uuid(ImpersonationLog::Id).primary_key())
                    .col(uuid(ImpersonationLog::SuperAdminId).not_null())
                    .col(uuid(ImpersonationLog::OrganizationId).not_null())
                    .col(
                        timestamp_with_time_zone(ImpersonationLog::StartedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(ImpersonationLog::EndedAt))
                    .col(string_len_null(ImpersonationLog::IpAddress, 64))
                    .col(string_len_null(ImpersonationLog::UserAgent, 512))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_impersonation_logs_super_admin_id")
                            .from(ImpersonationLog::Table, ImpersonationLog::SuperAdminId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_impersonation_logs_organization_id")
                            .from(ImpersonationLog::Table, ImpersonationLog::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Open-session lookups filter on (admin, org, ended_at IS NULL)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_impersonation_logs_admin_org")
                    .table(ImpersonationLog::Table)
                    .col(ImpersonationLog::SuperAdminId)
                    .col(ImpersonationLog::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. Create vehicles table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::OrganizationId).not_null())
                    .col(string_len(Vehicle::Name, 255).not_null())
                    .col(string_len_null(Vehicle::PlateNumber, 32))
                    .col(string_len_null(Vehicle::Brand, 128))
                    .col(string_len_null(Vehicle::Model, 128))
                    .col(integer_null(Vehicle::Year))
                    .col(
                        string_len(Vehicle::Status, 32)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicles_organization_id")
                            .from(Vehicle::Table, Vehicle::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_vehicles_organization_id")
                    .table(Vehicle::Table)
                    .col(Vehicle::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 7. Create trips table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Trip::Table)
                    .if_not_exists()
                    .col(uuid(Trip::Id).primary_key())
                    .col(uuid(Trip::OrganizationId).not_null())
                    .col(uuid_null(Trip::VehicleId))
                    .col(string_len(Trip::Origin, 255).not_null())
                    .col(string_len(Trip::Destination, 255).not_null())
                    .col(
                        string_len(Trip::Status, 32)
                            .not_null()
                            .default("planned"),
                    )
                    .col(timestamp_with_time_zone_null(Trip::StartedAt))
                    .col(timestamp_with_time_zone_null(Trip::EndedAt))
                    .col(double_null(Trip::DistanceKm))
                    .col(text_null(Trip::Notes))
                    .col(
                        timestamp_with_time_zone(Trip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Trip::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_organization_id")
                            .from(Trip::Table, Trip::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trips_vehicle_id")
                            .from(Trip::Table, Trip::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_trips_organization_id")
                    .table(Trip::Table)
                    .col(Trip::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 8. Create financial_transactions table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(FinancialTransaction::Table)
                    .if_not_exists()
                    .col(uuid(FinancialTransaction::Id).primary_key())
                    .col(uuid(FinancialTransaction::OrganizationId).not_null())
                    .col(string_len(FinancialTransaction::TransactionType, 32).not_null())
                    .col(double(FinancialTransaction::Amount).not_null())
                    .col(text_null(FinancialTransaction::Description))
                    .col(timestamp_with_time_zone(FinancialTransaction::OccurredAt).not_null())
                    .col(
                        timestamp_with_time_zone(FinancialTransaction::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_transactions_organization_id")
                            .from(
                                FinancialTransaction::Table,
                                FinancialTransaction::OrganizationId,
                            )
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_financial_transactions_organization_id")
                    .table(FinancialTransaction::Table)
                    .col(FinancialTransaction::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order (respecting foreign keys)
        manager
            .drop_table(Table::drop().table(FinancialTransaction::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Trip::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ImpersonationLog::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Invitation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(OrganizationMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    PasswordHash,
    FullName,
    IsSuperAdmin,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    #[sea_orm(iden = "organizations")]
    Table,
    Id,
    Name,
    Slug,
    LogoUrl,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganizationMember {
    #[sea_orm(iden = "organization_members")]
    Table,
    OrganizationId,
    UserId,
    Role,
    InvitedBy,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Invitation {
    #[sea_orm(iden = "invitations")]
    Table,
    Id,
    OrganizationId,
    Email,
    Role,
    Token,
    InvitedBy,
    Status,
    ExpiresAt,
    AcceptedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ImpersonationLog {
    #[sea_orm(iden = "impersonation_logs")]
    Table,
    Id,
    SuperAdminId,
    OrganizationId,
    StartedAt,
    EndedAt,
    IpAddress,
    UserAgent,
}

#[derive(DeriveIden)]
enum Vehicle {
    #[sea_orm(iden = "vehicles")]
    Table,
    Id,
    OrganizationId,
    Name,
    PlateNumber,
    Brand,
    Model,
    Year,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Trip {
    #[sea_orm(iden = "trips")]
    Table,
    Id,
    OrganizationId,
    VehicleId,
    Origin,
    Destination,
    Status,
    StartedAt,
    EndedAt,
    DistanceKm,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FinancialTransaction {
    #[sea_orm(iden = "financial_transactions")]
    Table,
    Id,
    OrganizationId,
    TransactionType,
    Amount,
    Description,
    OccurredAt,
    CreatedAt,
}
