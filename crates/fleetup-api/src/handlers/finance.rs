//! Financial transaction handlers (tenant-scoped, sensitive)
//!
//! Financial data is restricted to admins and owners for reads as well
//! as writes; viewers and collaborators are denied by the permission
//! table even though they can see every other feature area.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use fleetup_db::entities::{financial_transaction, prelude::*};

use crate::handlers::{bad_request, db_error, not_found, require_permission, ApiError};
use crate::middleware::tenant::OrgContext;
use crate::models::*;
use crate::permissions::Permission;
use crate::AppState;

/// Transactions of the organization
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}/finance/transactions",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Transaction list", body = TransactionList),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "finance"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<TransactionList>, ApiError> {
    require_permission(&ctx, Permission::FinancesView)?;

    let rows = FinancialTransaction::find()
        .filter(financial_transaction::Column::OrganizationId.eq(ctx.organization_id))
        .order_by_desc(financial_transaction::Column::OccurredAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let transactions: Vec<Transaction> = rows.into_iter().map(Into::into).collect();
    let total = transactions.len();

    Ok(Json(TransactionList {
        transactions,
        total,
    }))
}

/// Record a transaction
#[utoipa::path(
    post,
    path = "/api/orgs/{slug}/finance/transactions",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "finance"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    require_permission(&ctx, Permission::FinancesCreate)?;

    if !request.amount.is_finite() || request.amount < 0.0 {
        return Err(bad_request(
            "Amount must be a non-negative number",
            "INVALID_AMOUNT",
        ));
    }

    let now = Utc::now();
    let created = financial_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(ctx.organization_id),
        transaction_type: Set(request.transaction_type.into()),
        amount: Set(request.amount),
        description: Set(request.description),
        occurred_at: Set(request.occurred_at.unwrap_or(now)),
        created_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(
        org_id = %ctx.organization_id,
        transaction_id = %created.id,
        "Transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Delete a transaction
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}/finance/transactions/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Transaction id")
    ),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    ),
    tag = "finance"
)]
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_permission(&ctx, Permission::FinancesDelete)?;

    let found = FinancialTransaction::find_by_id(id)
        .filter(financial_transaction::Column::OrganizationId.eq(ctx.organization_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Transaction", "TRANSACTION_NOT_FOUND"))?;

    found.delete(&state.db).await.map_err(db_error)?;

    info!(org_id = %ctx.organization_id, transaction_id = %id, "Transaction deleted");

    Ok(StatusCode::NO_CONTENT)
}
