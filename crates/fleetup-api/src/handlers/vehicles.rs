//! Vehicle handlers (tenant-scoped)
//!
//! Writes are admin-gated by the permission table; every query filters
//! on the organization attached by the tenant gate.

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

use fleetup_db::entities::{prelude::Vehicle, vehicle};

use crate::handlers::{db_error, not_found, require_permission, ApiError};
use crate::middleware::tenant::OrgContext;
use crate::models::{CreateVehicleRequest, ErrorResponse, UpdateVehicleRequest, VehicleList};
use crate::permissions::Permission;
use crate::AppState;

async fn find_vehicle(
    state: &AppState,
    ctx: &OrgContext,
    id: Uuid,
) -> Result<vehicle::Model, ApiError> {
    Vehicle::find_by_id(id)
        .filter(vehicle::Column::OrganizationId.eq(ctx.organization_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Vehicle", "VEHICLE_NOT_FOUND"))
}

/// Vehicles of the organization
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}/vehicles",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Vehicle list", body = VehicleList),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<VehicleList>, ApiError> {
    require_permission(&ctx, Permission::VehiclesView)?;

    let rows = Vehicle::find()
        .filter(vehicle::Column::OrganizationId.eq(ctx.organization_id))
        .order_by_asc(vehicle::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let vehicles: Vec<crate::models::Vehicle> = rows.into_iter().map(Into::into).collect();
    let total = vehicles.len();

    Ok(Json(VehicleList { vehicles, total }))
}

/// Add a vehicle
#[utoipa::path(
    post,
    path = "/api/orgs/{slug}/vehicles",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = crate::models::Vehicle),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<crate::models::Vehicle>), ApiError> {
    require_permission(&ctx, Permission::VehiclesCreate)?;

    let now = Utc::now();
    let created = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(ctx.organization_id),
        name: Set(request.name),
        plate_number: Set(request.plate_number),
        brand: Set(request.brand),
        model: Set(request.model),
        year: Set(request.year),
        status: Set(request
            .status
            .map(Into::into)
            .unwrap_or(vehicle::VehicleStatus::Active)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(org_id = %ctx.organization_id, vehicle_id = %created.id, "Vehicle created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update a vehicle
#[utoipa::path(
    patch,
    path = "/api/orgs/{slug}/vehicles/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Vehicle id")
    ),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = crate::models::Vehicle),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<crate::models::Vehicle>, ApiError> {
    require_permission(&ctx, Permission::VehiclesUpdate)?;

    let found = find_vehicle(&state, &ctx, id).await?;

    let mut active: vehicle::ActiveModel = found.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(plate_number) = request.plate_number {
        active.plate_number = Set(Some(plate_number));
    }
    if let Some(brand) = request.brand {
        active.brand = Set(Some(brand));
    }
    if let Some(model) = request.model {
        active.model = Set(Some(model));
    }
    if let Some(year) = request.year {
        active.year = Set(Some(year));
    }
    if let Some(status) = request.status {
        active.status = Set(status.into());
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(updated.into()))
}

/// Remove a vehicle
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}/vehicles/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Vehicle id")
    ),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Vehicle not found", body = ErrorResponse)
    ),
    tag = "vehicles"
)]
pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_permission(&ctx, Permission::VehiclesDelete)?;

    let found = find_vehicle(&state, &ctx, id).await?;
    found.delete(&state.db).await.map_err(db_error)?;

    info!(org_id = %ctx.organization_id, vehicle_id = %id, "Vehicle deleted");

    Ok(StatusCode::NO_CONTENT)
}
