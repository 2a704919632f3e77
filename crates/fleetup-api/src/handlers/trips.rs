//! Trip handlers (tenant-scoped)
//!
//! Trips are the one feature area where collaborators can write:
//! creation and updates are collaborator-gated, deletion is admin-gated.

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

use fleetup_db::entities::{
    prelude::{Trip, Vehicle},
    trip, vehicle,
};

use crate::handlers::{bad_request, db_error, not_found, require_permission, ApiError};
use crate::middleware::tenant::OrgContext;
use crate::models::{CreateTripRequest, ErrorResponse, TripList, UpdateTripRequest};
use crate::permissions::Permission;
use crate::AppState;

async fn find_trip(state: &AppState, ctx: &OrgContext, id: Uuid) -> Result<trip::Model, ApiError> {
    Trip::find_by_id(id)
        .filter(trip::Column::OrganizationId.eq(ctx.organization_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Trip", "TRIP_NOT_FOUND"))
}

/// A referenced vehicle must belong to the same organization.
async fn check_vehicle(state: &AppState, ctx: &OrgContext, id: Uuid) -> Result<(), ApiError> {
    Vehicle::find_by_id(id)
        .filter(vehicle::Column::OrganizationId.eq(ctx.organization_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .map(|_| ())
        .ok_or_else(|| bad_request("Vehicle does not belong to this organization", "INVALID_VEHICLE"))
}

/// Trips of the organization
#[utoipa::path(
    get,
    path = "/api/orgs/{slug}/trips",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    responses(
        (status = 200, description = "Trip list", body = TripList),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "trips"
)]
pub async fn list_trips(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<TripList>, ApiError> {
    require_permission(&ctx, Permission::TripsView)?;

    let rows = Trip::find()
        .filter(trip::Column::OrganizationId.eq(ctx.organization_id))
        .order_by_desc(trip::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let trips: Vec<crate::models::Trip> = rows.into_iter().map(Into::into).collect();
    let total = trips.len();

    Ok(Json(TripList { trips, total }))
}

/// Plan a trip
#[utoipa::path(
    post,
    path = "/api/orgs/{slug}/trips",
    params(
        ("slug" = String, Path, description = "Organization slug")
    ),
    request_body = CreateTripRequest,
    responses(
        (status = 201, description = "Trip created", body = crate::models::Trip),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    ),
    tag = "trips"
)]
pub async fn create_trip(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<crate::models::Trip>), ApiError> {
    require_permission(&ctx, Permission::TripsCreate)?;

    if let Some(vehicle_id) = request.vehicle_id {
        check_vehicle(&state, &ctx, vehicle_id).await?;
    }

    let now = Utc::now();
    let created = trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(ctx.organization_id),
        vehicle_id: Set(request.vehicle_id),
        origin: Set(request.origin),
        destination: Set(request.destination),
        status: Set(trip::TripStatus::Planned),
        started_at: Set(None),
        ended_at: Set(None),
        distance_km: Set(None),
        notes: Set(request.notes),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(org_id = %ctx.organization_id, trip_id = %created.id, "Trip created");

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update a trip
#[utoipa::path(
    patch,
    path = "/api/orgs/{slug}/trips/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Trip id")
    ),
    request_body = UpdateTripRequest,
    responses(
        (status = 200, description = "Trip updated", body = crate::models::Trip),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Trip not found", body = ErrorResponse)
    ),
    tag = "trips"
)]
pub async fn update_trip(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateTripRequest>,
) -> Result<Json<crate::models::Trip>, ApiError> {
    require_permission(&ctx, Permission::TripsUpdate)?;

    let found = find_trip(&state, &ctx, id).await?;

    if let Some(vehicle_id) = request.vehicle_id {
        check_vehicle(&state, &ctx, vehicle_id).await?;
    }

    let mut active: trip::ActiveModel = found.into();
    if let Some(status) = request.status {
        active.status = Set(status.into());
    }
    if let Some(vehicle_id) = request.vehicle_id {
        active.vehicle_id = Set(Some(vehicle_id));
    }
    if let Some(started_at) = request.started_at {
        active.started_at = Set(Some(started_at));
    }
    if let Some(ended_at) = request.ended_at {
        active.ended_at = Set(Some(ended_at));
    }
    if let Some(distance_km) = request.distance_km {
        active.distance_km = Set(Some(distance_km));
    }
    if let Some(notes) = request.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await.map_err(db_error)?;

    Ok(Json(updated.into()))
}

/// Delete a trip
#[utoipa::path(
    delete,
    path = "/api/orgs/{slug}/trips/{id}",
    params(
        ("slug" = String, Path, description = "Organization slug"),
        ("id" = Uuid, Path, description = "Trip id")
    ),
    responses(
        (status = 204, description = "Trip deleted"),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "Trip not found", body = ErrorResponse)
    ),
    tag = "trips"
)]
pub async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<OrgContext>,
    Path((_slug, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_permission(&ctx, Permission::TripsDelete)?;

    let found = find_trip(&state, &ctx, id).await?;
    found.delete(&state.db).await.map_err(db_error)?;

    info!(org_id = %ctx.organization_id, trip_id = %id, "Trip deleted");

    Ok(StatusCode::NO_CONTENT)
}
