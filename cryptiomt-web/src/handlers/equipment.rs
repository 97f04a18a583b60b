//! Equipment handlers

use super::types::StatsQuery;
use crate::{auth::Caller, error::ErrorResponse, AppState, ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use cryptiomt_core::{Equipment, EquipmentId, EquipmentPatch, EquipmentStats, NewEquipment};

/// Add a device
#[utoipa::path(
    post,
    path = "/api/equipment",
    tag = "Equipment",
    summary = "Add equipment",
    description = "New devices start active with created, updated and last-seen times set to now.",
    request_body = NewEquipment,
    responses(
        (status = 201, description = "Device added", body = Equipment),
        (status = 400, description = "Blank required field", body = ErrorResponse),
        (status = 401, description = "No identity supplied", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn add_equipment(
    State(state): State<AppState>,
    caller: Caller,
    JsonExtractor(input): JsonExtractor<NewEquipment>,
) -> ApiResult<(StatusCode, Json<Equipment>)> {
    let equipment = state
        .application
        .add_equipment(caller.identity(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update a device
#[utoipa::path(
    patch,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    summary = "Update equipment",
    params(("id" = String, Path, description = "Equipment id")),
    request_body = EquipmentPatch,
    responses(
        (status = 200, description = "Updated device", body = Equipment),
        (status = 400, description = "Blank field", body = ErrorResponse),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 404, description = "Unknown device", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    JsonExtractor(patch): JsonExtractor<EquipmentPatch>,
) -> ApiResult<Json<Equipment>> {
    let equipment = state
        .application
        .update_equipment(caller.identity(), &EquipmentId(id), patch)
        .await?;
    Ok(Json(equipment))
}

/// Delete a device
#[utoipa::path(
    delete,
    path = "/api/equipment/{id}",
    tag = "Equipment",
    summary = "Delete equipment",
    params(("id" = String, Path, description = "Equipment id")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 404, description = "Unknown device", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .application
        .delete_equipment(caller.identity(), &EquipmentId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Inventory statistics
#[utoipa::path(
    get,
    path = "/api/equipment/stats",
    tag = "Equipment",
    summary = "Equipment statistics",
    description = "Status, type and risk counts for one customer, or across every customer when no customer_id is given.",
    params(StatsQuery),
    responses(
        (status = 200, description = "Aggregate counts", body = EquipmentStats),
        (status = 401, description = "No identity supplied", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn equipment_stats(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<EquipmentStats>> {
    let customer_id = query.customer();
    let stats = state
        .application
        .equipment_stats(caller.identity(), customer_id.as_ref())
        .await?;
    Ok(Json(stats))
}
