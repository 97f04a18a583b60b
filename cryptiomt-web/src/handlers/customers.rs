//! Customer handlers

use crate::{auth::Caller, error::ErrorResponse, AppState, ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Json as JsonExtractor,
};
use cryptiomt_core::{CustomerAccount, CustomerId, CustomerPatch, Equipment, NewCustomer};

/// List every customer
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    summary = "List customers",
    description = "All customer accounts. Requires the admin or super_admin role.",
    responses(
        (status = 200, description = "Customer accounts", body = Vec<CustomerAccount>),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn list_customers(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<CustomerAccount>>> {
    let customers = state.application.list_customers(caller.identity()).await?;
    Ok(Json(customers))
}

/// Create a customer
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    summary = "Create customer",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Customer created", body = CustomerAccount),
        (status = 400, description = "Blank required field", body = ErrorResponse),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn create_customer(
    State(state): State<AppState>,
    caller: Caller,
    JsonExtractor(input): JsonExtractor<NewCustomer>,
) -> ApiResult<(StatusCode, Json<CustomerAccount>)> {
    let customer = state
        .application
        .create_customer(caller.identity(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Customer linked to the caller's login
#[utoipa::path(
    get,
    path = "/api/customers/me",
    tag = "Customers",
    summary = "Current customer",
    description = "The customer account linked to the caller, or null.",
    responses(
        (status = 200, description = "Linked customer", body = Option<CustomerAccount>)
    ),
    security((), ("user_id" = []))
)]
pub async fn current_customer(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Option<CustomerAccount>>> {
    let customer = state
        .application
        .current_customer(caller.identity())
        .await?;
    Ok(Json(customer))
}

/// Fetch one customer
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    summary = "Get customer",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer account", body = CustomerAccount),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Customer outside the caller's scope", body = ErrorResponse),
        (status = 404, description = "Unknown customer", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn get_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerAccount>> {
    let customer = state
        .application
        .get_customer(caller.identity(), &CustomerId(id))
        .await?;
    Ok(Json(customer))
}

/// Update a customer
#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    tag = "Customers",
    summary = "Update customer",
    params(("id" = String, Path, description = "Customer id")),
    request_body = CustomerPatch,
    responses(
        (status = 200, description = "Updated customer", body = CustomerAccount),
        (status = 400, description = "Blank field", body = ErrorResponse),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Caller has no admin account", body = ErrorResponse),
        (status = 404, description = "Unknown customer", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn update_customer(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    JsonExtractor(patch): JsonExtractor<CustomerPatch>,
) -> ApiResult<Json<CustomerAccount>> {
    let customer = state
        .application
        .update_customer(caller.identity(), &CustomerId(id), patch)
        .await?;
    Ok(Json(customer))
}

/// Devices owned by a customer
#[utoipa::path(
    get,
    path = "/api/customers/{id}/equipment",
    tag = "Equipment",
    summary = "List customer equipment",
    params(("id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Devices visible to the caller", body = Vec<Equipment>),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Customer outside the caller's scope", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn list_customer_equipment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Equipment>>> {
    let equipment = state
        .application
        .list_customer_equipment(caller.identity(), &CustomerId(id))
        .await?;
    Ok(Json(equipment))
}
