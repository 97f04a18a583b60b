//! Sign-in and admin account handlers

use super::types::AuthStatusResponse;
use crate::{auth::Caller, error::ErrorResponse, AppState, ApiResult};
use axum::{extract::State, response::Json};
use cryptiomt_core::AdminAccount;

/// Current caller and their admin account
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Accounts",
    summary = "Current user",
    description = "Identity of the caller and their admin account, if any. Never creates accounts.",
    responses(
        (status = 200, description = "Caller status", body = AuthStatusResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security((), ("user_id" = []))
)]
pub async fn current_user(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<AuthStatusResponse>> {
    let user = state.application.current_user(caller.identity()).await?;
    Ok(Json(AuthStatusResponse {
        authenticated: user.is_some(),
        user,
    }))
}

/// Record a sign-in
#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    tag = "Accounts",
    summary = "Sign in",
    description = "Refresh login bookkeeping, creating the admin account on first sign-in when provisioning is enabled.",
    responses(
        (status = 200, description = "Admin account after the sign-in", body = AdminAccount),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "No admin account and provisioning is unavailable", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn sign_in(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<AdminAccount>> {
    let account = state.application.sign_in(caller.identity()).await?;
    Ok(Json(account))
}

/// Admin roster
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Accounts",
    summary = "List admin accounts",
    description = "Every admin account. Requires the super_admin role.",
    responses(
        (status = 200, description = "Admin accounts", body = Vec<AdminAccount>),
        (status = 401, description = "No identity supplied", body = ErrorResponse),
        (status = 403, description = "Caller is not a super admin", body = ErrorResponse)
    ),
    security(("user_id" = []))
)]
pub async fn list_admin_users(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<AdminAccount>>> {
    let accounts = state
        .application
        .list_admin_accounts(caller.identity())
        .await?;
    Ok(Json(accounts))
}
