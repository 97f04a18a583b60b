//! OpenAPI specification for the inventory server

use crate::error::ErrorResponse;
use crate::handlers::{AuthStatusResponse, HealthResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cryptiomt_applications::CurrentUser;
use cryptiomt_core::{
    AdminAccount, AdminAccountId, AdminRole, CustomerAccount, CustomerId, CustomerPatch,
    DeviceType, Equipment, EquipmentId, EquipmentPatch, EquipmentStats, EquipmentStatus,
    NewCustomer, NewEquipment, RiskDistribution, SubscriptionTier,
};
use tracing::error;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CryptIoMT Inventory API",
        version = "0.1.0",
        description = "Customer and equipment inventory behind a role-based access gateway",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,

        crate::handlers::current_user,
        crate::handlers::sign_in,
        crate::handlers::list_admin_users,

        crate::handlers::list_customers,
        crate::handlers::create_customer,
        crate::handlers::current_customer,
        crate::handlers::get_customer,
        crate::handlers::update_customer,

        crate::handlers::list_customer_equipment,
        crate::handlers::add_equipment,
        crate::handlers::update_equipment,
        crate::handlers::delete_equipment,
        crate::handlers::equipment_stats,
    ),
    components(
        schemas(
            HealthResponse,
            AuthStatusResponse,
            ErrorResponse,
            CurrentUser,
            AdminAccount,
            AdminAccountId,
            AdminRole,
            CustomerAccount,
            CustomerId,
            NewCustomer,
            CustomerPatch,
            SubscriptionTier,
            Equipment,
            EquipmentId,
            NewEquipment,
            EquipmentPatch,
            DeviceType,
            EquipmentStatus,
            EquipmentStats,
            RiskDistribution,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Accounts", description = "Sign-in and admin accounts"),
        (name = "Customers", description = "Customer accounts"),
        (name = "Equipment", description = "Device inventory and statistics"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Identity header scheme
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::auth::USER_ID_HEADER,
                ))),
            );
        }
    }
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Response {
    match serde_json::to_value(ApiDoc::openapi()) {
        Ok(document) => Json(document).into_response(),
        Err(e) => {
            error!("Failed to serialize OpenAPI document: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "CryptIoMT Inventory API");
        assert_eq!(openapi.info.version, "0.1.0");
        assert!(openapi.paths.paths.contains_key("/api/customers"));
        assert!(openapi.paths.paths.contains_key("/api/equipment/stats"));
    }

    #[test]
    fn test_openapi_json() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("CryptIoMT Inventory API"));
        assert!(json.contains("x-user-id"));
    }
}
