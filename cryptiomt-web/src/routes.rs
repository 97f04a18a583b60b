//! Route definitions for the inventory web server

use crate::{handlers, openapi, AppState};
use axum::{
    routing::{get, patch, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Accounts
        .route("/auth/me", get(handlers::current_user))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/admin/users", get(handlers::list_admin_users))
        // Customers
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route("/customers/me", get(handlers::current_customer))
        .route(
            "/customers/{id}",
            get(handlers::get_customer).patch(handlers::update_customer),
        )
        .route(
            "/customers/{id}/equipment",
            get(handlers::list_customer_equipment),
        )
        // Equipment
        .route("/equipment", post(handlers::add_equipment))
        .route("/equipment/stats", get(handlers::equipment_stats))
        .route(
            "/equipment/{id}",
            patch(handlers::update_equipment).delete(handlers::delete_equipment),
        )
        // API documentation
        .route("/openapi.json", get(openapi::openapi_json))
}
