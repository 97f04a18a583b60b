//! CryptIoMT Web Server
//!
//! HTTP surface of the inventory service. Every data route resolves the
//! caller from identity headers and goes through the access gateway.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::{ApiError, ApiResult};
pub use server::{CryptiomtServer, CryptiomtServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(auth::USER_ID_HEADER),
            HeaderName::from_static(auth::USER_NAME_HEADER),
            HeaderName::from_static(auth::USER_EMAIL_HEADER),
        ]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(1024 * 1024)),
        )
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Application error: {0}")]
    Application(#[from] cryptiomt_applications::ApplicationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl From<cryptiomt_core::CoreError> for WebError {
    fn from(error: cryptiomt_core::CoreError) -> Self {
        WebError::Config(error.to_string())
    }
}
