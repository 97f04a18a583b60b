//! Shared application state

use crate::WebResult;
use cryptiomt_applications::InventoryApplication;
use cryptiomt_core::AppConfig;
use std::sync::Arc;
use tracing::info;

/// State cloned into every request handler
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<AppConfig>,
    /// Inventory operations behind the access gateway
    pub application: Arc<InventoryApplication>,
}

impl AppState {
    /// Create the state and connect the configured document store
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let application = InventoryApplication::from_config(&config).await?;
        info!(
            "Application state ready (auto_provision: {})",
            config.access.auto_provision
        );
        Ok(Self::with_application(config, application))
    }

    /// Wrap an already constructed application
    pub fn with_application(config: AppConfig, application: InventoryApplication) -> Self {
        Self {
            config: Arc::new(config),
            application: Arc::new(application),
        }
    }
}
