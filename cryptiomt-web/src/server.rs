//! CryptIoMT Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use cryptiomt_core::{AdminRole, AppConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main inventory web server
pub struct CryptiomtServer {
    config: AppConfig,
    state: AppState,
}

impl CryptiomtServer {
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Start the web server; returns after Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting CryptIoMT inventory server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.server.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down gracefully");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Builder for CryptiomtServer
pub struct CryptiomtServerBuilder {
    config: AppConfig,
}

impl CryptiomtServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.server.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database.url = Some(database_url.into());
        self
    }

    /// Enable or disable first-login provisioning
    pub fn auto_provision(mut self, enabled: bool) -> Self {
        self.config.access.auto_provision = enabled;
        self
    }

    /// Role given to provisioned accounts
    pub fn default_role(mut self, role: AdminRole) -> Self {
        self.config.access.default_role = role;
        self
    }

    pub async fn build(self) -> WebResult<CryptiomtServer> {
        CryptiomtServer::new(self.config).await
    }
}

impl Default for CryptiomtServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let server = CryptiomtServer::new(AppConfig::default()).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = CryptiomtServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .auto_provision(false)
            .default_role(AdminRole::Analyst);

        assert_eq!(builder.config.server.host, "localhost");
        assert_eq!(builder.config.server.port, 3000);
        assert!(builder.config.server.dev_mode);
        assert!(!builder.config.access.auto_provision);
        assert_eq!(builder.config.access.default_role, AdminRole::Analyst);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let result = CryptiomtServerBuilder::new()
            .database_url("postgres://localhost/inventory")
            .build()
            .await;
        assert!(matches!(result, Err(WebError::Config(_))));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_backed_server() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("inventory.db").display());
        let server = CryptiomtServerBuilder::new().database_url(url).build().await;
        assert!(server.is_ok());
    }
}
