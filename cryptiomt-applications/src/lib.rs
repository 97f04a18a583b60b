//! CryptIoMT Applications - Access-controlled inventory operations
//!
//! This module provides the operation layer of the inventory service:
//!
//! - The access gateway that resolves callers and authorizes operations
//! - The document store trait with in-memory and SQLite backends
//! - Account, customer and equipment operations
//!
//! ## Architecture
//!
//! - **Core** (cryptiomt-core): records, configuration and logging
//! - **Applications** (this module): gateway, store and operations
//! - **Presentation** (cryptiomt-web): HTTP surface

pub mod auth;
pub mod services;
pub mod store;

pub use auth::{
    authorize, AccessGateway, CallerIdentity, Decision, Denial, Operation, OperationKind,
    Principal, Role, Scope,
};
pub use services::CurrentUser;
pub use store::{DocumentStore, MemoryDocumentStore, StoreError, StoreResult};
#[cfg(feature = "sqlite")]
pub use store::SqliteDocumentStore;

use cryptiomt_core::{AccessConfig, AppConfig};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Authentication required for {operation}")]
    Unauthenticated { operation: String },

    #[error("Not authorized to {operation}")]
    Unauthorized { operation: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    pub fn unauthenticated<O: fmt::Display>(operation: O) -> Self {
        Self::Unauthenticated {
            operation: operation.to_string(),
        }
    }

    pub fn unauthorized<O: fmt::Display>(operation: O) -> Self {
        Self::Unauthorized {
            operation: operation.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: fmt::Display>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The operation kind for authentication and authorization failures
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { operation } | Self::Unauthorized { operation } => {
                Some(operation.as_str())
            }
            _ => None,
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Store {
                message: other.to_string(),
            },
        }
    }
}

impl From<cryptiomt_core::CoreError> for ApplicationError {
    fn from(error: cryptiomt_core::CoreError) -> Self {
        Self::config(error.to_string())
    }
}

/// Entry point for all inventory operations
#[derive(Clone)]
pub struct InventoryApplication {
    store: Arc<dyn DocumentStore>,
    gateway: AccessGateway,
}

impl InventoryApplication {
    pub fn new(store: Arc<dyn DocumentStore>, access: &AccessConfig) -> Self {
        let gateway = AccessGateway::new(store.clone(), access);
        Self { store, gateway }
    }

    /// Application backed by the in-memory store
    pub fn in_memory(access: &AccessConfig) -> Self {
        Self::new(Arc::new(MemoryDocumentStore::new()), access)
    }

    /// Build the application described by `config`.
    ///
    /// Uses SQLite when `database.url` is set, the in-memory store otherwise.
    pub async fn from_config(config: &AppConfig) -> ApplicationResult<Self> {
        match &config.database.url {
            #[cfg(feature = "sqlite")]
            Some(url) => {
                let store = SqliteDocumentStore::connect(url).await?;
                info!("Using SQLite document store");
                Ok(Self::new(Arc::new(store), &config.access))
            }
            #[cfg(not(feature = "sqlite"))]
            Some(url) => Err(ApplicationError::config(format!(
                "database url '{}' requires the sqlite feature",
                url
            ))),
            None => {
                info!("Using in-memory document store");
                Ok(Self::in_memory(&config.access))
            }
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn gateway(&self) -> &AccessGateway {
        &self.gateway
    }

    /// Health check for the storage backend
    pub async fn health_check(&self) -> ApplicationResult<()> {
        self.store.health_check().await?;
        Ok(())
    }
}
