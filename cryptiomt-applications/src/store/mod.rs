//! Document store
//!
//! Persistence for admin accounts, customers and equipment. Every backend
//! exposes indexed lookups by key, collection reads, partial updates and an
//! atomic upsert for login bookkeeping.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryDocumentStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cryptiomt_core::{
    AdminAccount, AdminLogin, AdminProvision, CustomerAccount, CustomerId, CustomerPatch,
    Equipment, EquipmentId, EquipmentPatch,
};
use thiserror::Error;

/// Errors reported by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Store backend error: {message}")]
    Backend { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Storage trait implemented by every persistence backend
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up an admin account by identity provider subject
    async fn find_admin_by_subject(&self, subject: &str) -> StoreResult<Option<AdminAccount>>;

    /// Record a login for `login.subject`.
    ///
    /// An existing account gets `last_login` and any non-blank name/email
    /// refreshed. A missing account is created from `provision` when given,
    /// otherwise `None` is returned. Concurrent calls for one subject always
    /// leave exactly one account behind.
    async fn upsert_admin_account(
        &self,
        login: &AdminLogin,
        provision: Option<&AdminProvision>,
    ) -> StoreResult<Option<AdminAccount>>;

    /// Insert a fully specified admin account; `Conflict` if the subject exists
    async fn insert_admin_account(&self, account: &AdminAccount) -> StoreResult<()>;

    async fn list_admin_accounts(&self) -> StoreResult<Vec<AdminAccount>>;

    async fn find_customer(&self, id: &CustomerId) -> StoreResult<Option<CustomerAccount>>;

    /// Look up the customer linked to a portal login
    async fn find_customer_by_subject(&self, subject: &str)
        -> StoreResult<Option<CustomerAccount>>;

    async fn list_customers(&self) -> StoreResult<Vec<CustomerAccount>>;

    /// Insert a customer; `Conflict` if its portal subject is already linked
    async fn insert_customer(&self, customer: &CustomerAccount) -> StoreResult<()>;

    /// Apply present fields and bump `last_updated`; `NotFound` if absent
    async fn patch_customer(
        &self,
        id: &CustomerId,
        patch: &CustomerPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<CustomerAccount>;

    async fn find_equipment(&self, id: &EquipmentId) -> StoreResult<Option<Equipment>>;

    /// List equipment, optionally restricted to one customer
    async fn list_equipment(&self, customer_id: Option<&CustomerId>)
        -> StoreResult<Vec<Equipment>>;

    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<()>;

    /// Apply present fields and bump `updated_at`; `NotFound` if absent
    async fn patch_equipment(
        &self,
        id: &EquipmentId,
        patch: &EquipmentPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Equipment>;

    /// `NotFound` if absent
    async fn delete_equipment(&self, id: &EquipmentId) -> StoreResult<()>;

    /// Health check for the storage backend
    async fn health_check(&self) -> StoreResult<()>;
}
