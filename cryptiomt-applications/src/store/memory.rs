//! In-memory document store (default backend)

use super::{DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cryptiomt_core::{
    AdminAccount, AdminLogin, AdminProvision, CustomerAccount, CustomerId, CustomerPatch,
    Equipment, EquipmentId, EquipmentPatch,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    /// Keyed by subject
    admins: HashMap<String, AdminAccount>,
    customers: HashMap<CustomerId, CustomerAccount>,
    equipment: HashMap<EquipmentId, Equipment>,
}

/// Document store held entirely in memory behind one lock
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_admin_by_subject(&self, subject: &str) -> StoreResult<Option<AdminAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.admins.get(subject).cloned())
    }

    async fn upsert_admin_account(
        &self,
        login: &AdminLogin,
        provision: Option<&AdminProvision>,
    ) -> StoreResult<Option<AdminAccount>> {
        let mut tables = self.tables.write().await;

        if let Some(account) = tables.admins.get_mut(&login.subject) {
            account.apply_login(login);
            return Ok(Some(account.clone()));
        }

        let Some(provision) = provision else {
            return Ok(None);
        };

        let account = AdminAccount::provisioned(login, provision);
        debug!("Provisioned admin account {} for {}", account.id, login.subject);
        tables
            .admins
            .insert(login.subject.clone(), account.clone());
        Ok(Some(account))
    }

    async fn insert_admin_account(&self, account: &AdminAccount) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.admins.contains_key(&account.subject) {
            return Err(StoreError::conflict(format!(
                "admin account for subject '{}' already exists",
                account.subject
            )));
        }
        tables
            .admins
            .insert(account.subject.clone(), account.clone());
        Ok(())
    }

    async fn list_admin_accounts(&self) -> StoreResult<Vec<AdminAccount>> {
        let tables = self.tables.read().await;
        let mut accounts: Vec<AdminAccount> = tables.admins.values().cloned().collect();
        accounts.sort_by(|a, b| a.subject.cmp(&b.subject));
        Ok(accounts)
    }

    async fn find_customer(&self, id: &CustomerId) -> StoreResult<Option<CustomerAccount>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.get(id).cloned())
    }

    async fn find_customer_by_subject(
        &self,
        subject: &str,
    ) -> StoreResult<Option<CustomerAccount>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.subject.as_deref() == Some(subject))
            .cloned())
    }

    async fn list_customers(&self) -> StoreResult<Vec<CustomerAccount>> {
        let tables = self.tables.read().await;
        let mut customers: Vec<CustomerAccount> = tables.customers.values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(customers)
    }

    async fn insert_customer(&self, customer: &CustomerAccount) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.customers.contains_key(&customer.id) {
            return Err(StoreError::conflict(format!(
                "customer '{}' already exists",
                customer.id
            )));
        }
        if let Some(subject) = customer.subject.as_deref() {
            if tables
                .customers
                .values()
                .any(|c| c.subject.as_deref() == Some(subject))
            {
                return Err(StoreError::conflict(format!(
                    "subject '{}' is already linked to a customer",
                    subject
                )));
            }
        }
        tables
            .customers
            .insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn patch_customer(
        &self,
        id: &CustomerId,
        patch: &CustomerPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<CustomerAccount> {
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("customer", id))?;
        customer.apply_patch(patch, now);
        Ok(customer.clone())
    }

    async fn find_equipment(&self, id: &EquipmentId) -> StoreResult<Option<Equipment>> {
        let tables = self.tables.read().await;
        Ok(tables.equipment.get(id).cloned())
    }

    async fn list_equipment(
        &self,
        customer_id: Option<&CustomerId>,
    ) -> StoreResult<Vec<Equipment>> {
        let tables = self.tables.read().await;
        let mut equipment: Vec<Equipment> = tables
            .equipment
            .values()
            .filter(|e| customer_id.map_or(true, |id| &e.customer_id == id))
            .cloned()
            .collect();
        equipment.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(equipment)
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.equipment.contains_key(&equipment.id) {
            return Err(StoreError::conflict(format!(
                "equipment '{}' already exists",
                equipment.id
            )));
        }
        tables
            .equipment
            .insert(equipment.id.clone(), equipment.clone());
        Ok(())
    }

    async fn patch_equipment(
        &self,
        id: &EquipmentId,
        patch: &EquipmentPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Equipment> {
        let mut tables = self.tables.write().await;
        let equipment = tables
            .equipment
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("equipment", id))?;
        equipment.apply_patch(patch, now);
        Ok(equipment.clone())
    }

    async fn delete_equipment(&self, id: &EquipmentId) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .equipment
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("equipment", id))
    }

    async fn health_check(&self) -> StoreResult<()> {
        // Memory storage is always healthy
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptiomt_core::{
        AdminAccountId, AdminRole, DeviceType, NewCustomer, NewEquipment, SubscriptionTier,
    };

    fn login(subject: &str, name: Option<&str>) -> AdminLogin {
        AdminLogin {
            subject: subject.to_string(),
            name: name.map(str::to_string),
            email: None,
            at: Utc::now(),
        }
    }

    fn provision() -> AdminProvision {
        AdminProvision {
            role: AdminRole::Admin,
            permissions: vec!["read".to_string()],
        }
    }

    fn device(customer: &str) -> Equipment {
        Equipment::new(
            NewEquipment {
                customer_id: CustomerId::from(customer),
                device_name: "pump-7".to_string(),
                device_type: DeviceType::Iot,
                operating_system: "RTOS".to_string(),
                os_version: "2.1".to_string(),
                ip_address: None,
                mac_address: None,
                location: None,
                department: None,
                owner: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_upsert_without_provision_does_not_create() {
        let store = MemoryDocumentStore::new();
        let result = store
            .upsert_admin_account(&login("u1", None), None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.list_admin_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_patches_existing_account() {
        let store = MemoryDocumentStore::new();
        let created = store
            .upsert_admin_account(&login("u1", Some("Ada")), Some(&provision()))
            .await
            .unwrap()
            .unwrap();

        let later = login("u1", Some("Ada L."));
        let patched = store
            .upsert_admin_account(&later, Some(&provision()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(patched.id, created.id);
        assert_eq!(patched.name, "Ada L.");
        assert_eq!(patched.last_login, Some(later.at));
        assert_eq!(store.list_admin_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_converge() {
        let store = MemoryDocumentStore::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_admin_account(&login("same", None), Some(&provision()))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let accounts = store.list_admin_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].subject, "same");
    }

    #[tokio::test]
    async fn test_equipment_listing_filters_by_customer() {
        let store = MemoryDocumentStore::new();
        store.insert_equipment(&device("a")).await.unwrap();
        store.insert_equipment(&device("a")).await.unwrap();
        store.insert_equipment(&device("b")).await.unwrap();

        let only_a = store
            .list_equipment(Some(&CustomerId::from("a")))
            .await
            .unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|e| e.customer_id.0 == "a"));
        assert_eq!(store.list_equipment(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let store = MemoryDocumentStore::new();
        let missing = EquipmentId::from("nope");

        let err = store.delete_equipment(&missing).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store
            .patch_customer(&CustomerId::from("nope"), &CustomerPatch::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    fn linked_customer(name: &str, subject: Option<&str>) -> CustomerAccount {
        CustomerAccount::new(
            NewCustomer {
                name: name.to_string(),
                email: "it@clinic.example".to_string(),
                company: name.to_string(),
                subscription_tier: SubscriptionTier::Basic,
                subject: subject.map(str::to_string),
            },
            AdminAccountId("admin_1".to_string()),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_portal_subject_links_one_customer() {
        let store = MemoryDocumentStore::new();
        let first = linked_customer("First", Some("portal"));
        store.insert_customer(&first).await.unwrap();

        let err = store
            .insert_customer(&linked_customer("Second", Some("portal")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        store
            .insert_customer(&linked_customer("Unlinked", None))
            .await
            .unwrap();
        store
            .insert_customer(&linked_customer("Also unlinked", None))
            .await
            .unwrap();

        let linked = store.find_customer_by_subject("portal").await.unwrap();
        assert_eq!(linked.map(|c| c.id), Some(first.id));
        assert_eq!(store.list_customers().await.unwrap().len(), 3);
    }
}
