//! Customer account operations

use super::require_non_blank;
use crate::auth::{CallerIdentity, Operation};
use crate::store::StoreError;
use crate::{ApplicationError, ApplicationResult, InventoryApplication};
use chrono::Utc;
use cryptiomt_core::{CustomerAccount, CustomerId, CustomerPatch, NewCustomer};
use tracing::{debug, info};

impl InventoryApplication {
    pub async fn list_customers(
        &self,
        identity: Option<&CallerIdentity>,
    ) -> ApplicationResult<Vec<CustomerAccount>> {
        self.gateway
            .check(identity, Operation::ReadAllCustomers, None)
            .await?;
        Ok(self.store.list_customers().await?)
    }

    pub async fn get_customer(
        &self,
        identity: Option<&CallerIdentity>,
        id: &CustomerId,
    ) -> ApplicationResult<CustomerAccount> {
        self.gateway
            .check(identity, Operation::ReadCustomer, Some(id))
            .await?;

        debug!("Loading customer {}", id);
        self.store
            .find_customer(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("customer", id))
    }

    /// Create a customer owned by the calling admin
    pub async fn create_customer(
        &self,
        identity: Option<&CallerIdentity>,
        input: NewCustomer,
    ) -> ApplicationResult<CustomerAccount> {
        let (principal, _) = self
            .gateway
            .check(identity, Operation::CreateCustomer, None)
            .await?;
        let creator = principal
            .admin_account()
            .ok_or_else(|| ApplicationError::unauthorized(Operation::CreateCustomer.kind()))?;

        require_non_blank("name", &input.name)?;
        require_non_blank("email", &input.email)?;
        require_non_blank("company", &input.company)?;

        let customer = CustomerAccount::new(input, creator.id.clone(), Utc::now());
        match self.store.insert_customer(&customer).await {
            Ok(()) => {}
            Err(StoreError::Conflict { message }) if customer.subject.is_some() => {
                return Err(ApplicationError::validation("subject", message));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Customer {} created by {}", customer.id, creator.subject);
        Ok(customer)
    }

    pub async fn update_customer(
        &self,
        identity: Option<&CallerIdentity>,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> ApplicationResult<CustomerAccount> {
        let (principal, _) = self
            .gateway
            .check(identity, Operation::UpdateCustomer, Some(id))
            .await?;

        for (field, value) in [
            ("name", &patch.name),
            ("email", &patch.email),
            ("company", &patch.company),
        ] {
            if let Some(value) = value {
                require_non_blank(field, value)?;
            }
        }

        let customer = self.store.patch_customer(id, &patch, Utc::now()).await?;
        info!("Customer {} updated by {}", id, principal.summary());
        Ok(customer)
    }

    /// The customer linked to the caller's login, if any. Not gated.
    pub async fn current_customer(
        &self,
        identity: Option<&CallerIdentity>,
    ) -> ApplicationResult<Option<CustomerAccount>> {
        match identity {
            Some(identity) => Ok(self
                .store
                .find_customer_by_subject(&identity.subject)
                .await?),
            None => Ok(None),
        }
    }
}
