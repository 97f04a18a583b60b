//! Access gateway
//!
//! Resolves the caller into a [`Principal`], decides whether an operation is
//! allowed and which slice of the inventory it may see.

use super::{CallerIdentity, Principal, Role};
use crate::store::DocumentStore;
use crate::{ApplicationError, ApplicationResult};
use chrono::Utc;
use cryptiomt_core::{AccessConfig, AdminProvision, CustomerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The six gated operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    ReadAllCustomers,
    ReadCustomer,
    WriteCustomer,
    ReadEquipment,
    WriteEquipment,
    ReadAdminRoster,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::ReadAllCustomers => "read_all_customers",
            OperationKind::ReadCustomer => "read_customer",
            OperationKind::WriteCustomer => "write_customer",
            OperationKind::ReadEquipment => "read_equipment",
            OperationKind::WriteEquipment => "write_equipment",
            OperationKind::ReadAdminRoster => "read_admin_roster",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A gated operation together with its mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadAllCustomers,
    ReadCustomer,
    CreateCustomer,
    UpdateCustomer,
    ListEquipment,
    EquipmentStats,
    WriteEquipment,
    ReadAdminRoster,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::ReadAllCustomers => OperationKind::ReadAllCustomers,
            Operation::ReadCustomer => OperationKind::ReadCustomer,
            Operation::CreateCustomer | Operation::UpdateCustomer => OperationKind::WriteCustomer,
            Operation::ListEquipment | Operation::EquipmentStats => OperationKind::ReadEquipment,
            Operation::WriteEquipment => OperationKind::WriteEquipment,
            Operation::ReadAdminRoster => OperationKind::ReadAdminRoster,
        }
    }
}

/// Row filter attached to an allowed decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No filter
    Unrestricted,
    /// Only rows belonging to this customer
    Customer(CustomerId),
    /// The empty set
    Nothing,
}

impl Scope {
    /// Narrow this scope by a caller-supplied customer filter
    pub fn intersect(&self, requested: Option<&CustomerId>) -> Scope {
        match (self, requested) {
            (scope, None) => scope.clone(),
            (Scope::Unrestricted, Some(id)) => Scope::Customer(id.clone()),
            (Scope::Customer(own), Some(id)) if own == id => Scope::Customer(own.clone()),
            _ => Scope::Nothing,
        }
    }

    /// Check if a row owned by `customer_id` is visible
    pub fn admits(&self, customer_id: &CustomerId) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::Customer(id) => id == customer_id,
            Scope::Nothing => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { scope: Scope },
    Deny { operation: OperationKind, denial: Denial },
}

impl Decision {
    fn allow(scope: Scope) -> Self {
        Decision::Allow { scope }
    }

    fn deny(operation: Operation, denial: Denial) -> Self {
        Decision::Deny {
            operation: operation.kind(),
            denial,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    /// Convert into the allowed scope or the matching application error
    pub fn into_result(self) -> ApplicationResult<Scope> {
        match self {
            Decision::Allow { scope } => Ok(scope),
            Decision::Deny {
                operation,
                denial: Denial::Unauthenticated,
            } => Err(ApplicationError::unauthenticated(operation)),
            Decision::Deny {
                operation,
                denial: Denial::Unauthorized,
            } => Err(ApplicationError::unauthorized(operation)),
        }
    }
}

/// Decide whether `principal` may perform `operation`.
///
/// `hint` names the customer the operation targets, when there is one.
pub fn authorize(principal: &Principal, operation: Operation, hint: Option<&CustomerId>) -> Decision {
    let role = match principal.role() {
        Some(role) => role,
        None => return Decision::deny(operation, Denial::Unauthenticated),
    };

    match operation {
        Operation::ReadAllCustomers | Operation::CreateCustomer => {
            if role.includes(&Role::Admin) {
                Decision::allow(Scope::Unrestricted)
            } else {
                Decision::deny(operation, Denial::Unauthorized)
            }
        }
        Operation::ReadAdminRoster => {
            if role == Role::SuperAdmin {
                Decision::allow(Scope::Unrestricted)
            } else {
                Decision::deny(operation, Denial::Unauthorized)
            }
        }
        Operation::UpdateCustomer => {
            if role.is_staff() {
                Decision::allow(Scope::Unrestricted)
            } else {
                Decision::deny(operation, Denial::Unauthorized)
            }
        }
        Operation::ReadCustomer | Operation::ListEquipment => match principal {
            Principal::Customer { customer_id, .. } => {
                let scope = customer_id
                    .as_ref()
                    .map_or(Scope::Nothing, |id| Scope::Customer(id.clone()));
                match hint {
                    Some(target) if !scope.admits(target) => {
                        Decision::deny(operation, Denial::Unauthorized)
                    }
                    _ => Decision::allow(scope),
                }
            }
            _ => Decision::allow(Scope::Unrestricted),
        },
        Operation::EquipmentStats => Decision::allow(
            hint.map_or(Scope::Unrestricted, |id| Scope::Customer(id.clone())),
        ),
        Operation::WriteEquipment => Decision::allow(Scope::Unrestricted),
    }
}

/// Resolves principals against the document store and applies the
/// first-login provisioning policy.
#[derive(Clone)]
pub struct AccessGateway {
    store: Arc<dyn DocumentStore>,
    provision: Option<AdminProvision>,
}

impl AccessGateway {
    pub fn new(store: Arc<dyn DocumentStore>, access: &AccessConfig) -> Self {
        Self {
            store,
            provision: access.provision(),
        }
    }

    /// Account template for first logins, `None` when provisioning is off
    pub fn provision(&self) -> Option<&AdminProvision> {
        self.provision.as_ref()
    }

    /// Resolve the caller, provisioning an admin account for first-time
    /// callers that are neither staff nor linked to a customer.
    pub async fn resolve(&self, identity: Option<&CallerIdentity>) -> ApplicationResult<Principal> {
        self.resolve_with(identity, true).await
    }

    /// Resolve the caller without any side effect
    pub async fn lookup(&self, identity: Option<&CallerIdentity>) -> ApplicationResult<Principal> {
        self.resolve_with(identity, false).await
    }

    async fn resolve_with(
        &self,
        identity: Option<&CallerIdentity>,
        provision: bool,
    ) -> ApplicationResult<Principal> {
        let Some(identity) = identity else {
            return Ok(Principal::Anonymous);
        };
        let subject = identity.subject.clone();

        if let Some(account) = self.store.find_admin_by_subject(&subject).await? {
            debug!("Resolved {} as {}", subject, account.role);
            return Ok(Principal::Admin { subject, account });
        }

        if let Some(customer) = self.store.find_customer_by_subject(&subject).await? {
            debug!("Resolved {} as customer {}", subject, customer.id);
            return Ok(Principal::Customer {
                subject,
                customer_id: Some(customer.id),
            });
        }

        if let (true, Some(template)) = (provision, self.provision.as_ref()) {
            let login = identity.login(Utc::now());
            if let Some(account) = self.store.upsert_admin_account(&login, Some(template)).await? {
                info!(
                    "Provisioned admin account {} for {} with role {}",
                    account.id, subject, account.role
                );
                return Ok(Principal::Admin { subject, account });
            }
        }

        Ok(Principal::Customer {
            subject,
            customer_id: None,
        })
    }

    /// Resolve the caller and authorize `operation`, returning the principal
    /// and the scope its queries must be restricted to.
    pub async fn check(
        &self,
        identity: Option<&CallerIdentity>,
        operation: Operation,
        hint: Option<&CustomerId>,
    ) -> ApplicationResult<(Principal, Scope)> {
        let principal = self.resolve(identity).await?;
        let decision = authorize(&principal, operation, hint);

        if let Decision::Deny { operation, denial } = &decision {
            warn!(
                subject = principal.subject().unwrap_or("-"),
                "Denied {} for {}: {:?}",
                operation,
                principal.summary(),
                denial
            );
        }

        let scope = decision.into_result()?;
        Ok((principal, scope))
    }
}
