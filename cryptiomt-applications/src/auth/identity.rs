//! Caller identity and resolved principals

use super::Role;
use chrono::{DateTime, Utc};
use cryptiomt_core::{AdminAccount, AdminLogin, CustomerId};
use serde::{Deserialize, Serialize};

/// Identity supplied by the identity provider for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable external subject identifier
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CallerIdentity {
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Login bookkeeping for this identity at `at`
    pub fn login(&self, at: DateTime<Utc>) -> AdminLogin {
        AdminLogin {
            subject: self.subject.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            at,
        }
    }
}

/// The caller as seen by the access gateway, resolved once per request
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// No identity was supplied
    Anonymous,
    /// Caller with a staff account
    Admin {
        subject: String,
        account: AdminAccount,
    },
    /// Caller without a staff account; `customer_id` is the linked customer, if any
    Customer {
        subject: String,
        customer_id: Option<CustomerId>,
    },
}

impl Principal {
    /// Effective role, `None` for anonymous callers
    pub fn role(&self) -> Option<Role> {
        match self {
            Principal::Anonymous => None,
            Principal::Admin { account, .. } => Some(account.role.into()),
            Principal::Customer { .. } => Some(Role::Customer),
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::Admin { subject, .. } | Principal::Customer { subject, .. } => {
                Some(subject.as_str())
            }
        }
    }

    pub fn admin_account(&self) -> Option<&AdminAccount> {
        match self {
            Principal::Admin { account, .. } => Some(account),
            _ => None,
        }
    }

    /// Create a summary string for logging
    pub fn summary(&self) -> String {
        match self {
            Principal::Anonymous => "anonymous".to_string(),
            Principal::Admin { subject, account } => format!("{}({})", subject, account.role),
            Principal::Customer {
                subject,
                customer_id: Some(id),
            } => format!("{}(customer:{})", subject, id),
            Principal::Customer {
                subject,
                customer_id: None,
            } => format!("{}(unlinked)", subject),
        }
    }
}
