//! Admin account operations

use crate::auth::{CallerIdentity, Operation};
use crate::{ApplicationError, ApplicationResult, InventoryApplication};
use chrono::Utc;
use cryptiomt_core::AdminAccount;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const SIGN_IN: &str = "sign_in";

/// The signed-in caller and their admin account, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CurrentUser {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub account: Option<AdminAccount>,
}

impl InventoryApplication {
    /// The caller's identity and admin account. Never provisions.
    pub async fn current_user(
        &self,
        identity: Option<&CallerIdentity>,
    ) -> ApplicationResult<Option<CurrentUser>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        let account = self.store.find_admin_by_subject(&identity.subject).await?;
        Ok(Some(CurrentUser {
            subject: identity.subject.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            account,
        }))
    }

    /// Record a login, creating the admin account on first sign-in.
    ///
    /// Callers linked to a customer are never given an admin account here.
    pub async fn sign_in(&self, identity: Option<&CallerIdentity>) -> ApplicationResult<AdminAccount> {
        let identity = identity.ok_or_else(|| ApplicationError::unauthenticated(SIGN_IN))?;

        let linked = self
            .store
            .find_customer_by_subject(&identity.subject)
            .await?
            .is_some();
        let provision = if linked { None } else { self.gateway.provision() };

        let login = identity.login(Utc::now());
        match self.store.upsert_admin_account(&login, provision).await? {
            Some(account) => {
                info!("Signed in {} as {}", identity.subject, account.role);
                Ok(account)
            }
            None => {
                warn!("Sign-in refused for {}: no admin account", identity.subject);
                Err(ApplicationError::unauthorized(SIGN_IN))
            }
        }
    }

    /// Every admin account; super admins only
    pub async fn list_admin_accounts(
        &self,
        identity: Option<&CallerIdentity>,
    ) -> ApplicationResult<Vec<AdminAccount>> {
        self.gateway
            .check(identity, Operation::ReadAdminRoster, None)
            .await?;
        Ok(self.store.list_admin_accounts().await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{app, customer, staff};
    use crate::{ApplicationError, CallerIdentity, InventoryApplication};
    use cryptiomt_core::{AccessConfig, AdminRole};

    #[tokio::test]
    async fn test_first_sign_in_provisions_admin() {
        let app = app();
        let identity = CallerIdentity::new("u_new")
            .with_name("Grace")
            .with_email("grace@example.com");

        let account = app.sign_in(Some(&identity)).await.unwrap();
        assert_eq!(account.role, AdminRole::Admin);
        assert_eq!(account.permissions, vec!["read", "write", "manage_customers"]);
        assert_eq!(account.name, "Grace");
        assert!(account.is_active);
        assert!(account.last_login.is_some());
    }

    #[tokio::test]
    async fn test_repeat_sign_in_keeps_one_account() {
        let app = app();
        let identity = CallerIdentity::new("u_repeat").with_name("Linus");

        let first = app.sign_in(Some(&identity)).await.unwrap();
        let second = app
            .sign_in(Some(&CallerIdentity::new("u_repeat")))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Linus");
        assert!(second.last_login >= first.last_login);
        assert_eq!(app.store().list_admin_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_converges() {
        let app = app();
        let calls = (0..12).map(|i| {
            let app = app.clone();
            async move {
                let identity = CallerIdentity::new("u_race");
                if i % 2 == 0 {
                    app.sign_in(Some(&identity)).await.map(|_| ())
                } else {
                    app.list_customers(Some(&identity)).await.map(|_| ())
                }
            }
        });
        let handles: Vec<_> = calls.map(tokio::spawn).collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let accounts = app.store().list_admin_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, AdminRole::Admin);
    }

    #[tokio::test]
    async fn test_sign_in_requires_identity() {
        let err = app().sign_in(None).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_sign_in_without_provisioning() {
        let app = InventoryApplication::in_memory(&AccessConfig {
            auto_provision: false,
            ..Default::default()
        });

        let err = app
            .sign_in(Some(&CallerIdentity::new("stranger")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Unauthorized { .. }));

        let known = staff(&app, "known", AdminRole::Analyst).await;
        let account = app.sign_in(Some(&known)).await.unwrap();
        assert_eq!(account.role, AdminRole::Analyst);
    }

    #[tokio::test]
    async fn test_portal_login_is_not_provisioned() {
        let app = app();
        customer(&app, "Mercy", Some("portal_mercy")).await;

        let err = app
            .sign_in(Some(&CallerIdentity::new("portal_mercy")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Unauthorized { .. }));
        assert!(app.store().list_admin_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_current_user_is_not_gated() {
        let app = app();
        assert!(app.current_user(None).await.unwrap().is_none());

        let visitor = CallerIdentity::new("visitor").with_email("v@example.com");
        let current = app.current_user(Some(&visitor)).await.unwrap().unwrap();
        assert_eq!(current.subject, "visitor");
        assert!(current.account.is_none());
        assert!(app.store().list_admin_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roster_is_super_admin_only() {
        let app = app();
        let root = staff(&app, "root", AdminRole::SuperAdmin).await;
        let admin = staff(&app, "admin", AdminRole::Admin).await;
        let analyst = staff(&app, "analyst", AdminRole::Analyst).await;

        assert_eq!(app.list_admin_accounts(Some(&root)).await.unwrap().len(), 3);
        for caller in [&admin, &analyst] {
            let err = app.list_admin_accounts(Some(caller)).await.unwrap_err();
            assert!(matches!(
                err,
                ApplicationError::Unauthorized { ref operation } if operation == "read_admin_roster"
            ));
        }
    }
}
