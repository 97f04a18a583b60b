//! Integration test helpers
//!
//! Builds the full router over an in-memory store and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use cryptiomt_applications::{CallerIdentity, InventoryApplication};
use cryptiomt_core::{
    AccessConfig, AdminAccount, AdminProvision, AdminRole, AppConfig, CustomerAccount,
    NewCustomer, SubscriptionTier,
};
use cryptiomt_web::{create_app, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::LazyLock;
use tower::ServiceExt;

// Initialize tracing only once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

pub struct TestApp {
    pub router: Router,
    pub application: InventoryApplication,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_access(AccessConfig::default())
    }

    pub fn with_access(access: AccessConfig) -> Self {
        LazyLock::force(&TRACING);

        let config = AppConfig {
            access,
            ..Default::default()
        };
        let application = InventoryApplication::in_memory(&config.access);
        let state = AppState::with_application(config, application.clone());

        Self {
            router: create_app(state),
            application,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        subject: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header("x-user-id", subject);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, subject: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, subject, None).await
    }

    pub async fn post(&self, uri: &str, subject: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, subject, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, subject: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, subject, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, subject: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, subject, None).await
    }

    /// Seed an admin account with `role` for `subject`
    pub async fn seed_staff(&self, subject: &str, role: AdminRole) -> AdminAccount {
        let account = AdminAccount::provisioned(
            &CallerIdentity::new(subject).login(Utc::now()),
            &AdminProvision {
                role,
                permissions: Vec::new(),
            },
        );
        self.application
            .store()
            .insert_admin_account(&account)
            .await
            .unwrap();
        account
    }

    /// Seed a customer, optionally linked to a portal subject
    pub async fn seed_customer(&self, name: &str, subject: Option<&str>) -> CustomerAccount {
        let customer = CustomerAccount::new(
            NewCustomer {
                name: name.to_string(),
                email: format!("it@{}.example", name.to_lowercase()),
                company: name.to_string(),
                subscription_tier: SubscriptionTier::Pro,
                subject: subject.map(str::to_string),
            },
            cryptiomt_core::AdminAccountId("seed".to_string()),
            Utc::now(),
        );
        self.application
            .store()
            .insert_customer(&customer)
            .await
            .unwrap();
        customer
    }
}

pub fn device_body(customer_id: &str, name: &str) -> Value {
    serde_json::json!({
        "customer_id": customer_id,
        "device_name": name,
        "device_type": "iot",
        "operating_system": "Embedded Linux",
        "os_version": "4.19",
        "location": "Radiology"
    })
}
