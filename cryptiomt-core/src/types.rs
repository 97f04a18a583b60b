//! Inventory records
//!
//! Admin accounts, customer accounts and equipment as they are stored by
//! every document store backend.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;
use uuid::Uuid;

/// Admin account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(transparent)]
pub struct AdminAccountId(pub String);

/// Customer account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(transparent)]
pub struct CustomerId(pub String);

/// Equipment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(transparent)]
pub struct EquipmentId(pub String);

impl AdminAccountId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl EquipmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for AdminAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for EquipmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Role stored on an admin account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Analyst,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super_admin",
            AdminRole::Admin => "admin",
            AdminRole::Analyst => "analyst",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "admin" => Ok(AdminRole::Admin),
            "analyst" => Ok(AdminRole::Analyst),
            _ => Err(CoreError::invalid_value("role", s)),
        }
    }
}

/// Customer subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Basic,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(SubscriptionTier::Basic),
            "pro" => Ok(SubscriptionTier::Pro),
            "enterprise" => Ok(SubscriptionTier::Enterprise),
            _ => Err(CoreError::invalid_value("subscription_tier", s)),
        }
    }
}

/// Kind of device tracked in the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Server,
    Workstation,
    Laptop,
    Mobile,
    Iot,
    NetworkDevice,
    Other,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Server => "server",
            DeviceType::Workstation => "workstation",
            DeviceType::Laptop => "laptop",
            DeviceType::Mobile => "mobile",
            DeviceType::Iot => "iot",
            DeviceType::NetworkDevice => "network_device",
            DeviceType::Other => "other",
        }
    }
}

impl FromStr for DeviceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(DeviceType::Server),
            "workstation" => Ok(DeviceType::Workstation),
            "laptop" => Ok(DeviceType::Laptop),
            "mobile" => Ok(DeviceType::Mobile),
            "iot" => Ok(DeviceType::Iot),
            "network_device" => Ok(DeviceType::NetworkDevice),
            "other" => Ok(DeviceType::Other),
            _ => Err(CoreError::invalid_value("device_type", s)),
        }
    }
}

/// Operational status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "active",
            EquipmentStatus::Inactive => "inactive",
            EquipmentStatus::Maintenance => "maintenance",
        }
    }
}

impl FromStr for EquipmentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EquipmentStatus::Active),
            "inactive" => Ok(EquipmentStatus::Inactive),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            _ => Err(CoreError::invalid_value("status", s)),
        }
    }
}

/// Staff-side account granting a role over the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AdminAccount {
    pub id: AdminAccountId,
    /// Identity provider subject this account belongs to (unique)
    pub subject: String,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub permissions: Vec<String>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub customers_assigned: Vec<CustomerId>,
}

/// Sign-in data refreshed on every authenticated login
#[derive(Debug, Clone)]
pub struct AdminLogin {
    pub subject: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub at: DateTime<Utc>,
}

/// Role and permissions given to a newly provisioned admin account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminProvision {
    pub role: AdminRole,
    pub permissions: Vec<String>,
}

impl AdminAccount {
    /// Build the account created for a first-time login
    pub fn provisioned(login: &AdminLogin, provision: &AdminProvision) -> Self {
        Self {
            id: AdminAccountId::generate(),
            subject: login.subject.clone(),
            email: login.email.clone().unwrap_or_default(),
            name: login.name.clone().unwrap_or_default(),
            role: provision.role,
            permissions: provision.permissions.clone(),
            is_active: true,
            last_login: Some(login.at),
            customers_assigned: Vec::new(),
        }
    }

    /// Refresh login bookkeeping; blank provider values keep the stored ones
    pub fn apply_login(&mut self, login: &AdminLogin) {
        self.last_login = Some(login.at);
        if let Some(name) = login.name.as_deref().filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(email) = login.email.as_deref().filter(|e| !e.is_empty()) {
            self.email = email.to_string();
        }
    }
}

/// Managed customer organization, optionally linked to a portal login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CustomerAccount {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub subscription_tier: SubscriptionTier,
    pub is_active: bool,
    pub created_by: AdminAccountId,
    pub last_updated: DateTime<Utc>,
    /// Identity provider subject granted customer-portal access
    pub subject: Option<String>,
}

/// Input for creating a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub company: String,
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Partial customer update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub subscription_tier: Option<SubscriptionTier>,
    pub is_active: Option<bool>,
}

impl CustomerAccount {
    pub fn new(input: NewCustomer, created_by: AdminAccountId, now: DateTime<Utc>) -> Self {
        Self {
            id: CustomerId::generate(),
            name: input.name,
            email: input.email,
            company: input.company,
            subscription_tier: input.subscription_tier,
            is_active: true,
            created_by,
            last_updated: now,
            subject: input.subject,
        }
    }

    pub fn apply_patch(&mut self, patch: &CustomerPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(company) = &patch.company {
            self.company = company.clone();
        }
        if let Some(tier) = patch.subscription_tier {
            self.subscription_tier = tier;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.last_updated = now;
    }
}

/// A device in a customer's inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Equipment {
    pub id: EquipmentId,
    pub customer_id: CustomerId,
    pub device_name: String,
    pub device_type: DeviceType,
    pub operating_system: String,
    pub os_version: String,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub owner: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub status: EquipmentStatus,
    pub risk_score: Option<f64>,
    pub last_risk_assessment: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Row reference kept for spreadsheet sync tracking
    pub excel_row_id: Option<String>,
}

/// Input for adding a device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct NewEquipment {
    pub customer_id: CustomerId,
    pub device_name: String,
    pub device_type: DeviceType,
    pub operating_system: String,
    pub os_version: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

/// Partial device update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EquipmentPatch {
    pub device_name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub operating_system: Option<String>,
    pub os_version: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub owner: Option<String>,
    pub status: Option<EquipmentStatus>,
}

impl Equipment {
    /// New devices start active with every timestamp set to `now`
    pub fn new(input: NewEquipment, now: DateTime<Utc>) -> Self {
        Self {
            id: EquipmentId::generate(),
            customer_id: input.customer_id,
            device_name: input.device_name,
            device_type: input.device_type,
            operating_system: input.operating_system,
            os_version: input.os_version,
            ip_address: input.ip_address,
            mac_address: input.mac_address,
            location: input.location,
            department: input.department,
            owner: input.owner,
            last_seen: Some(now),
            status: EquipmentStatus::Active,
            risk_score: None,
            last_risk_assessment: None,
            created_at: now,
            updated_at: now,
            excel_row_id: None,
        }
    }

    pub fn apply_patch(&mut self, patch: &EquipmentPatch, now: DateTime<Utc>) {
        if let Some(v) = &patch.device_name {
            self.device_name = v.clone();
        }
        if let Some(v) = patch.device_type {
            self.device_type = v;
        }
        if let Some(v) = &patch.operating_system {
            self.operating_system = v.clone();
        }
        if let Some(v) = &patch.os_version {
            self.os_version = v.clone();
        }
        if let Some(v) = &patch.ip_address {
            self.ip_address = Some(v.clone());
        }
        if let Some(v) = &patch.mac_address {
            self.mac_address = Some(v.clone());
        }
        if let Some(v) = &patch.location {
            self.location = Some(v.clone());
        }
        if let Some(v) = &patch.department {
            self.department = Some(v.clone());
        }
        if let Some(v) = &patch.owner {
            self.owner = Some(v.clone());
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        self.updated_at = now;
    }
}
