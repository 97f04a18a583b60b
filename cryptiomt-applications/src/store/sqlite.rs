//! SQLite document store

use super::{DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cryptiomt_core::{
    AdminAccount, AdminAccountId, AdminLogin, AdminProvision, CustomerAccount, CustomerId,
    CustomerPatch, Equipment, EquipmentId, EquipmentPatch,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Sqlite, SqlitePool, Type};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS admin_accounts (
        id TEXT PRIMARY KEY,
        subject TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL DEFAULT '',
        role TEXT NOT NULL,
        permissions TEXT NOT NULL DEFAULT '[]',
        is_active INTEGER NOT NULL DEFAULT 1,
        last_login TEXT,
        customers_assigned TEXT NOT NULL DEFAULT '[]'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        company TEXT NOT NULL,
        subscription_tier TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_by TEXT NOT NULL,
        last_updated TEXT NOT NULL,
        subject TEXT
    )
    "#,
    "DROP INDEX IF EXISTS idx_customers_subject",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_subject_unique ON customers(subject) \
     WHERE subject IS NOT NULL",
    r#"
    CREATE TABLE IF NOT EXISTS equipment (
        id TEXT PRIMARY KEY,
        customer_id TEXT NOT NULL,
        device_name TEXT NOT NULL,
        device_type TEXT NOT NULL,
        operating_system TEXT NOT NULL,
        os_version TEXT NOT NULL,
        ip_address TEXT,
        mac_address TEXT,
        location TEXT,
        department TEXT,
        owner TEXT,
        last_seen TEXT,
        status TEXT NOT NULL,
        risk_score REAL,
        last_risk_assessment TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        excel_row_id TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_equipment_customer ON equipment(customer_id)",
];

const ADMIN_COLUMNS: &str =
    "id, subject, email, name, role, permissions, is_active, last_login, customers_assigned";

const CUSTOMER_COLUMNS: &str =
    "id, name, email, company, subscription_tier, is_active, created_by, last_updated, subject";

const EQUIPMENT_COLUMNS: &str = "id, customer_id, device_name, device_type, operating_system, \
     os_version, ip_address, mac_address, location, department, owner, last_seen, status, \
     risk_score, last_risk_assessment, created_at, updated_at, excel_row_id";

/// Document store backed by a SQLite database
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and create the schema.
    ///
    /// `sqlite::memory:` is held on a single connection so every query sees
    /// the same database.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        info!("Connecting to document store: {}", database_url);

        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::backend(format!("Invalid database url: {}", e)))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Database connection failed: {}", e);
                StoreError::backend(format!("Failed to connect to SQLite database: {}", e))
            })?;

        let store = Self::new(pool);
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::backend(format!("Failed to create schema: {}", e)))?;
        }
        debug!("Document store schema ready");
        Ok(())
    }

    fn column<'r, T>(row: &'r SqliteRow, name: &str) -> StoreResult<T>
    where
        T: Decode<'r, Sqlite> + Type<Sqlite>,
    {
        row.try_get(name)
            .map_err(|e| StoreError::backend(format!("Failed to get {} column: {}", name, e)))
    }

    fn parsed<T: FromStr>(row: &SqliteRow, name: &str) -> StoreResult<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw: String = Self::column(row, name)?;
        raw.parse()
            .map_err(|e| StoreError::backend(format!("Invalid {} value '{}': {}", name, raw, e)))
    }

    fn json_list<T: serde::de::DeserializeOwned>(row: &SqliteRow, name: &str) -> StoreResult<Vec<T>> {
        let raw: String = Self::column(row, name)?;
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::backend(format!("Failed to parse {} JSON: {}", name, e)))
    }

    fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<String> {
        serde_json::to_string(value)
            .map_err(|e| StoreError::backend(format!("Failed to serialize column: {}", e)))
    }

    fn row_to_admin(row: &SqliteRow) -> StoreResult<AdminAccount> {
        Ok(AdminAccount {
            id: AdminAccountId(Self::column(row, "id")?),
            subject: Self::column(row, "subject")?,
            email: Self::column(row, "email")?,
            name: Self::column(row, "name")?,
            role: Self::parsed(row, "role")?,
            permissions: Self::json_list(row, "permissions")?,
            is_active: Self::column(row, "is_active")?,
            last_login: Self::column(row, "last_login")?,
            customers_assigned: Self::json_list(row, "customers_assigned")?,
        })
    }

    fn row_to_customer(row: &SqliteRow) -> StoreResult<CustomerAccount> {
        Ok(CustomerAccount {
            id: CustomerId(Self::column(row, "id")?),
            name: Self::column(row, "name")?,
            email: Self::column(row, "email")?,
            company: Self::column(row, "company")?,
            subscription_tier: Self::parsed(row, "subscription_tier")?,
            is_active: Self::column(row, "is_active")?,
            created_by: AdminAccountId(Self::column(row, "created_by")?),
            last_updated: Self::column(row, "last_updated")?,
            subject: Self::column(row, "subject")?,
        })
    }

    fn row_to_equipment(row: &SqliteRow) -> StoreResult<Equipment> {
        Ok(Equipment {
            id: EquipmentId(Self::column(row, "id")?),
            customer_id: CustomerId(Self::column(row, "customer_id")?),
            device_name: Self::column(row, "device_name")?,
            device_type: Self::parsed(row, "device_type")?,
            operating_system: Self::column(row, "operating_system")?,
            os_version: Self::column(row, "os_version")?,
            ip_address: Self::column(row, "ip_address")?,
            mac_address: Self::column(row, "mac_address")?,
            location: Self::column(row, "location")?,
            department: Self::column(row, "department")?,
            owner: Self::column(row, "owner")?,
            last_seen: Self::column(row, "last_seen")?,
            status: Self::parsed(row, "status")?,
            risk_score: Self::column(row, "risk_score")?,
            last_risk_assessment: Self::column(row, "last_risk_assessment")?,
            created_at: Self::column(row, "created_at")?,
            updated_at: Self::column(row, "updated_at")?,
            excel_row_id: Self::column(row, "excel_row_id")?,
        })
    }

    fn query_error(operation: &str, e: sqlx::Error) -> StoreError {
        match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::conflict(format!("{}: {}", operation, db))
            }
            other => StoreError::backend(format!("{} failed: {}", operation, other)),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn find_admin_by_subject(&self, subject: &str) -> StoreResult<Option<AdminAccount>> {
        let sql = format!("SELECT {} FROM admin_accounts WHERE subject = ?", ADMIN_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("find_admin_by_subject", e))?;

        row.as_ref().map(Self::row_to_admin).transpose()
    }

    async fn upsert_admin_account(
        &self,
        login: &AdminLogin,
        provision: Option<&AdminProvision>,
    ) -> StoreResult<Option<AdminAccount>> {
        let name = login.name.as_deref().unwrap_or_default();
        let email = login.email.as_deref().unwrap_or_default();

        match provision {
            Some(provision) => {
                let account = AdminAccount::provisioned(login, provision);
                sqlx::query(
                    r#"
                    INSERT INTO admin_accounts
                    (id, subject, email, name, role, permissions, is_active, last_login, customers_assigned)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(subject) DO UPDATE SET
                        last_login = excluded.last_login,
                        name = CASE WHEN excluded.name <> '' THEN excluded.name ELSE admin_accounts.name END,
                        email = CASE WHEN excluded.email <> '' THEN excluded.email ELSE admin_accounts.email END
                    "#,
                )
                .bind(&account.id.0)
                .bind(&account.subject)
                .bind(email)
                .bind(name)
                .bind(account.role.as_str())
                .bind(Self::to_json(&account.permissions)?)
                .bind(account.is_active)
                .bind(login.at)
                .bind(Self::to_json(&account.customers_assigned)?)
                .execute(&self.pool)
                .await
                .map_err(|e| Self::query_error("upsert_admin_account", e))?;
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE admin_accounts SET
                        last_login = ?,
                        name = CASE WHEN ? <> '' THEN ? ELSE name END,
                        email = CASE WHEN ? <> '' THEN ? ELSE email END
                    WHERE subject = ?
                    "#,
                )
                .bind(login.at)
                .bind(name)
                .bind(name)
                .bind(email)
                .bind(email)
                .bind(&login.subject)
                .execute(&self.pool)
                .await
                .map_err(|e| Self::query_error("upsert_admin_account", e))?;
            }
        }

        self.find_admin_by_subject(&login.subject).await
    }

    async fn insert_admin_account(&self, account: &AdminAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_accounts
            (id, subject, email, name, role, permissions, is_active, last_login, customers_assigned)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id.0)
        .bind(&account.subject)
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(Self::to_json(&account.permissions)?)
        .bind(account.is_active)
        .bind(account.last_login)
        .bind(Self::to_json(&account.customers_assigned)?)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("insert_admin_account", e))?;
        Ok(())
    }

    async fn list_admin_accounts(&self) -> StoreResult<Vec<AdminAccount>> {
        let sql = format!("SELECT {} FROM admin_accounts ORDER BY subject", ADMIN_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("list_admin_accounts", e))?;

        rows.iter().map(Self::row_to_admin).collect()
    }

    async fn find_customer(&self, id: &CustomerId) -> StoreResult<Option<CustomerAccount>> {
        let sql = format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("find_customer", e))?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn find_customer_by_subject(
        &self,
        subject: &str,
    ) -> StoreResult<Option<CustomerAccount>> {
        let sql = format!(
            "SELECT {} FROM customers WHERE subject = ? LIMIT 1",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("find_customer_by_subject", e))?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn list_customers(&self) -> StoreResult<Vec<CustomerAccount>> {
        let sql = format!("SELECT {} FROM customers ORDER BY name, id", CUSTOMER_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::query_error("list_customers", e))?;

        rows.iter().map(Self::row_to_customer).collect()
    }

    async fn insert_customer(&self, customer: &CustomerAccount) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers
            (id, name, email, company, subscription_tier, is_active, created_by, last_updated, subject)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id.0)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.company)
        .bind(customer.subscription_tier.as_str())
        .bind(customer.is_active)
        .bind(&customer.created_by.0)
        .bind(customer.last_updated)
        .bind(&customer.subject)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("insert_customer", e))?;
        Ok(())
    }

    async fn patch_customer(
        &self,
        id: &CustomerId,
        patch: &CustomerPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<CustomerAccount> {
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                company = COALESCE(?, company),
                subscription_tier = COALESCE(?, subscription_tier),
                is_active = COALESCE(?, is_active),
                last_updated = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.email)
        .bind(&patch.company)
        .bind(patch.subscription_tier.map(|t| t.as_str()))
        .bind(patch.is_active)
        .bind(now)
        .bind(&id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("patch_customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", id));
        }

        self.find_customer(id)
            .await?
            .ok_or_else(|| StoreError::not_found("customer", id))
    }

    async fn find_equipment(&self, id: &EquipmentId) -> StoreResult<Option<Equipment>> {
        let sql = format!("SELECT {} FROM equipment WHERE id = ?", EQUIPMENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("find_equipment", e))?;

        row.as_ref().map(Self::row_to_equipment).transpose()
    }

    async fn list_equipment(
        &self,
        customer_id: Option<&CustomerId>,
    ) -> StoreResult<Vec<Equipment>> {
        let rows = match customer_id {
            Some(customer_id) => {
                let sql = format!(
                    "SELECT {} FROM equipment WHERE customer_id = ? ORDER BY created_at, id",
                    EQUIPMENT_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(&customer_id.0)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM equipment ORDER BY created_at, id",
                    EQUIPMENT_COLUMNS
                );
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(|e| Self::query_error("list_equipment", e))?;

        rows.iter().map(Self::row_to_equipment).collect()
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO equipment ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            EQUIPMENT_COLUMNS
        );
        sqlx::query(&sql)
            .bind(&equipment.id.0)
            .bind(&equipment.customer_id.0)
            .bind(&equipment.device_name)
            .bind(equipment.device_type.as_str())
            .bind(&equipment.operating_system)
            .bind(&equipment.os_version)
            .bind(&equipment.ip_address)
            .bind(&equipment.mac_address)
            .bind(&equipment.location)
            .bind(&equipment.department)
            .bind(&equipment.owner)
            .bind(equipment.last_seen)
            .bind(equipment.status.as_str())
            .bind(equipment.risk_score)
            .bind(equipment.last_risk_assessment)
            .bind(equipment.created_at)
            .bind(equipment.updated_at)
            .bind(&equipment.excel_row_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("insert_equipment", e))?;
        Ok(())
    }

    async fn patch_equipment(
        &self,
        id: &EquipmentId,
        patch: &EquipmentPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Equipment> {
        let result = sqlx::query(
            r#"
            UPDATE equipment SET
                device_name = COALESCE(?, device_name),
                device_type = COALESCE(?, device_type),
                operating_system = COALESCE(?, operating_system),
                os_version = COALESCE(?, os_version),
                ip_address = COALESCE(?, ip_address),
                mac_address = COALESCE(?, mac_address),
                location = COALESCE(?, location),
                department = COALESCE(?, department),
                owner = COALESCE(?, owner),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&patch.device_name)
        .bind(patch.device_type.map(|t| t.as_str()))
        .bind(&patch.operating_system)
        .bind(&patch.os_version)
        .bind(&patch.ip_address)
        .bind(&patch.mac_address)
        .bind(&patch.location)
        .bind(&patch.department)
        .bind(&patch.owner)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(now)
        .bind(&id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("patch_equipment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("equipment", id));
        }

        self.find_equipment(id)
            .await?
            .ok_or_else(|| StoreError::not_found("equipment", id))
    }

    async fn delete_equipment(&self, id: &EquipmentId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("delete_equipment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("equipment", id));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Self::query_error("health_check", e))?;
        Ok(())
    }
}
