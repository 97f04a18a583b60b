//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `CRYPTIOMT__SECTION__KEY` environment variables.

use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::logging::LoggingConfig;
use crate::types::{AdminProvision, AdminRole};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CRYPTIOMT";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dev_mode: bool,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite URL; the in-memory store is used when unset
    pub url: Option<String>,
}

/// First-login provisioning policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Create an admin account for signed-in callers with no account and no customer link
    pub auto_provision: bool,
    pub default_role: AdminRole,
    pub default_permissions: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            auto_provision: true,
            default_role: AdminRole::Admin,
            default_permissions: vec![
                "read".to_string(),
                "write".to_string(),
                "manage_customers".to_string(),
            ],
        }
    }
}

impl AccessConfig {
    /// Account template for provisioning, or `None` when disabled
    pub fn provision(&self) -> Option<AdminProvision> {
        self.auto_provision.then(|| AdminProvision {
            role: self.default_role,
            permissions: self.default_permissions.clone(),
        })
    }
}

impl AppConfig {
    /// Load defaults, the optional file at `path`, then environment overrides
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .with_list_parse_key("access.default_permissions")
                .with_list_parse_key("logging.filter_directives")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::Config {
                message: format!("Failed to load configuration: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("load")
                    .with_suggestion("Check the TOML file and CRYPTIOMT__* variables"),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| CoreError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CoreError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| CoreError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.server.host.trim().is_empty() {
            return Err(CoreError::Config {
                message: "server.host must not be empty".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if let Some(url) = &self.database.url {
            if !url.starts_with("sqlite:") {
                return Err(CoreError::Config {
                    message: format!("Unsupported database url '{}'", url),
                    source: None,
                    context: ErrorContext::new("config")
                        .with_operation("validate")
                        .with_suggestion("Use a sqlite: URL or leave database.url unset"),
                });
            }
        }

        if self.access.auto_provision && self.access.default_role == AdminRole::SuperAdmin {
            return Err(CoreError::Config {
                message: "access.default_role may not be super_admin".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Provision admin or analyst and promote explicitly"),
            });
        }

        Ok(())
    }

    /// Listener address as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_first_login_admin() {
        let config = AppConfig::default();
        let provision = config.access.provision().expect("enabled by default");
        assert_eq!(provision.role, AdminRole::Admin);
        assert_eq!(
            provision.permissions,
            vec!["read", "write", "manage_customers"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_disabled_provisioning() {
        let access = AccessConfig {
            auto_provision: false,
            ..Default::default()
        };
        assert!(access.provision().is_none());
    }

    #[test]
    fn test_super_admin_default_rejected() {
        let mut config = AppConfig::default();
        config.access.default_role = AdminRole::SuperAdmin;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_sqlite_url_rejected() {
        let mut config = AppConfig::default();
        config.database.url = Some("postgres://localhost/db".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cryptiomt.toml");

        let mut config = AppConfig::default();
        config.server.port = 9191;
        config.access.default_role = AdminRole::Analyst;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9191);
        assert_eq!(loaded.access.default_role, AdminRole::Analyst);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 4000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert!(loaded.access.auto_provision);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();

        assert!(matches!(err, CoreError::Config { .. }));
        let context = err.context().unwrap();
        assert_eq!(context.component, "config");
        assert!(!context.recovery_suggestions.is_empty());
    }
}
