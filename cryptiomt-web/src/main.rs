//! CryptIoMT Web Server
//!
//! Inventory service for managed medical and IoT equipment.

use anyhow::Context;
use clap::Parser;
use cryptiomt_core::{init_logging, AppConfig, LogFormat};
use cryptiomt_web::CryptiomtServerBuilder;
use std::path::PathBuf;
use tracing::info;

/// CryptIoMT inventory server
#[derive(Parser)]
#[command(name = "cryptiomt-web")]
#[command(about = "Customer and equipment inventory behind a role-based access gateway")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// SQLite database URL; the in-memory store is used when unset
    #[arg(long)]
    database_url: Option<String>,

    /// Disable first-login admin provisioning
    #[arg(long)]
    no_auto_provision: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, pretty, compact)
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        "compact" => Ok(LogFormat::Compact),
        other => Err(format!("unknown log format '{}'", other)),
    }
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.dev_mode = true;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if self.no_auto_provision {
            config.access.auto_provision = false;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);

    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("Starting CryptIoMT inventory server");
    match &config.database.url {
        Some(url) => info!("Database: {}", url),
        None => info!("Database: in-memory"),
    }

    let server = CryptiomtServerBuilder::from_config(config)
        .build()
        .await
        .context("Failed to build server")?;

    server.start().await.context("Server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["cryptiomt-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);

        let args = Args::parse_from([
            "cryptiomt-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--no-auto-provision",
            "--log-format",
            "json",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.dev_mode);
        assert!(!config.access.auto_provision);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
