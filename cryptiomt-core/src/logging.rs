//! Unified logging system
//!
//! Structured logging on top of `tracing-subscriber` with configurable output

use crate::error::{CoreError, CoreResult, ErrorContext};
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Whether to log span close events with their duration
    pub log_span_timings: bool,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_span_timings: false,
            filter_directives: vec![
                "cryptiomt_core=info".to_string(),
                "cryptiomt_applications=info".to_string(),
                "cryptiomt_web=info".to_string(),
                "tower_http=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    fn span_events(&self) -> FmtSpan {
        if self.log_span_timings {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Build the env filter; `RUST_LOG` wins over the configured level
    pub fn env_filter(&self) -> CoreResult<EnvFilter> {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        for directive in &self.filter_directives {
            let parsed = directive.parse().map_err(|e| CoreError::Logging {
                message: format!("Invalid filter directive '{}': {}", directive, e),
                context: ErrorContext::new("logging")
                    .with_operation("parse_directive")
                    .with_suggestion("Use the `target=level` directive syntax"),
            })?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }
}

/// Initialize the global subscriber
pub fn init_logging(config: &LoggingConfig) -> CoreResult<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(config.span_events())
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_thread_ids(config.include_thread)
                    .with_thread_names(config.include_thread)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_span_events(config.span_events())
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_thread_ids(config.include_thread)
                    .with_thread_names(config.include_thread)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_span_events(config.span_events())
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_thread_ids(config.include_thread)
                    .with_thread_names(config.include_thread)
                    .with_writer(io::stdout),
            )
            .try_init(),
    };

    result.map_err(|e| CoreError::Logging {
        message: format!("Failed to install subscriber: {}", e),
        context: ErrorContext::new("logging").with_operation("init"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let config = LoggingConfig::default();
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_invalid_directive_is_reported() {
        let config = LoggingConfig {
            filter_directives: vec!["cryptiomt=notalevel".to_string()],
            ..Default::default()
        };
        let err = config.env_filter().unwrap_err();
        assert!(matches!(err, CoreError::Logging { .. }));
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
