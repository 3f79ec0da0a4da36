//! Structured logging initialization
//!
//! The library only emits `tracing` events; it never installs a subscriber.
//! Binaries and test harnesses that want to see cache hits, rebuilds and
//! swallowed cache faults call [`init_logging_with_config`] once.
//!
//! Output goes to stderr so command output on stdout stays machine-readable.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: standard `EnvFilter` directives, wins over everything else
//! - `BRRTR_LOG_LEVEL`: trace/debug/info/warn/error
//! - `BRRTR_LOG_FORMAT`: json/pretty
//! - `BRRTR_LOG_TARGET_FILTER`: extra comma-separated directives
//! - `BRRTR_LOG_INCLUDE_LOCATION`: `true` to add file:line

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for CI logs, pretty-print for local runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Module filter (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl LogConfig {
    /// Parse configuration from environment variables, `default_level` when
    /// `BRRTR_LOG_LEVEL` is unset
    pub fn from_env(default_level: &str) -> Self {
        Self::from_lookup(default_level, |key| env::var(key).ok())
    }

    pub fn from_lookup(default_level: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_level: lookup("BRRTR_LOG_LEVEL").unwrap_or_else(|| default_level.to_string()),
            format: LogFormat::parse(&lookup("BRRTR_LOG_FORMAT").unwrap_or_default()),
            target_filter: lookup("BRRTR_LOG_TARGET_FILTER"),
            include_location: lookup("BRRTR_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Verbose, human-readable logging for debugging a contract suite
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',') {
                let filter = filter.trim();
                if filter.is_empty() {
                    continue;
                }
                match filter.parse() {
                    Ok(directive) => env_filter = env_filter.add_directive(directive),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {}", filter),
                }
            }
        }
        env_filter
    }
}

/// Initialize logging with structured tracing
///
/// # Example
///
/// ```no_run
/// use brrtrouter_contract::otel::{init_logging_with_config, LogConfig};
///
/// init_logging_with_config(&LogConfig::from_env("info"))
///     .expect("Failed to initialize logging");
/// ```
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(""), LogFormat::Json); // Default
    }

    #[test]
    fn test_log_config_from_lookup_defaults() {
        let config = LogConfig::from_lookup("warn", |_| None);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.target_filter, None);
        assert!(!config.include_location);
        assert_eq!(config.level(), Level::WARN);
    }

    #[test]
    fn test_log_config_from_lookup_overrides() {
        let config = LogConfig::from_lookup("warn", |key| match key {
            "BRRTR_LOG_LEVEL" => Some("DEBUG".to_string()),
            "BRRTR_LOG_FORMAT" => Some("pretty".to_string()),
            "BRRTR_LOG_INCLUDE_LOCATION" => Some("true".to_string()),
            _ => None,
        });
        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.include_location);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let mut config = LogConfig::default_dev();
        config.log_level = "chatty".to_string();
        assert_eq!(config.level(), Level::INFO);
    }
}
