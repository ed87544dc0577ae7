//! Configuration module.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! The values are read once at startup and handed to the components that need
//! them; nothing reads the environment afterwards.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api/employees";

/// A configuration variable held a value that could not be parsed.
#[derive(Debug, Error)]
#[error("invalid {var} value '{value}': {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the employee collection used by the console client
    pub api_url: String,
    /// Path to SQLite database file used by the service
    pub db_path: PathBuf,
    /// Address the service binds to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Per-request timeout for the client
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_url = env::var("EMPLOYEE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let db_path = env::var("EMPLOYEE_DB_PATH")
            .unwrap_or_else(|_| "./data/employees.sqlite".to_string())
            .into();

        let bind_addr = parse_var("EMPLOYEE_BIND_ADDR", "127.0.0.1:8080", |raw| {
            raw.parse::<SocketAddr>().map_err(|e| e.to_string())
        })?;

        let log_level = env::var("EMPLOYEE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = parse_var("EMPLOYEE_LOG_FORMAT", "text", |raw| {
            match raw.to_ascii_lowercase().as_str() {
                "text" | "pretty" => Ok(false),
                "json" => Ok(true),
                _ => Err("expected 'text' or 'json'".to_string()),
            }
        })?;

        let http_timeout = parse_var("EMPLOYEE_HTTP_TIMEOUT_SECS", "30", |raw| {
            match raw.parse::<u64>() {
                Ok(0) => Err("must be at least 1".to_string()),
                Ok(secs) => Ok(Duration::from_secs(secs)),
                Err(e) => Err(e.to_string()),
            }
        })?;

        Ok(Self {
            api_url,
            db_path,
            bind_addr,
            log_level,
            log_json,
            http_timeout,
        })
    }
}

fn parse_var<T>(
    var: &'static str,
    default: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    parse(value.trim()).map_err(|reason| ConfigError {
        var,
        value,
        reason,
    })
}
