//! Typed application configuration loaded from `.env` and the process environment.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;

const DEFAULT_PORT: u16 = 3333;
const DEFAULT_DATABASE_URL: &str = "sqlite:./orphanages.sqlite?mode=rwc";
/// Body limit for `POST /orphanages`, images included.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Per-IP request budget enforced by the governor layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_minute: u32,
    pub burst: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    /// `None` disables rate limiting.
    pub rate_limit: Option<RateLimit>,
    pub enable_docs: bool,
    pub max_upload_bytes: usize,
    pub log_level: Level,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or("ORPHANAGES_BIND_ADDR", &lookup, || {
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
        })?;
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let db_max_connections = parse_or("ORPHANAGES_DB_MAX_CONNECTIONS", &lookup, || 10)?;
        let run_migrations = parse_bool_or("ORPHANAGES_RUN_MIGRATIONS", &lookup, true)?;
        let per_minute: u32 = parse_or("ORPHANAGES_RATE_LIMIT_PER_MINUTE", &lookup, || 60)?;
        let burst: u32 = parse_or("ORPHANAGES_RATE_LIMIT_BURST", &lookup, || 10)?;
        let enable_docs = parse_bool_or("ORPHANAGES_ENABLE_DOCS", &lookup, true)?;
        let max_upload_bytes = parse_or("ORPHANAGES_MAX_UPLOAD_BYTES", &lookup, || {
            DEFAULT_MAX_UPLOAD_BYTES
        })?;
        let log_level = parse_or("ORPHANAGES_LOG_LEVEL", &lookup, || Level::INFO)?;

        if burst == 0 && per_minute > 0 {
            return Err(ConfigError::InvalidValue {
                key: "ORPHANAGES_RATE_LIMIT_BURST",
                value: burst.to_string(),
                reason: "must be greater than zero when rate limiting is enabled".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            run_migrations,
            rate_limit: (per_minute > 0).then_some(RateLimit { per_minute, burst }),
            enable_docs,
            max_upload_bytes,
            log_level,
        })
    }

    /// Configuration for in-process tests: no rate limiting, no Swagger UI.
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 0).into(),
            database_url: database_url.into(),
            db_max_connections: 1,
            run_migrations: true,
            rate_limit: None,
            enable_docs: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: Level::DEBUG,
        }
    }
}

fn parse_or<T, F, D>(key: &'static str, lookup: &F, default: D) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default()),
    }
}

fn parse_bool_or<F>(key: &'static str, lookup: &F, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key,
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        },
        None => Ok(default),
    }
}
