//! Centralized configuration (environment variables + defaults).
//!
//! Call `dotenv::dotenv().ok()` before reading any of these.

use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_API_PATH: &str = "/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        None => Ok(default),
    }
}

/// Address the API server binds to (`LIBRARY_API_BIND`).
pub fn bind_addr() -> anyhow::Result<SocketAddr> {
    let raw = optional_var("LIBRARY_API_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    raw.parse()
        .with_context(|| format!("LIBRARY_API_BIND has an invalid value '{}'", raw))
}

/// Database URL, if a Postgres store should be used.
pub fn database_url() -> Option<String> {
    optional_var("DATABASE_URL")
}

/// Pool size for the Postgres store (`DATABASE_MAX_CONNECTIONS`, at least 1).
pub fn database_max_connections() -> anyhow::Result<u32> {
    Ok(parsed_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?.max(1))
}

/// JSON fixture seeding the in-memory store (`LIBRARY_FIXTURE_PATH`).
pub fn fixture_path() -> Option<PathBuf> {
    optional_var("LIBRARY_FIXTURE_PATH").map(PathBuf::from)
}

/// Which backing store the server reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Fixture {
        path: PathBuf,
    },
    Empty,
}

impl StoreConfig {
    /// `DATABASE_URL` wins over `LIBRARY_FIXTURE_PATH`; with neither the store is empty.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Some(database_url) = database_url() {
            return Ok(StoreConfig::Postgres {
                database_url,
                max_connections: database_max_connections()?,
            });
        }
        Ok(match fixture_path() {
            Some(path) => StoreConfig::Fixture { path },
            None => StoreConfig::Empty,
        })
    }

    /// Label safe to print (no credentials).
    pub fn describe(&self) -> String {
        match self {
            StoreConfig::Postgres {
                max_connections, ..
            } => format!("postgres (max_connections={})", max_connections),
            StoreConfig::Fixture { path } => format!("memory fixture {}", path.display()),
            StoreConfig::Empty => "empty memory store".to_string(),
        }
    }
}

/// Settings for [`crate::transport::client::LibraryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port, without a trailing slash.
    pub base_url: String,
    /// Path of the single dispatch endpoint.
    pub endpoint_path: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint_path: DEFAULT_API_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `LIBRARY_API_URL` and `LIBRARY_API_TIMEOUT_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = optional_var("LIBRARY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = parsed_var("LIBRARY_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint_path)
    }
}
