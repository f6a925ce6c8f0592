//! Configuration Module
//!
//! Handles loading server, database and cache configuration from environment
//! variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which relational store implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown database backend '{}'", other)),
        }
    }
}

/// Which cache store implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Maximum pooled connections
    pub pool_size: usize,
    /// JSON dataset loaded by the memory backend
    pub seed_file: Option<PathBuf>,
}

/// Cache store settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_password: Option<String>,
    /// Maximum number of entries the in-process store can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries stored without one
    pub default_ttl: u64,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Connection URL for the Redis client.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/",
                password, self.redis_host, self.redis_port
            ),
            None => format!("redis://{}:{}/", self.redis_host, self.redis_port),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `DB_BACKEND` - `postgres` or `memory` (default: postgres)
    /// - `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`
    /// - `DB_POOL_SIZE` - Maximum pooled connections (default: 16)
    /// - `SEED_FILE` - Dataset for the memory backend (default: unset)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`
    /// - `CACHE_MAX_ENTRIES` - In-process capacity (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - In-process default TTL (default: 300)
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("PORT", defaults.server_port),
            database: DatabaseConfig {
                backend: env_or("DB_BACKEND", defaults.database.backend),
                host: env_or("DB_HOST", defaults.database.host),
                port: env_or("DB_PORT", defaults.database.port),
                name: env_or("DB_NAME", defaults.database.name),
                user: env_or("DB_USER", defaults.database.user),
                password: env_or("DB_PASSWORD", defaults.database.password),
                pool_size: env_or("DB_POOL_SIZE", defaults.database.pool_size),
                seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
            },
            cache: CacheConfig {
                backend: env_or("CACHE_BACKEND", defaults.cache.backend),
                redis_host: env_or("REDIS_HOST", defaults.cache.redis_host),
                redis_port: env_or("REDIS_PORT", defaults.cache.redis_port),
                redis_password: env::var("REDIS_PASSWORD")
                    .ok()
                    .filter(|v| !v.is_empty()),
                max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache.max_entries),
                default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.cache.default_ttl),
                cleanup_interval: env_or(
                    "CACHE_CLEANUP_INTERVAL",
                    defaults.cache.cleanup_interval,
                ),
            },
        }
    }
}

/// Reads and parses `name`, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3001,
            database: DatabaseConfig {
                backend: DatabaseBackend::Postgres,
                host: "localhost".to_string(),
                port: 5432,
                name: "rental_inventory".to_string(),
                user: "postgres".to_string(),
                password: "password".to_string(),
                pool_size: 16,
                seed_file: None,
            },
            cache: CacheConfig {
                backend: CacheBackendKind::Redis,
                redis_host: "localhost".to_string(),
                redis_port: 6379,
                redis_password: None,
                max_entries: 1000,
                default_ttl: 300,
                cleanup_interval: 1,
            },
        }
    }
}
