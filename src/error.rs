//! Error types for the inventory service
//!
//! Provides unified error handling using thiserror. `ApiError` is the only
//! type that reaches HTTP clients; store and cache failures are converted
//! (or swallowed) before they get there.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == API Error Enum ==
/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid request data
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No matching row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write blocked by dependent rows
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store failure, carries the fixed client-facing message
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Logs the underlying failure and returns a 500 with a fixed message.
    ///
    /// Store error details never leave the process; the client only sees
    /// `message`.
    pub fn internal(message: &str, source: impl Display) -> Self {
        error!(error = %source, "{}", message);
        ApiError::Internal(message.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Database Error Enum ==
/// Failures talking to the relational store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to create pool: {0}")]
    PoolConfig(#[from] deadpool_postgres::CreatePoolError),

    #[error("Failed to acquire connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("Malformed row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to load dataset: {0}")]
    Dataset(#[from] std::io::Error),
}

// == Cache Error Enum ==
/// Failures inside the cache layer. Never shown to clients.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Key or value rejected by the store
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Value could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis command failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// No connection to the cache store
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

// == Result Type Aliases ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Result type for repository operations.
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type for cache backend operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
