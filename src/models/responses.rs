//! Response DTOs for the inventory API
//!
//! Bodies that are not plain query rows.

use serde::Serialize;

use crate::models::ProductSummary;

/// Response body for `DELETE /api/products/:sku`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub product: ProductSummary,
}

impl DeleteResponse {
    pub fn new(product: ProductSummary) -> Self {
        Self {
            message: "Product deleted successfully".to_string(),
            product,
        }
    }
}

/// Response body for `POST /api/cache/invalidate`
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub message: String,
    pub pattern: String,
}

impl InvalidateResponse {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            message: "Cache invalidated successfully".to_string(),
            pattern: pattern.into(),
        }
    }
}

/// Response body for `GET /api/cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub connected: bool,
    pub keys_count: usize,
    /// Backend statistics in `INFO stats` text form
    pub info: String,
}

/// Response body for `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    /// "connected" or "disconnected"
    pub cache: String,
    pub cache_backend: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(cache_connected: bool, cache_backend: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            cache: if cache_connected {
                "connected"
            } else {
                "disconnected"
            }
            .to_string(),
            cache_backend: cache_backend.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for a failed health check (503)
#[derive(Debug, Clone, Serialize)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

impl UnhealthyResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new(ProductSummary {
            sku: "abc".to_string(),
            name: "Tent A".to_string(),
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "Product deleted successfully");
        assert_eq!(json["product"]["sku"], "abc");
    }

    #[test]
    fn test_health_response_reports_cache_state() {
        let up = HealthResponse::healthy(true, "redis");
        assert_eq!(up.cache, "connected");
        assert_eq!(up.cache_backend, "redis");

        let down = HealthResponse::healthy(false, "redis");
        assert_eq!(down.cache, "disconnected");
        assert_eq!(down.status, "healthy");
        assert!(!down.timestamp.is_empty());
    }

    #[test]
    fn test_unhealthy_response_serialize() {
        let json = serde_json::to_string(&UnhealthyResponse::new("db down")).unwrap();
        assert!(json.contains("unhealthy"));
        assert!(json.contains("db down"));
    }
}
