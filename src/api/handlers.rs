//! API Handlers
//!
//! HTTP request handlers for the inventory endpoints. Reads go through the
//! cache-aside layer; product writes invalidate every inventory prefix
//! after the statement succeeds.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use tracing::error;

use crate::cache::{keys, CacheBackend, CacheLayer, CachePolicy};
use crate::db::InventoryRepository;
use crate::error::{ApiError, Result};
use crate::models::{
    CacheStatsResponse, Category, CreateProductRequest, CurrentRental, DeleteResponse,
    DeliveryScheduleEntry, HealthResponse, InvalidateRequest, InvalidateResponse, InventoryItem,
    LowAvailabilityItem, LowAvailabilityParams, Product, ProductPatch, ProductRecord,
    QuantityRecord, QuantityRequest, ReturnsParams, ScheduleParams, SearchParams,
    UnhealthyResponse, UpcomingReturn,
};

const PRODUCT_NOT_FOUND: &str = "Product not found";
const PRODUCT_IN_USE: &str = "Cannot delete product with existing rentals/quotations";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn InventoryRepository>,
    pub cache: CacheLayer,
}

impl AppState {
    pub fn new(repo: Arc<dyn InventoryRepository>, cache: Arc<dyn CacheBackend>) -> Self {
        Self {
            repo,
            cache: CacheLayer::new(cache),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// == Inventory ==

/// Handler for GET /api/inventory/search
pub async fn search_inventory(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<InventoryItem>>> {
    let (start, end) = params.window(today());
    let key = keys::inventory_search(&params.search_term, start, end);
    let repo = &state.repo;
    let term = params.search_term.as_str();

    let items = state
        .cache
        .get_or_compute(&key, CachePolicy::InventorySearch.ttl(), move || async move {
            repo.search_inventory(term, start, end).await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to search inventory", e))?;

    Ok(Json(items))
}

/// Handler for GET /api/inventory/low-availability
pub async fn low_availability(
    State(state): State<AppState>,
    Query(params): Query<LowAvailabilityParams>,
) -> Result<Json<Vec<LowAvailabilityItem>>> {
    let (start, end) = params.window(today());
    let threshold = params.threshold();
    let key = keys::low_stock(start, end, threshold);
    let repo = &state.repo;

    let items = state
        .cache
        .get_or_compute(&key, CachePolicy::LowStock.ttl(), move || async move {
            repo.low_availability(start, end, threshold).await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to check low availability", e))?;

    Ok(Json(items))
}

// == Rentals, Deliveries, Returns ==

/// Handler for GET /api/rentals/current
pub async fn current_rentals(State(state): State<AppState>) -> Result<Json<Vec<CurrentRental>>> {
    let key = keys::current_rentals(today());
    let repo = &state.repo;

    let rentals = state
        .cache
        .get_or_compute(&key, CachePolicy::CurrentRentals.ttl(), move || async move {
            repo.current_rentals().await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to load current rentals", e))?;

    Ok(Json(rentals))
}

/// Handler for GET /api/deliveries/schedule
pub async fn delivery_schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> Result<Json<Vec<DeliveryScheduleEntry>>> {
    let date = params.date.unwrap_or_else(today);
    let key = keys::delivery_schedule(date);
    let repo = &state.repo;

    let schedule = state
        .cache
        .get_or_compute(&key, CachePolicy::DeliverySchedule.ttl(), move || async move {
            repo.delivery_schedule(date).await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to load delivery schedule", e))?;

    Ok(Json(schedule))
}

/// Handler for GET /api/returns/upcoming
pub async fn upcoming_returns(
    State(state): State<AppState>,
    Query(params): Query<ReturnsParams>,
) -> Result<Json<Vec<UpcomingReturn>>> {
    let days_ahead = params.days_ahead();
    let key = keys::upcoming_returns(days_ahead);
    let repo = &state.repo;

    let returns = state
        .cache
        .get_or_compute(&key, CachePolicy::UpcomingReturns.ttl(), move || async move {
            repo.upcoming_returns(days_ahead).await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to load upcoming returns", e))?;

    Ok(Json(returns))
}

// == Products ==

/// Handler for GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let repo = &state.repo;

    let products = state
        .cache
        .get_or_compute(keys::PRODUCT_LIST, CachePolicy::Catalog.ttl(), move || async move {
            repo.list_products().await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to load products", e))?;

    Ok(Json(products))
}

/// Handler for GET /api/products/:sku
pub async fn get_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<Product>> {
    state
        .repo
        .get_product(&sku)
        .await
        .map_err(|e| ApiError::internal("Failed to load product", e))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))
}

/// Handler for POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductRecord>)> {
    let product = req.into_new_product().ok_or_else(|| {
        ApiError::Validation(CreateProductRequest::MISSING_FIELDS.to_string())
    })?;

    let created = state
        .repo
        .create_product(product)
        .await
        .map_err(|e| ApiError::internal("Failed to create product", e))?;

    state.cache.invalidate_product_writes().await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PUT /api/products/:sku
pub async fn update_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<ProductRecord>> {
    let updated = state
        .repo
        .update_product(&sku, patch)
        .await
        .map_err(|e| ApiError::internal("Failed to update product", e))?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    state.cache.invalidate_product_writes().await;
    Ok(Json(updated))
}

/// Handler for PATCH /api/products/:sku/quantity
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<QuantityRecord>> {
    let change = req
        .change()
        .ok_or_else(|| ApiError::Validation(QuantityRequest::MISSING_FIELDS.to_string()))?;

    let updated = state
        .repo
        .update_quantity(&sku, change)
        .await
        .map_err(|e| ApiError::internal("Failed to update quantity", e))?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    state.cache.invalidate_product_writes().await;
    Ok(Json(updated))
}

/// Handler for DELETE /api/products/:sku
///
/// Products referenced by any line item (invoice or quotation) are kept.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let references = state
        .repo
        .count_line_items(&sku)
        .await
        .map_err(|e| ApiError::internal("Failed to delete product", e))?;
    if references > 0 {
        return Err(ApiError::Conflict(PRODUCT_IN_USE.to_string()));
    }

    let deleted = state
        .repo
        .delete_product(&sku)
        .await
        .map_err(|e| ApiError::internal("Failed to delete product", e))?
        .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

    state.cache.invalidate_product_writes().await;
    Ok(Json(DeleteResponse::new(deleted)))
}

/// Handler for GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let repo = &state.repo;

    let categories = state
        .cache
        .get_or_compute(keys::CATEGORY_LIST, CachePolicy::Catalog.ttl(), move || async move {
            repo.list_categories().await
        })
        .await
        .map_err(|e| ApiError::internal("Failed to load categories", e))?;

    Ok(Json(categories))
}

// == Cache Management ==

/// Handler for POST /api/cache/invalidate
///
/// The body is optional; an empty one drops every key. A body that is
/// present but not a valid request is rejected and nothing is deleted.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InvalidateResponse>> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        InvalidateRequest::default()
    } else {
        let Json(req) = Json::<InvalidateRequest>::from_bytes(&body)
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        req
    };

    state.cache.invalidate(&req.pattern).await;
    Ok(Json(InvalidateResponse::new(req.pattern)))
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<CacheStatsResponse>> {
    let backend = state.cache.backend();
    if !backend.is_connected().await {
        return Ok(Json(CacheStatsResponse {
            connected: false,
            keys_count: 0,
            info: String::new(),
        }));
    }

    let keys_count = backend
        .db_size()
        .await
        .map_err(|e| ApiError::internal("Failed to get cache statistics", e))?;
    let info = backend
        .info()
        .await
        .map_err(|e| ApiError::internal("Failed to get cache statistics", e))?;

    Ok(Json(CacheStatsResponse {
        connected: true,
        keys_count,
        info,
    }))
}

/// Handler for GET /api/health
///
/// 503 when the database does not answer. A missing cache only shows up as
/// `"cache": "disconnected"`.
pub async fn health(State(state): State<AppState>) -> Response {
    if let Err(e) = state.repo.ping().await {
        error!(error = %e, "Health check failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnhealthyResponse::new(e.to_string())),
        )
            .into_response();
    }

    let backend = state.cache.backend();
    let connected = backend.is_connected().await;
    Json(HealthResponse::healthy(connected, backend.name())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryBackend;
    use crate::db::MemoryRepository;
    use crate::models::QuantityChange;

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryBackend::new(100, 300)),
        )
    }

    fn new_product(name: &str, quantity: i32) -> CreateProductRequest {
        CreateProductRequest {
            name: Some(name.to_string()),
            quantity: Some(quantity),
            description: None,
            category_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let state = test_state();

        let (status, Json(created)) =
            create_product(State(state.clone()), Json(new_product("Tent A", 5)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(fetched) = get_product(State(state), Path(created.sku)).await.unwrap();
        assert_eq!(fetched.quantity, 5);
    }

    #[tokio::test]
    async fn test_create_product_missing_fields() {
        let state = test_state();
        let req = CreateProductRequest {
            name: Some("Tent A".to_string()),
            ..Default::default()
        };

        let result = create_product(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let result = get_product(State(test_state()), Path("nope".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_write_drops_cached_product_list() {
        let state = test_state();

        let Json(before) = list_products(State(state.clone())).await.unwrap();
        assert!(before.is_empty());

        create_product(State(state.clone()), Json(new_product("Tent A", 5)))
            .await
            .unwrap();

        let Json(after) = list_products(State(state)).await.unwrap();
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn test_quantity_requires_a_field() {
        let state = test_state();
        let result = update_quantity(
            State(state),
            Path("any".to_string()),
            Json(QuantityRequest::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_quantity_adjustment_below_zero() {
        let state = test_state();
        let (_, Json(created)) =
            create_product(State(state.clone()), Json(new_product("Tent A", 1)))
                .await
                .unwrap();
        state
            .repo
            .update_quantity(&created.sku, QuantityChange::Set(0))
            .await
            .unwrap();

        let req = QuantityRequest {
            quantity: None,
            adjustment: Some(-1),
        };
        let Json(record) = update_quantity(State(state), Path(created.sku), Json(req))
            .await
            .unwrap();
        assert_eq!(record.quantity, -1);
    }

    #[tokio::test]
    async fn test_invalidate_without_body_matches_everything() {
        let Json(resp) = invalidate_cache(State(test_state()), Bytes::new())
            .await
            .unwrap();
        assert_eq!(resp.pattern, "*");
    }

    #[tokio::test]
    async fn test_invalidate_rejects_bad_body_and_keeps_keys() {
        let state = test_state();
        list_categories(State(state.clone())).await.unwrap();

        for body in [r#"{"pattern": "inventory:*""#, r#"{"pattern": null}"#, r#"{"pattern": 5}"#] {
            let result = invalidate_cache(State(state.clone()), Bytes::from(body)).await;
            assert!(matches!(result, Err(ApiError::Validation(_))), "{}", body);
        }

        let Json(stats) = cache_stats(State(state)).await.unwrap();
        assert_eq!(stats.keys_count, 1);
    }

    #[tokio::test]
    async fn test_cache_stats_counts_keys() {
        let state = test_state();
        list_categories(State(state.clone())).await.unwrap();

        let Json(stats) = cache_stats(State(state)).await.unwrap();
        assert!(stats.connected);
        assert_eq!(stats.keys_count, 1);
        assert!(stats.info.contains("keyspace_misses:1"));
    }
}
