//! API Routes
//!
//! Configures the Axum router with every inventory endpoint under `/api`.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats, create_product, current_rentals, delete_product, delivery_schedule, get_product,
    health, invalidate_cache, list_categories, list_products, low_availability, search_inventory,
    update_product, update_quantity, upcoming_returns, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: any origin, method and header (the dashboard is served elsewhere)
/// - Tracing: logs every request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/inventory/search", get(search_inventory))
        .route("/api/inventory/low-availability", get(low_availability))
        .route("/api/rentals/current", get(current_rentals))
        .route("/api/deliveries/schedule", get(delivery_schedule))
        .route("/api/returns/upcoming", get(upcoming_returns))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:sku",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/:sku/quantity", patch(update_quantity))
        .route("/api/categories", get(list_categories))
        .route("/api/cache/invalidate", post(invalidate_cache))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
