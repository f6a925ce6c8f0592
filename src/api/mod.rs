//! API Module
//!
//! HTTP handlers and routing for the inventory REST API.
//!
//! # Endpoints
//! - `GET /api/inventory/search` - Availability search over a date window
//! - `GET /api/inventory/low-availability` - Products at or below a threshold
//! - `GET /api/rentals/current` - Active and upcoming rentals
//! - `GET /api/deliveries/schedule` - Deliveries for a date
//! - `GET /api/returns/upcoming` - Returns due soon
//! - `GET|POST /api/products`, `GET|PUT|DELETE /api/products/:sku`
//! - `PATCH /api/products/:sku/quantity` - Set or adjust stock
//! - `GET /api/categories`
//! - `POST /api/cache/invalidate`, `GET /api/cache/stats`
//! - `GET /api/health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
