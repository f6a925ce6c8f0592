//! Rental Inventory - REST backend for an equipment rental business
//!
//! Availability, rental, delivery and product queries over PostgreSQL, with
//! cache-aside reads through Redis (or an in-process store) and
//! glob-pattern invalidation on writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
