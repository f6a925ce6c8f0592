//! Request, response and row models for the inventory API
//!
//! This module defines the DTOs used for serializing/deserializing HTTP
//! bodies and the rows the repository returns.

pub mod requests;
pub mod responses;
pub mod rows;

// Re-export commonly used types
pub use requests::{
    CreateProductRequest, InvalidateRequest, LowAvailabilityParams, QuantityRequest,
    ReturnsParams, ScheduleParams, SearchParams,
};
pub use responses::{
    CacheStatsResponse, DeleteResponse, HealthResponse, InvalidateResponse, UnhealthyResponse,
};
pub use rows::{
    Category, CurrentRental, DeliveryItem, DeliveryScheduleEntry, InventoryItem,
    LowAvailabilityItem, NewProduct, Product, ProductPatch, ProductRecord, ProductSummary,
    QuantityChange, QuantityRecord, UpcomingReturn,
};
