//! Relational Store Module
//!
//! The queries the API issues, behind one trait so handlers never know
//! whether they run against PostgreSQL or the in-process tables.

mod memory;
mod postgres;

pub use memory::{
    CategoryRow, CompanyRow, CustomerRow, Dataset, DeliveryOrderRow, InvoiceRow, LineItemRow,
    MemoryRepository, ProductRow, VehicleRow,
};
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DbResult;
use crate::models::{
    Category, CurrentRental, DeliveryScheduleEntry, InventoryItem, LowAvailabilityItem,
    NewProduct, Product, ProductPatch, ProductRecord, ProductSummary, QuantityChange,
    QuantityRecord, UpcomingReturn,
};

/// Line items attached to invoices carry this document type.
pub const INVOICE_DOC_TYPE: &str = "invoice";

// == Repository Trait ==
/// Every statement the API issues against the relational store.
///
/// A line item overlaps a window `[start, end]` when
/// `start_date <= end && end_date >= start`; each overlapping line item
/// accounts for one rented unit.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Short name reported in logs.
    fn name(&self) -> &'static str;

    /// Round-trips a trivial query.
    async fn ping(&self) -> DbResult<()>;

    /// Products whose name contains `term` (case-insensitive), with
    /// availability over the window, ordered by name.
    async fn search_inventory(
        &self,
        term: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<InventoryItem>>;

    /// Products with availability `<= threshold` over the window, ordered by
    /// availability then name.
    async fn low_availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        threshold: i64,
    ) -> DbResult<Vec<LowAvailabilityItem>>;

    /// Invoice line items that have not ended yet, by start date then product.
    async fn current_rentals(&self) -> DbResult<Vec<CurrentRental>>;

    /// Deliveries whose invoice has line items starting on `date`.
    async fn delivery_schedule(&self, date: NaiveDate) -> DbResult<Vec<DeliveryScheduleEntry>>;

    /// Invoice line items ending within `days_ahead` days from today.
    async fn upcoming_returns(&self, days_ahead: i32) -> DbResult<Vec<UpcomingReturn>>;

    async fn list_products(&self) -> DbResult<Vec<Product>>;

    async fn get_product(&self, sku: &str) -> DbResult<Option<Product>>;

    /// Inserts a product under a freshly generated SKU.
    async fn create_product(&self, product: NewProduct) -> DbResult<ProductRecord>;

    /// Applies a partial update, None when the SKU does not exist.
    async fn update_product(&self, sku: &str, patch: ProductPatch)
        -> DbResult<Option<ProductRecord>>;

    async fn update_quantity(
        &self,
        sku: &str,
        change: QuantityChange,
    ) -> DbResult<Option<QuantityRecord>>;

    /// Number of line items (of any document type) referencing the SKU.
    async fn count_line_items(&self, sku: &str) -> DbResult<i64>;

    async fn delete_product(&self, sku: &str) -> DbResult<Option<ProductSummary>>;

    /// Categories with their parent's name, ordered by name.
    async fn list_categories(&self) -> DbResult<Vec<Category>>;

    /// Releases pooled connections. Called once on shutdown.
    fn close(&self) {}
}
