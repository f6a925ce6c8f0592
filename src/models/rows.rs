//! Result rows returned by the inventory queries
//!
//! These mirror the columns each query selects. They round-trip through the
//! cache as JSON, so every row type is both `Serialize` and `Deserialize`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A product with its availability over a date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub sku: String,
    pub name: String,
    pub total_quantity: i32,
    pub category_name: Option<String>,
    /// Line items overlapping the window
    pub currently_rented: i64,
    pub available_quantity: i64,
}

/// A product at or below the availability threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowAvailabilityItem {
    pub sku: String,
    pub name: String,
    pub total_quantity: i32,
    pub rented_quantity: i64,
    pub available_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRental {
    pub product_name: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub company_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: Option<String>,
    /// True when today falls inside the rental period
    pub is_active: bool,
}

/// One product on a delivery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryItem {
    pub sku: String,
    pub product_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryScheduleEntry {
    pub delivery_id: i64,
    pub delivery_status: Option<String>,
    pub delivery_address: Option<String>,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub license_plate: Option<String>,
    pub invoice_id: i64,
    pub items: Vec<DeliveryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingReturn {
    pub product_name: String,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub return_date: NaiveDate,
    pub days_until_return: i32,
}

/// Catalog view of a product, with its category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}

/// A product row as returned by inserts and updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityRecord {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub sku: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub parent_name: Option<String>,
}

// == Write Inputs ==
/// Validated fields for a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i32,
    pub description: Option<String>,
    pub category_id: i64,
}

/// Partial product update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::requests::number_or_string")]
    pub quantity: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::models::requests::number_or_string")]
    pub category_id: Option<i64>,
}

/// How a quantity PATCH changes stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Replace the quantity
    Set(i32),
    /// Add to the quantity (negative to remove)
    Adjust(i32),
}

impl QuantityChange {
    /// Applies the change to a current quantity. No floor is enforced.
    pub fn apply(self, current: i32) -> i32 {
        match self {
            QuantityChange::Set(quantity) => quantity,
            QuantityChange::Adjust(delta) => current.saturating_add(delta),
        }
    }
}
