//! In-Memory Repository
//!
//! The same queries as the PostgreSQL repository, evaluated over tables held
//! in process. Used to run the service without a database (optionally
//! seeded from a JSON dataset) and to drive the HTTP tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::pattern::glob_match;
use crate::db::{InventoryRepository, INVOICE_DOC_TYPE};
use crate::error::DbResult;
use crate::models::{
    Category, CurrentRental, DeliveryItem, DeliveryScheduleEntry, InventoryItem,
    LowAvailabilityItem, NewProduct, Product, ProductPatch, ProductRecord, ProductSummary,
    QuantityChange, QuantityRecord, UpcomingReturn,
};

// == Table Rows ==

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub company_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceRow {
    pub id: i64,
    pub customer_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineItemRow {
    pub sku: String,
    pub doc_id: i64,
    /// "invoice" or "quotation"
    pub doc_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub duration: Option<String>,
}

impl LineItemRow {
    fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    fn is_invoiced(&self) -> bool {
        self.doc_type == INVOICE_DOC_TYPE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryOrderRow {
    pub id: i64,
    pub invoice_id: i64,
    pub vehicle_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRow {
    pub id: i64,
    #[serde(default)]
    pub license_plate: Option<String>,
}

/// Every table the queries read, as loaded from a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub categories: Vec<CategoryRow>,
    pub products: Vec<ProductRow>,
    pub companies: Vec<CompanyRow>,
    pub customers: Vec<CustomerRow>,
    pub invoices: Vec<InvoiceRow>,
    pub line_items: Vec<LineItemRow>,
    pub delivery_orders: Vec<DeliveryOrderRow>,
    pub vehicles: Vec<VehicleRow>,
}

impl Dataset {
    fn category(&self, id: Option<i64>) -> Option<&CategoryRow> {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id))
    }

    fn product(&self, sku: &str) -> Option<&ProductRow> {
        self.products.iter().find(|p| p.sku == sku)
    }

    /// Customer billed on an invoice.
    fn invoice_customer(&self, invoice_id: i64) -> Option<&CustomerRow> {
        let invoice = self.invoices.iter().find(|i| i.id == invoice_id)?;
        self.customers.iter().find(|c| c.id == invoice.customer_id)
    }

    /// Invoice line items joined to their product and customer. Rows whose
    /// joins fail are dropped, as an inner join would.
    fn invoiced_items(&self) -> impl Iterator<Item = (&LineItemRow, &ProductRow, &CustomerRow)> {
        self.line_items
            .iter()
            .filter(|li| li.is_invoiced())
            .filter_map(move |li| {
                let product = self.product(&li.sku)?;
                let customer = self.invoice_customer(li.doc_id)?;
                Some((li, product, customer))
            })
    }

    /// Overlapping line items per SKU over a window.
    fn rented_counts(&self, start: NaiveDate, end: NaiveDate) -> HashMap<&str, i64> {
        let mut counts = HashMap::new();
        for li in self.line_items.iter().filter(|li| li.overlaps(start, end)) {
            *counts.entry(li.sku.as_str()).or_insert(0) += 1;
        }
        counts
    }

    fn product_view(&self, row: &ProductRow) -> Product {
        Product {
            sku: row.sku.clone(),
            name: row.name.clone(),
            quantity: row.quantity,
            description: row.description.clone(),
            category_id: row.category_id,
            category_name: self.category(row.category_id).map(|c| c.name.clone()),
        }
    }
}

/// Glob equivalent of `ILIKE '%term%'` over a lowercased name: `%` and `_`
/// stay wildcards, `\` escapes the next character, glob syntax is literal.
fn ilike_contains_pattern(term: &str) -> String {
    let mut pattern = String::from("*");
    let lowered = term.to_lowercase();
    let mut chars = lowered.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => pattern.push('*'),
            '_' => pattern.push('?'),
            '\\' => {
                if let Some(next) = chars.next() {
                    pattern.push('\\');
                    pattern.push(next);
                }
            }
            '*' | '?' | '[' | ']' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }
    pattern.push('*');
    pattern
}

fn record(row: &ProductRow) -> ProductRecord {
    ProductRecord {
        sku: row.sku.clone(),
        name: row.name.clone(),
        quantity: row.quantity,
        description: row.description.clone(),
        category_id: row.category_id,
    }
}

// == Repository ==

/// Repository over in-process tables.
pub struct MemoryRepository {
    data: RwLock<Dataset>,
    /// Fixed "current date" for deterministic runs; None follows the clock.
    today: Option<NaiveDate>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::from_dataset(Dataset::default())
    }

    pub fn from_dataset(data: Dataset) -> Self {
        Self {
            data: RwLock::new(data),
            today: None,
        }
    }

    /// Loads a JSON dataset from disk.
    pub fn from_file(path: &Path) -> DbResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let data: Dataset = serde_json::from_str(&raw)?;
        Ok(Self::from_dataset(data))
    }

    /// Pins the date the rental and return queries treat as today.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryRepository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }

    async fn search_inventory(
        &self,
        term: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<InventoryItem>> {
        let data = self.data.read().await;
        let rented = data.rented_counts(start, end);
        let pattern = ilike_contains_pattern(term);

        let mut items: Vec<InventoryItem> = data
            .products
            .iter()
            .filter(|p| glob_match(&pattern, &p.name.to_lowercase()))
            .map(|p| {
                let currently_rented = rented.get(p.sku.as_str()).copied().unwrap_or(0);
                InventoryItem {
                    sku: p.sku.clone(),
                    name: p.name.clone(),
                    total_quantity: p.quantity,
                    category_name: data.category(p.category_id).map(|c| c.name.clone()),
                    currently_rented,
                    available_quantity: i64::from(p.quantity) - currently_rented,
                }
            })
            .collect();

        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn low_availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        threshold: i64,
    ) -> DbResult<Vec<LowAvailabilityItem>> {
        let data = self.data.read().await;
        let rented = data.rented_counts(start, end);

        let mut items: Vec<LowAvailabilityItem> = data
            .products
            .iter()
            .map(|p| {
                let rented_quantity = rented.get(p.sku.as_str()).copied().unwrap_or(0);
                LowAvailabilityItem {
                    sku: p.sku.clone(),
                    name: p.name.clone(),
                    total_quantity: p.quantity,
                    rented_quantity,
                    available_quantity: i64::from(p.quantity) - rented_quantity,
                }
            })
            .filter(|item| item.available_quantity <= threshold)
            .collect();

        items.sort_by(|a, b| {
            a.available_quantity
                .cmp(&b.available_quantity)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    async fn current_rentals(&self) -> DbResult<Vec<CurrentRental>> {
        let today = self.today();
        let data = self.data.read().await;

        let mut rentals: Vec<CurrentRental> = data
            .invoiced_items()
            .filter(|(li, _, _)| li.end_date >= today)
            .map(|(li, product, customer)| CurrentRental {
                product_name: product.name.clone(),
                customer_name: customer.name.clone(),
                customer_contact: customer.contact.clone(),
                company_name: customer
                    .company_id
                    .and_then(|id| data.companies.iter().find(|c| c.id == id))
                    .map(|c| c.name.clone()),
                start_date: li.start_date,
                end_date: li.end_date,
                duration: li.duration.clone(),
                is_active: li.start_date <= today && li.end_date >= today,
            })
            .collect();

        rentals.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        Ok(rentals)
    }

    async fn delivery_schedule(&self, date: NaiveDate) -> DbResult<Vec<DeliveryScheduleEntry>> {
        let data = self.data.read().await;

        let mut entries = Vec::new();
        for delivery in &data.delivery_orders {
            let Some(customer) = data.invoice_customer(delivery.invoice_id) else {
                continue;
            };
            let Some(vehicle) = data.vehicles.iter().find(|v| v.id == delivery.vehicle_id) else {
                continue;
            };

            let mut items: Vec<DeliveryItem> = data
                .line_items
                .iter()
                .filter(|li| {
                    li.is_invoiced() && li.doc_id == delivery.invoice_id && li.start_date == date
                })
                .filter_map(|li| {
                    data.product(&li.sku).map(|p| DeliveryItem {
                        sku: p.sku.clone(),
                        product_name: p.name.clone(),
                        start_date: li.start_date,
                        end_date: li.end_date,
                    })
                })
                .collect();

            if items.is_empty() {
                continue;
            }
            items.sort_by(|a, b| a.product_name.cmp(&b.product_name));

            entries.push(DeliveryScheduleEntry {
                delivery_id: delivery.id,
                delivery_status: delivery.status.clone(),
                delivery_address: delivery.delivery_address.clone(),
                customer_name: customer.name.clone(),
                customer_contact: customer.contact.clone(),
                license_plate: vehicle.license_plate.clone(),
                invoice_id: delivery.invoice_id,
                items,
            });
        }

        // NULL statuses sort last, as in PostgreSQL's default ascending order
        entries.sort_by(|a, b| {
            let status = match (&a.delivery_status, &b.delivery_status) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            status.then_with(|| a.customer_name.cmp(&b.customer_name))
        });
        Ok(entries)
    }

    async fn upcoming_returns(&self, days_ahead: i32) -> DbResult<Vec<UpcomingReturn>> {
        let today = self.today();
        let horizon = today
            .checked_add_signed(Duration::days(i64::from(days_ahead)))
            .unwrap_or(if days_ahead < 0 { NaiveDate::MIN } else { NaiveDate::MAX });
        let data = self.data.read().await;

        let mut returns: Vec<UpcomingReturn> = data
            .invoiced_items()
            .filter(|(li, _, _)| li.end_date >= today && li.end_date <= horizon)
            .map(|(li, product, customer)| UpcomingReturn {
                product_name: product.name.clone(),
                customer_name: customer.name.clone(),
                customer_contact: customer.contact.clone(),
                return_date: li.end_date,
                days_until_return: (li.end_date - today).num_days() as i32,
            })
            .collect();

        returns.sort_by(|a, b| {
            a.return_date
                .cmp(&b.return_date)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        Ok(returns)
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let data = self.data.read().await;
        let mut products: Vec<Product> =
            data.products.iter().map(|p| data.product_view(p)).collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, sku: &str) -> DbResult<Option<Product>> {
        let data = self.data.read().await;
        Ok(data.product(sku).map(|p| data.product_view(p)))
    }

    async fn create_product(&self, new: NewProduct) -> DbResult<ProductRecord> {
        let row = ProductRow {
            sku: Uuid::new_v4().to_string(),
            name: new.name,
            quantity: new.quantity,
            description: new.description,
            category_id: Some(new.category_id),
        };
        let created = record(&row);

        self.data.write().await.products.push(row);
        Ok(created)
    }

    async fn update_product(
        &self,
        sku: &str,
        patch: ProductPatch,
    ) -> DbResult<Option<ProductRecord>> {
        let mut data = self.data.write().await;
        let Some(row) = data.products.iter_mut().find(|p| p.sku == sku) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(quantity) = patch.quantity {
            row.quantity = quantity;
        }
        if let Some(description) = patch.description {
            row.description = Some(description);
        }
        if let Some(category_id) = patch.category_id {
            row.category_id = Some(category_id);
        }

        Ok(Some(record(row)))
    }

    async fn update_quantity(
        &self,
        sku: &str,
        change: QuantityChange,
    ) -> DbResult<Option<QuantityRecord>> {
        let mut data = self.data.write().await;
        Ok(data
            .products
            .iter_mut()
            .find(|p| p.sku == sku)
            .map(|row| {
                row.quantity = change.apply(row.quantity);
                QuantityRecord {
                    sku: row.sku.clone(),
                    name: row.name.clone(),
                    quantity: row.quantity,
                }
            }))
    }

    async fn count_line_items(&self, sku: &str) -> DbResult<i64> {
        let data = self.data.read().await;
        Ok(data.line_items.iter().filter(|li| li.sku == sku).count() as i64)
    }

    async fn delete_product(&self, sku: &str) -> DbResult<Option<ProductSummary>> {
        let mut data = self.data.write().await;
        let Some(index) = data.products.iter().position(|p| p.sku == sku) else {
            return Ok(None);
        };

        let row = data.products.remove(index);
        Ok(Some(ProductSummary {
            sku: row.sku,
            name: row.name,
        }))
    }

    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let data = self.data.read().await;
        let mut categories: Vec<Category> = data
            .categories
            .iter()
            .map(|c| Category {
                id: c.id,
                name: c.name.clone(),
                parent_id: c.parent_id,
                parent_name: data.category(c.parent_id).map(|p| p.name.clone()),
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn product(sku: &str, name: &str, quantity: i32) -> ProductRow {
        ProductRow {
            sku: sku.to_string(),
            name: name.to_string(),
            quantity,
            description: None,
            category_id: Some(1),
        }
    }

    fn line_item(sku: &str, doc_id: i64, doc_type: &str, start: &str, end: &str) -> LineItemRow {
        LineItemRow {
            sku: sku.to_string(),
            doc_id,
            doc_type: doc_type.to_string(),
            start_date: date(start),
            end_date: date(end),
            duration: None,
        }
    }

    fn fixture() -> Dataset {
        Dataset {
            categories: vec![
                CategoryRow { id: 1, name: "Camping".to_string(), parent_id: None },
                CategoryRow { id: 2, name: "Tents".to_string(), parent_id: Some(1) },
            ],
            products: vec![
                product("tent-a", "Tent A", 3),
                product("tent-b", "Tent B", 1),
                product("stove", "Camp Stove", 5),
            ],
            companies: vec![CompanyRow { id: 1, name: "Acme".to_string() }],
            customers: vec![CustomerRow {
                id: 1,
                name: "Ada".to_string(),
                contact: Some("ada@example.com".to_string()),
                company_id: Some(1),
            }],
            invoices: vec![InvoiceRow { id: 10, customer_id: 1 }],
            line_items: vec![
                line_item("tent-a", 10, "invoice", "2024-06-01", "2024-06-05"),
                line_item("tent-a", 10, "invoice", "2024-06-04", "2024-06-10"),
                line_item("stove", 10, "invoice", "2024-07-01", "2024-07-03"),
                line_item("tent-b", 99, "quotation", "2024-06-02", "2024-06-03"),
            ],
            delivery_orders: vec![DeliveryOrderRow {
                id: 5,
                invoice_id: 10,
                vehicle_id: 7,
                status: Some("scheduled".to_string()),
                delivery_address: Some("1 Main St".to_string()),
            }],
            vehicles: vec![VehicleRow { id: 7, license_plate: Some("AB-123".to_string()) }],
        }
    }

    fn repo() -> MemoryRepository {
        MemoryRepository::from_dataset(fixture()).with_today(date("2024-06-03"))
    }

    #[tokio::test]
    async fn test_search_counts_overlapping_line_items() {
        let items = repo()
            .search_inventory("TENT", date("2024-06-01"), date("2024-06-30"))
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Tent A");
        assert_eq!(items[0].currently_rented, 2);
        assert_eq!(items[0].available_quantity, 1);
        assert_eq!(items[0].category_name.as_deref(), Some("Camping"));
        // Quotations still reserve stock
        assert_eq!(items[1].currently_rented, 1);
        assert_eq!(items[1].available_quantity, 0);
    }

    #[tokio::test]
    async fn test_search_window_edges_are_inclusive() {
        let items = repo()
            .search_inventory("Tent A", date("2024-06-10"), date("2024-06-10"))
            .await
            .unwrap();
        assert_eq!(items[0].currently_rented, 1);

        let items = repo()
            .search_inventory("Tent A", date("2024-06-11"), date("2024-06-20"))
            .await
            .unwrap();
        assert_eq!(items[0].currently_rented, 0);
    }

    #[tokio::test]
    async fn test_low_availability_filters_and_orders() {
        let items = repo()
            .low_availability(date("2024-06-01"), date("2024-06-30"), 1)
            .await
            .unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tent B", "Tent A"]);
        assert_eq!(items[0].available_quantity, 0);
        assert_eq!(items[1].available_quantity, 1);
    }

    #[tokio::test]
    async fn test_current_rentals_skip_finished_and_quotations() {
        let rentals = repo().current_rentals().await.unwrap();

        assert_eq!(rentals.len(), 3);
        assert!(rentals[0].is_active);
        assert_eq!(rentals[0].start_date, date("2024-06-01"));
        assert_eq!(rentals[0].company_name.as_deref(), Some("Acme"));
        assert!(!rentals[1].is_active);
        assert_eq!(rentals[2].product_name, "Camp Stove");
    }

    #[tokio::test]
    async fn test_delivery_schedule_groups_items() {
        let schedule = repo().delivery_schedule(date("2024-06-01")).await.unwrap();

        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].license_plate.as_deref(), Some("AB-123"));
        assert_eq!(schedule[0].items.len(), 1);
        assert_eq!(schedule[0].items[0].sku, "tent-a");

        let empty = repo().delivery_schedule(date("2024-06-02")).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_upcoming_returns_within_horizon() {
        let returns = repo().upcoming_returns(7).await.unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns[0].return_date, date("2024-06-05"));
        assert_eq!(returns[0].days_until_return, 2);
        assert_eq!(returns[1].days_until_return, 7);
    }

    #[tokio::test]
    async fn test_upcoming_returns_extreme_horizons() {
        let returns = repo().upcoming_returns(i32::MAX).await.unwrap();
        assert_eq!(returns.len(), 3);

        let returns = repo().upcoming_returns(i32::MIN).await.unwrap();
        assert!(returns.is_empty());
    }

    #[tokio::test]
    async fn test_search_term_uses_like_wildcards() {
        let repo = repo();
        let window = (date("2024-06-01"), date("2024-06-30"));

        let items = repo.search_inventory("tent _", window.0, window.1).await.unwrap();
        assert_eq!(items.len(), 2);

        let items = repo.search_inventory("camp%stove", window.0, window.1).await.unwrap();
        assert_eq!(items[0].name, "Camp Stove");

        let items = repo.search_inventory("tent\\_", window.0, window.1).await.unwrap();
        assert!(items.is_empty());

        let items = repo.search_inventory("tent*", window.0, window.1).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_ilike_pattern_translation() {
        assert_eq!(ilike_contains_pattern("Tent"), "*tent*");
        assert_eq!(ilike_contains_pattern("a%b_c"), "*a*b?c*");
        assert_eq!(ilike_contains_pattern("50\\%"), "*50\\%*");
        assert_eq!(ilike_contains_pattern("[x]?"), "*\\[x\\]\\?*");
        assert_eq!(ilike_contains_pattern(""), "**");
    }

    #[tokio::test]
    async fn test_product_crud() {
        let repo = repo();

        let created = repo
            .create_product(NewProduct {
                name: "Lantern".to_string(),
                quantity: 4,
                description: Some("LED".to_string()),
                category_id: 2,
            })
            .await
            .unwrap();
        assert!(Uuid::parse_str(&created.sku).is_ok());

        let fetched = repo.get_product(&created.sku).await.unwrap().unwrap();
        assert_eq!(fetched.category_name.as_deref(), Some("Tents"));

        let patched = repo
            .update_product(
                &created.sku,
                ProductPatch {
                    quantity: Some(9),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patched.quantity, 9);
        assert_eq!(patched.name, "Lantern");
        assert_eq!(patched.description.as_deref(), Some("LED"));

        let deleted = repo.delete_product(&created.sku).await.unwrap().unwrap();
        assert_eq!(deleted.name, "Lantern");
        assert!(repo.get_product(&created.sku).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quantity_has_no_floor() {
        let repo = repo();
        repo.update_quantity("tent-b", QuantityChange::Set(0)).await.unwrap();

        let record = repo
            .update_quantity("tent-b", QuantityChange::Adjust(-1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.quantity, -1);

        assert!(repo
            .update_quantity("missing", QuantityChange::Adjust(1))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_count_line_items_includes_quotations() {
        let repo = repo();
        assert_eq!(repo.count_line_items("tent-a").await.unwrap(), 2);
        assert_eq!(repo.count_line_items("tent-b").await.unwrap(), 1);
        assert_eq!(repo.count_line_items("lantern").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_categories_include_parent_name() {
        let categories = repo().list_categories().await.unwrap();
        assert_eq!(categories[0].name, "Camping");
        assert_eq!(categories[1].parent_name.as_deref(), Some("Camping"));
    }

    #[test]
    fn test_dataset_parses_with_missing_tables() {
        let data: Dataset = serde_json::from_str(
            r#"{"products": [{"sku": "a", "name": "Tent", "quantity": 2}]}"#,
        )
        .unwrap();
        assert_eq!(data.products.len(), 1);
        assert!(data.line_items.is_empty());
    }
}
