//! PostgreSQL Repository
//!
//! Parameterized queries over a deadpool-postgres connection pool. Each
//! method issues exactly one statement; availability is computed by the
//! database with a conditional sum over overlapping line items.

use async_trait::async_trait;
use chrono::NaiveDate;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};

use crate::config::DatabaseConfig;
use crate::db::InventoryRepository;
use crate::error::{DbError, DbResult};
use crate::models::{
    Category, CurrentRental, DeliveryItem, DeliveryScheduleEntry, InventoryItem,
    LowAvailabilityItem, NewProduct, Product, ProductPatch, ProductRecord, ProductSummary,
    QuantityChange, QuantityRecord, UpcomingReturn,
};

// ============================================================================
// QUERIES
// ============================================================================

const SEARCH_INVENTORY: &str = r#"
    SELECT sku, name, total_quantity, category_name, currently_rented,
           (total_quantity - currently_rented)::int8 AS available_quantity
    FROM (
        SELECT p.sku::text AS sku,
               p.name,
               p.quantity::int4 AS total_quantity,
               c.name AS category_name,
               COALESCE(SUM(
                   CASE WHEN li.start_date <= $2::date AND li.end_date >= $1::date
                        THEN 1 ELSE 0 END
               ), 0)::int8 AS currently_rented
        FROM "Product" p
        LEFT JOIN "Category" c ON p.cat = c.id
        LEFT JOIN "Line_item" li ON p.sku = li.sku
        WHERE p.name ILIKE $3
        GROUP BY p.sku, p.name, p.quantity, c.name
    ) availability
    ORDER BY name
"#;

const LOW_AVAILABILITY: &str = r#"
    SELECT sku, name, total_quantity, rented_quantity,
           (total_quantity - rented_quantity)::int8 AS available_quantity
    FROM (
        SELECT p.sku::text AS sku,
               p.name,
               p.quantity::int4 AS total_quantity,
               COALESCE(SUM(
                   CASE WHEN li.start_date <= $2::date AND li.end_date >= $1::date
                        THEN 1 ELSE 0 END
               ), 0)::int8 AS rented_quantity
        FROM "Product" p
        LEFT JOIN "Line_item" li ON p.sku = li.sku
        GROUP BY p.sku, p.name, p.quantity
    ) availability
    WHERE total_quantity - rented_quantity <= $3::int8
    ORDER BY available_quantity ASC, name
"#;

const CURRENT_RENTALS: &str = r#"
    SELECT p.name AS product_name,
           c.name AS customer_name,
           c.contact::text AS customer_contact,
           comp.name AS company_name,
           li.start_date,
           li.end_date,
           li.duration::text AS duration,
           (li.start_date <= CURRENT_DATE AND li.end_date >= CURRENT_DATE) AS is_active
    FROM "Line_item" li
    JOIN "Product" p ON li.sku = p.sku
    JOIN "Invoice" i ON li.doc_id = i.id AND li.doc_type = 'invoice'
    JOIN "Customer" c ON i.customer_id = c.id
    LEFT JOIN "Company" comp ON c.company = comp.id
    WHERE li.end_date >= CURRENT_DATE
    ORDER BY li.start_date, p.name
"#;

const DELIVERY_SCHEDULE: &str = r#"
    SELECT d.id::int8 AS delivery_id,
           d.status::text AS delivery_status,
           d.delivery_address::text AS delivery_address,
           c.name AS customer_name,
           c.contact::text AS customer_contact,
           v.license_plate::text AS license_plate,
           i.id::int8 AS invoice_id,
           json_agg(
               json_build_object(
                   'sku', p.sku::text,
                   'product_name', p.name,
                   'start_date', li.start_date,
                   'end_date', li.end_date
               ) ORDER BY p.name
           ) AS items
    FROM "Delivery_order" d
    JOIN "Invoice" i ON d.invoice_id = i.id
    JOIN "Customer" c ON i.customer_id = c.id
    JOIN "Vehicle_list" v ON d.vehicle_id = v.id
    JOIN "Line_item" li ON li.doc_id = i.id AND li.doc_type = 'invoice'
    JOIN "Product" p ON li.sku = p.sku
    WHERE li.start_date = $1::date
    GROUP BY d.id, d.status, d.delivery_address, c.name, c.contact, v.license_plate, i.id
    ORDER BY d.status, c.name
"#;

const UPCOMING_RETURNS: &str = r#"
    SELECT p.name AS product_name,
           c.name AS customer_name,
           c.contact::text AS customer_contact,
           li.end_date AS return_date,
           (li.end_date - CURRENT_DATE)::int4 AS days_until_return
    FROM "Line_item" li
    JOIN "Product" p ON li.sku = p.sku
    JOIN "Invoice" i ON li.doc_id = i.id AND li.doc_type = 'invoice'
    JOIN "Customer" c ON i.customer_id = c.id
    WHERE li.end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + $1::int4
    ORDER BY li.end_date, p.name
"#;

const PRODUCT_COLUMNS: &str = r#"
    SELECT p.sku::text AS sku,
           p.name,
           p.quantity::int4 AS quantity,
           p."desc" AS description,
           p.cat::int8 AS category_id,
           c.name AS category_name
    FROM "Product" p
    LEFT JOIN "Category" c ON p.cat = c.id
"#;

const RETURNING_RECORD: &str = r#"
    RETURNING sku::text AS sku, name, quantity::int4 AS quantity,
              "desc" AS description, cat::int8 AS category_id
"#;

const INSERT_PRODUCT: &str = r#"
    INSERT INTO "Product" (sku, name, quantity, "desc", cat)
    VALUES (gen_random_uuid(), $1::text, $2::int4, $3::text, $4::int8)
"#;

const UPDATE_PRODUCT: &str = r#"
    UPDATE "Product"
    SET name = COALESCE($1::text, name),
        quantity = COALESCE($2::int4, quantity),
        "desc" = COALESCE($3::text, "desc"),
        cat = COALESCE($4::int8, cat)
    WHERE sku::text = $5::text
"#;

const SET_QUANTITY: &str = r#"
    UPDATE "Product" SET quantity = $1::int4 WHERE sku::text = $2::text
    RETURNING sku::text AS sku, name, quantity::int4 AS quantity
"#;

const ADJUST_QUANTITY: &str = r#"
    UPDATE "Product" SET quantity = quantity + $1::int4 WHERE sku::text = $2::text
    RETURNING sku::text AS sku, name, quantity::int4 AS quantity
"#;

const COUNT_LINE_ITEMS: &str = r#"
    SELECT COUNT(*) AS count FROM "Line_item" WHERE sku::text = $1::text
"#;

const DELETE_PRODUCT: &str = r#"
    DELETE FROM "Product" WHERE sku::text = $1::text
    RETURNING sku::text AS sku, name
"#;

const LIST_CATEGORIES: &str = r#"
    SELECT c.id::int8 AS id,
           c.name,
           c.parent_id::int8 AS parent_id,
           pc.name AS parent_name
    FROM "Category" c
    LEFT JOIN "Category" pc ON c.parent_id = pc.id
    ORDER BY c.name
"#;

// ============================================================================
// REPOSITORY
// ============================================================================

/// Repository backed by a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: Pool,
}

impl PgRepository {
    /// Builds the connection pool. No connection is opened until first use.
    pub fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let mut cfg = Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.dbname = Some(config.name.clone());
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.pool = Some(PoolConfig::new(config.pool_size));
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(Self { pool })
    }

    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        let client = self.pool.get().await?;
        Ok(client.query(sql, params).await?)
    }

    async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> DbResult<Option<Row>> {
        let client = self.pool.get().await?;
        Ok(client.query_opt(sql, params).await?)
    }
}

/// Decodes every row with `decode`, failing on the first bad row.
fn decode_all<T>(
    rows: &[Row],
    decode: fn(&Row) -> Result<T, tokio_postgres::Error>,
) -> DbResult<Vec<T>> {
    rows.iter()
        .map(|row| decode(row).map_err(DbError::from))
        .collect()
}

// == Row Decoders ==

fn inventory_item(row: &Row) -> Result<InventoryItem, tokio_postgres::Error> {
    Ok(InventoryItem {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        total_quantity: row.try_get("total_quantity")?,
        category_name: row.try_get("category_name")?,
        currently_rented: row.try_get("currently_rented")?,
        available_quantity: row.try_get("available_quantity")?,
    })
}

fn low_availability_item(row: &Row) -> Result<LowAvailabilityItem, tokio_postgres::Error> {
    Ok(LowAvailabilityItem {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        total_quantity: row.try_get("total_quantity")?,
        rented_quantity: row.try_get("rented_quantity")?,
        available_quantity: row.try_get("available_quantity")?,
    })
}

fn current_rental(row: &Row) -> Result<CurrentRental, tokio_postgres::Error> {
    Ok(CurrentRental {
        product_name: row.try_get("product_name")?,
        customer_name: row.try_get("customer_name")?,
        customer_contact: row.try_get("customer_contact")?,
        company_name: row.try_get("company_name")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        duration: row.try_get("duration")?,
        is_active: row.try_get("is_active")?,
    })
}

fn upcoming_return(row: &Row) -> Result<UpcomingReturn, tokio_postgres::Error> {
    Ok(UpcomingReturn {
        product_name: row.try_get("product_name")?,
        customer_name: row.try_get("customer_name")?,
        customer_contact: row.try_get("customer_contact")?,
        return_date: row.try_get("return_date")?,
        days_until_return: row.try_get("days_until_return")?,
    })
}

fn product(row: &Row) -> Result<Product, tokio_postgres::Error> {
    Ok(Product {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
        category_name: row.try_get("category_name")?,
    })
}

fn product_record(row: &Row) -> Result<ProductRecord, tokio_postgres::Error> {
    Ok(ProductRecord {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        description: row.try_get("description")?,
        category_id: row.try_get("category_id")?,
    })
}

fn quantity_record(row: &Row) -> Result<QuantityRecord, tokio_postgres::Error> {
    Ok(QuantityRecord {
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
    })
}

fn category(row: &Row) -> Result<Category, tokio_postgres::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        parent_id: row.try_get("parent_id")?,
        parent_name: row.try_get("parent_name")?,
    })
}

/// Delivery rows carry their items as a JSON array built by `json_agg`.
fn delivery_entry(row: &Row) -> DbResult<DeliveryScheduleEntry> {
    let items: serde_json::Value = row.try_get("items")?;
    let items: Vec<DeliveryItem> = serde_json::from_value(items)?;

    Ok(DeliveryScheduleEntry {
        delivery_id: row.try_get("delivery_id")?,
        delivery_status: row.try_get("delivery_status")?,
        delivery_address: row.try_get("delivery_address")?,
        customer_name: row.try_get("customer_name")?,
        customer_contact: row.try_get("customer_contact")?,
        license_plate: row.try_get("license_plate")?,
        invoice_id: row.try_get("invoice_id")?,
        items,
    })
}

#[async_trait]
impl InventoryRepository for PgRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> DbResult<()> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    async fn search_inventory(
        &self,
        term: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<InventoryItem>> {
        let pattern = format!("%{}%", term);
        let rows = self
            .query(SEARCH_INVENTORY, &[&start, &end, &pattern])
            .await?;
        decode_all(&rows, inventory_item)
    }

    async fn low_availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        threshold: i64,
    ) -> DbResult<Vec<LowAvailabilityItem>> {
        let rows = self
            .query(LOW_AVAILABILITY, &[&start, &end, &threshold])
            .await?;
        decode_all(&rows, low_availability_item)
    }

    async fn current_rentals(&self) -> DbResult<Vec<CurrentRental>> {
        let rows = self.query(CURRENT_RENTALS, &[]).await?;
        decode_all(&rows, current_rental)
    }

    async fn delivery_schedule(&self, date: NaiveDate) -> DbResult<Vec<DeliveryScheduleEntry>> {
        let rows = self.query(DELIVERY_SCHEDULE, &[&date]).await?;
        rows.iter().map(delivery_entry).collect()
    }

    async fn upcoming_returns(&self, days_ahead: i32) -> DbResult<Vec<UpcomingReturn>> {
        let rows = self.query(UPCOMING_RETURNS, &[&days_ahead]).await?;
        decode_all(&rows, upcoming_return)
    }

    async fn list_products(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{} ORDER BY p.name", PRODUCT_COLUMNS);
        let rows = self.query(&sql, &[]).await?;
        decode_all(&rows, product)
    }

    async fn get_product(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("{} WHERE p.sku::text = $1::text", PRODUCT_COLUMNS);
        let row = self.query_opt(&sql, &[&sku]).await?;
        Ok(row.as_ref().map(product).transpose()?)
    }

    async fn create_product(&self, new: NewProduct) -> DbResult<ProductRecord> {
        let sql = format!("{} {}", INSERT_PRODUCT, RETURNING_RECORD);
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                &sql,
                &[&new.name, &new.quantity, &new.description, &new.category_id],
            )
            .await?;
        Ok(product_record(&row)?)
    }

    async fn update_product(
        &self,
        sku: &str,
        patch: ProductPatch,
    ) -> DbResult<Option<ProductRecord>> {
        let sql = format!("{} {}", UPDATE_PRODUCT, RETURNING_RECORD);
        let row = self
            .query_opt(
                &sql,
                &[
                    &patch.name,
                    &patch.quantity,
                    &patch.description,
                    &patch.category_id,
                    &sku,
                ],
            )
            .await?;
        Ok(row.as_ref().map(product_record).transpose()?)
    }

    async fn update_quantity(
        &self,
        sku: &str,
        change: QuantityChange,
    ) -> DbResult<Option<QuantityRecord>> {
        let (sql, amount) = match change {
            QuantityChange::Set(quantity) => (SET_QUANTITY, quantity),
            QuantityChange::Adjust(delta) => (ADJUST_QUANTITY, delta),
        };
        let row = self.query_opt(sql, &[&amount, &sku]).await?;
        Ok(row.as_ref().map(quantity_record).transpose()?)
    }

    async fn count_line_items(&self, sku: &str) -> DbResult<i64> {
        let client = self.pool.get().await?;
        let row = client.query_one(COUNT_LINE_ITEMS, &[&sku]).await?;
        Ok(row.try_get("count")?)
    }

    async fn delete_product(&self, sku: &str) -> DbResult<Option<ProductSummary>> {
        let row = self.query_opt(DELETE_PRODUCT, &[&sku]).await?;
        row.map(|row| -> DbResult<ProductSummary> {
            Ok(ProductSummary {
                sku: row.try_get("sku")?,
                name: row.try_get("name")?,
            })
        })
        .transpose()
    }

    async fn list_categories(&self) -> DbResult<Vec<Category>> {
        let rows = self.query(LIST_CATEGORIES, &[]).await?;
        decode_all(&rows, category)
    }

    fn close(&self) {
        self.pool.close();
    }
}
