//! Product catalog backed by PostgreSQL

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{Product, StockLevel, StockedProduct, Vendor};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::entry::{ProductCatalog, StoreError};

/// Catalog service for product and vendor lookups
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Product joined with its inventory row
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    generic_name: Option<String>,
    composition: Option<String>,
    manufacturer: Option<String>,
    hsn_code: Option<String>,
    pack_units: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    mrp: Decimal,
    price: Decimal,
    gst_percentage: Decimal,
    current_stock: i64,
    min_stock: i64,
}

impl From<ProductRow> for StockedProduct {
    fn from(row: ProductRow) -> Self {
        StockedProduct::new(
            Product {
                id: row.id,
                name: row.name,
                generic_name: row.generic_name,
                composition: row.composition,
                manufacturer: row.manufacturer,
                hsn_code: row.hsn_code,
                pack_units: row.pack_units,
                category: row.category,
                tags: row.tags,
                mrp: row.mrp,
                price: row.price,
                gst_percentage: row.gst_percentage,
            },
            StockLevel {
                current_stock: row.current_stock,
                min_stock: row.min_stock,
            },
        )
    }
}

#[derive(Debug, FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    contact: Option<String>,
    gst_number: Option<String>,
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCatalog for CatalogService {
    async fn search_products(&self, query: &str, limit: usize) -> Result<Vec<StockedProduct>, StoreError> {
        let pattern = like_pattern(query.trim());
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.name, p.generic_name, p.composition, p.manufacturer, p.hsn_code,
                   p.pack_units, p.category, p.tags, p.mrp, p.price, p.gst_percentage,
                   COALESCE(i.current_stock, 0) AS current_stock,
                   COALESCE(i.min_stock, 0) AS min_stock
            FROM products p
            LEFT JOIN inventory i ON i.product_id = p.id
            WHERE p.name ILIKE $1
               OR p.generic_name ILIKE $1
               OR p.composition ILIKE $1
               OR p.manufacturer ILIKE $1
               OR p.hsn_code ILIKE $1
            ORDER BY p.name
            LIMIT $2
            "#,
        )
        .bind(&pattern)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(StockedProduct::from).collect())
    }

    async fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError> {
        let rows = sqlx::query_as::<_, VendorRow>(
            "SELECT id, name, contact, gst_number FROM vendors ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Vendor {
                id: row.id,
                name: row.name,
                contact: row.contact,
                gst_number: row.gst_number,
            })
            .collect())
    }
}
