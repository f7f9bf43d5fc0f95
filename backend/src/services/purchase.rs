//! Purchase persistence: bill headers, line items, inventory receipts

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{
    InventoryReceipt, PaginatedResponse, PaginationMeta, Pagination, PaymentType, PurchaseDetail,
    PurchaseItemRecord, PurchaseRecord, StockMovement, StoredPurchase,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::entry::{PurchaseSink, StoreError};
use crate::error::{AppError, AppResult};

/// Purchase service writing to and reading from PostgreSQL
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Row for purchase header queries
#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    vendor_id: Uuid,
    vendor_name: Option<String>,
    invoice_number: String,
    invoice_date: NaiveDate,
    payment_type: String,
    payment_due_date: Option<NaiveDate>,
    bill_discount_percent: Decimal,
    subtotal: Decimal,
    total_tax: Decimal,
    bill_discount_amount: Decimal,
    net_total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<PurchaseRow> for StoredPurchase {
    fn from(row: PurchaseRow) -> Self {
        StoredPurchase {
            id: row.id,
            vendor_name: row.vendor_name,
            record: PurchaseRecord {
                vendor_id: row.vendor_id,
                invoice_number: row.invoice_number,
                invoice_date: row.invoice_date,
                payment_type: PaymentType::parse(&row.payment_type).unwrap_or_default(),
                payment_due_date: row.payment_due_date,
                bill_discount_percent: row.bill_discount_percent,
                subtotal: row.subtotal,
                total_tax: row.total_tax,
                bill_discount_amount: row.bill_discount_amount,
                net_total: row.net_total,
            },
            created_at: row.created_at,
        }
    }
}

/// Row for purchase item queries
#[derive(Debug, FromRow)]
struct PurchaseItemRow {
    product_id: Option<Uuid>,
    product_name: String,
    batch_number: String,
    expiry_date: Option<NaiveDate>,
    quantity: i64,
    free_quantity: i64,
    rate: Decimal,
    mrp: Decimal,
    discount_percent: Decimal,
    scheme_percent: Decimal,
    cgst_percent: Decimal,
    sgst_percent: Decimal,
    hsn_code: Option<String>,
    pack_units: Option<String>,
    line_total: Decimal,
}

impl From<PurchaseItemRow> for PurchaseItemRecord {
    fn from(row: PurchaseItemRow) -> Self {
        PurchaseItemRecord {
            product_id: row.product_id,
            product_name: row.product_name,
            batch_number: row.batch_number,
            expiry_date: row.expiry_date,
            quantity: u32::try_from(row.quantity).unwrap_or_default(),
            free_quantity: u32::try_from(row.free_quantity).unwrap_or_default(),
            rate: row.rate,
            mrp: row.mrp,
            discount_percent: row.discount_percent,
            scheme_percent: row.scheme_percent,
            cgst_percent: row.cgst_percent,
            sgst_percent: row.sgst_percent,
            hsn_code: row.hsn_code,
            pack_units: row.pack_units,
            line_total: row.line_total,
        }
    }
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List purchase headers, newest invoice first
    pub async fn list_purchases(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StoredPurchase>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.db)
            .await
            .map_err(StoreError::from)?;

        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT p.id, p.vendor_id, v.name AS vendor_name, p.invoice_number, p.invoice_date,
                   p.payment_type, p.payment_due_date, p.bill_discount_percent, p.subtotal,
                   p.total_tax, p.bill_discount_amount, p.net_total, p.created_at
            FROM purchases p
            LEFT JOIN vendors v ON v.id = p.vendor_id
            ORDER BY p.invoice_date DESC, p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::from)?;

        Ok(PaginatedResponse {
            data: rows.into_iter().map(StoredPurchase::from).collect(),
            pagination: PaginationMeta::new(pagination, u64::try_from(total).unwrap_or_default()),
        })
    }

    /// Get a purchase with its items, for reloading the entry form
    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<PurchaseDetail> {
        let header = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT p.id, p.vendor_id, v.name AS vendor_name, p.invoice_number, p.invoice_date,
                   p.payment_type, p.payment_due_date, p.bill_discount_percent, p.subtotal,
                   p.total_tax, p.bill_discount_amount, p.net_total, p.created_at
            FROM purchases p
            LEFT JOIN vendors v ON v.id = p.vendor_id
            WHERE p.id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from)?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseItemRow>(
            r#"
            SELECT product_id, product_name, batch_number, expiry_date, quantity, free_quantity,
                   rate, mrp, discount_percent, scheme_percent, cgst_percent, sgst_percent,
                   hsn_code, pack_units, line_total
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY position
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::from)?;

        Ok(PurchaseDetail {
            purchase: header.into(),
            items: items.into_iter().map(PurchaseItemRecord::from).collect(),
        })
    }
}

#[async_trait]
impl PurchaseSink for PurchaseService {
    async fn insert_bill(&self, header: &PurchaseRecord) -> Result<Uuid, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchases (
                vendor_id, invoice_number, invoice_date, payment_type, payment_due_date,
                bill_discount_percent, subtotal, total_tax, bill_discount_amount, net_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(header.vendor_id)
        .bind(&header.invoice_number)
        .bind(header.invoice_date)
        .bind(header.payment_type.as_str())
        .bind(header.payment_due_date)
        .bind(header.bill_discount_percent)
        .bind(header.subtotal)
        .bind(header.total_tax)
        .bind(header.bill_discount_amount)
        .bind(header.net_total)
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn insert_items(&self, purchase_id: Uuid, items: &[PurchaseItemRecord]) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (
                    purchase_id, position, product_id, product_name, batch_number, expiry_date,
                    quantity, free_quantity, rate, mrp, discount_percent, scheme_percent,
                    cgst_percent, sgst_percent, hsn_code, pack_units, line_total
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .bind(purchase_id)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.batch_number)
            .bind(item.expiry_date)
            .bind(i64::from(item.quantity))
            .bind(i64::from(item.free_quantity))
            .bind(item.rate)
            .bind(item.mrp)
            .bind(item.discount_percent)
            .bind(item.scheme_percent)
            .bind(item.cgst_percent)
            .bind(item.sgst_percent)
            .bind(&item.hsn_code)
            .bind(&item.pack_units)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn upsert_inventory(&self, receipt: &InventoryReceipt) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        let inventory_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inventory (product_id, current_stock)
            VALUES ($1, $2)
            ON CONFLICT (product_id)
            DO UPDATE SET current_stock = inventory.current_stock + EXCLUDED.current_stock,
                          updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(receipt.product_id)
        .bind(receipt.units)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_batches (
                inventory_id, product_id, product_name, batch_number, expiry_date,
                quantity, purchase_rate, mrp, purchase_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(inventory_id)
        .bind(receipt.product_id)
        .bind(&receipt.product_name)
        .bind(&receipt.batch_number)
        .bind(receipt.expiry_date)
        .bind(receipt.units)
        .bind(receipt.purchase_rate)
        .bind(receipt.mrp)
        .bind(receipt.purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_movement(&self, movement: &StockMovement) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                product_id, movement_type, quantity, batch_number, reference_id, unit_cost, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(&movement.batch_number)
        .bind(movement.reference_id)
        .bind(movement.unit_cost)
        .bind(&movement.notes)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
