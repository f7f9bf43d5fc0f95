//! Inventory service for browsing stock batches by expiry

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{ExpiryStatus, InventoryBatch, NearExpiryWindow};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::entry::StoreError;
use crate::error::AppResult;

/// Inventory service for stored batches
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Row for batch queries
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    inventory_id: Uuid,
    product_id: Uuid,
    product_name: String,
    batch_number: String,
    expiry_date: Option<NaiveDate>,
    quantity: i64,
    purchase_rate: Decimal,
    mrp: Decimal,
    purchase_id: Option<Uuid>,
    received_at: DateTime<Utc>,
}

impl From<BatchRow> for InventoryBatch {
    fn from(row: BatchRow) -> Self {
        InventoryBatch {
            id: row.id,
            inventory_id: row.inventory_id,
            product_id: row.product_id,
            product_name: row.product_name,
            batch_number: row.batch_number,
            expiry_date: row.expiry_date,
            quantity: row.quantity,
            purchase_rate: row.purchase_rate,
            mrp: row.mrp,
            purchase_id: row.purchase_id,
            received_at: row.received_at,
        }
    }
}

/// A batch with its expiry classification
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedBatch {
    #[serde(flatten)]
    pub batch: InventoryBatch,
    pub status: ExpiryStatus,
    /// Negative once expired
    pub days_to_expiry: i64,
}

/// Batches grouped by expiry status
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpiryReport {
    pub as_of: Option<NaiveDate>,
    pub window_months: u32,
    pub expired: Vec<ClassifiedBatch>,
    pub near_expiry: Vec<ClassifiedBatch>,
    pub good: Vec<ClassifiedBatch>,
    /// Batches stored without an expiry date
    pub undated: usize,
}

impl ExpiryReport {
    /// Build a report from batches in stock
    pub fn build(batches: Vec<InventoryBatch>, today: NaiveDate, window: NearExpiryWindow) -> Self {
        let mut report = ExpiryReport {
            as_of: Some(today),
            window_months: window.months,
            ..Default::default()
        };

        for batch in batches {
            let Some(expiry) = batch.expiry_date else {
                report.undated += 1;
                continue;
            };
            let status = window.classify(expiry, today);
            let entry = ClassifiedBatch {
                batch,
                status,
                days_to_expiry: (expiry - today).num_days(),
            };
            match status {
                ExpiryStatus::Expired => report.expired.push(entry),
                ExpiryStatus::NearExpiry => report.near_expiry.push(entry),
                ExpiryStatus::Good => report.good.push(entry),
            }
        }

        report
    }
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Classify every batch still in stock, soonest expiry first
    pub async fn expiry_report(&self, today: NaiveDate, window: NearExpiryWindow) -> AppResult<ExpiryReport> {
        let rows = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, inventory_id, product_id, product_name, batch_number, expiry_date,
                   quantity, purchase_rate, mrp, purchase_id, received_at
            FROM inventory_batches
            WHERE quantity > 0
            ORDER BY expiry_date ASC NULLS LAST, product_name
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::from)?;

        let batches = rows.into_iter().map(InventoryBatch::from).collect();
        Ok(ExpiryReport::build(batches, today, window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(name: &str, expiry: Option<NaiveDate>) -> InventoryBatch {
        InventoryBatch {
            id: Uuid::new_v4(),
            inventory_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            batch_number: "B1".to_string(),
            expiry_date: expiry,
            quantity: 10,
            purchase_rate: Decimal::ONE,
            mrp: Decimal::TWO,
            purchase_id: None,
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_groups_by_status() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let batches = vec![
            batch("Old", NaiveDate::from_ymd_opt(2026, 9, 30)),
            batch("Soon", NaiveDate::from_ymd_opt(2026, 12, 31)),
            batch("Later", NaiveDate::from_ymd_opt(2027, 6, 30)),
            batch("Loose", None),
        ];

        let report = ExpiryReport::build(batches, today, NearExpiryWindow::INVENTORY);

        assert_eq!(report.expired.len(), 1);
        assert_eq!(report.expired[0].days_to_expiry, -19);
        assert_eq!(report.near_expiry[0].batch.product_name, "Soon");
        assert_eq!(report.good[0].batch.product_name, "Later");
        assert_eq!(report.undated, 1);
    }

    #[test]
    fn test_wider_window_moves_batches_to_near_expiry() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let batches = vec![batch("Spring", NaiveDate::from_ymd_opt(2027, 3, 31))];

        let narrow = ExpiryReport::build(batches.clone(), today, NearExpiryWindow::INVENTORY);
        let wide = ExpiryReport::build(batches, today, NearExpiryWindow::PURCHASE_ENTRY);

        assert_eq!(narrow.good.len(), 1);
        assert_eq!(wide.near_expiry.len(), 1);
    }
}
