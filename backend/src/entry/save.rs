//! Purchase save: bill header, line items, inventory, stock movements
//!
//! Only the bill header is fatal. The three later steps are attempted
//! independently and never undo earlier writes; their failures are returned
//! alongside the saved bill id.

use serde::Serialize;
use shared::{
    InventoryReceipt, MovementType, PurchaseBill, PurchaseItemRecord, PurchaseValidationError,
    StockMovement,
};
use thiserror::Error;
use uuid::Uuid;

use super::store::{PurchaseSink, StoreError};

/// Save steps that may fail without failing the save
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveStep {
    LineItems,
    Inventory,
    StockMovement,
}

impl SaveStep {
    fn describe(&self) -> &'static str {
        match self {
            SaveStep::LineItems => "item details",
            SaveStep::Inventory => "inventory update",
            SaveStep::StockMovement => "stock movement log",
        }
    }
}

/// One failed non-fatal step
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepFailure {
    pub step: SaveStep,
    /// Product the failure relates to, for per-product steps
    pub product_name: Option<String>,
    pub code: &'static str,
    pub reason: String,
    #[serde(skip)]
    pub error: StoreError,
}

impl StepFailure {
    fn new(step: SaveStep, product_name: Option<String>, error: StoreError) -> Self {
        Self {
            step,
            product_name,
            code: error.code(),
            reason: error.to_string(),
            error,
        }
    }
}

/// Result of a save whose bill header was written
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub purchase_id: Uuid,
    pub invoice_number: String,
    pub saved_lines: usize,
    /// Lines not linked to a catalog product, so not added to inventory
    pub unlinked_lines: usize,
    pub failures: Vec<StepFailure>,
}

impl SaveOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Single message to show the user
    pub fn notification(&self) -> String {
        let Some(first) = self.failures.first() else {
            return format!(
                "Purchase {} saved with {} item(s)",
                self.invoice_number, self.saved_lines
            );
        };

        let mut steps: Vec<&'static str> = Vec::new();
        let mut remedies: Vec<&'static str> = Vec::new();
        for failure in &self.failures {
            let step = failure.step.describe();
            if !steps.contains(&step) {
                steps.push(step);
            }
            let remedy = failure.error.remedy();
            if !remedies.contains(&remedy) {
                remedies.push(remedy);
            }
        }

        format!(
            "Purchase {} saved, but {} failed: {}. {}",
            self.invoice_number,
            steps.join(" and "),
            first.reason,
            remedies.join(" ")
        )
    }
}

/// Why a save did not happen
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{0}")]
    Validation(#[from] PurchaseValidationError),

    /// Bill header write failed; nothing was saved
    #[error("Could not save purchase: {0}")]
    Header(StoreError),
}

fn receipt_for(purchase_id: Uuid, product_id: Uuid, item: &PurchaseItemRecord) -> InventoryReceipt {
    InventoryReceipt {
        product_id,
        product_name: item.product_name.clone(),
        batch_number: item.batch_number.clone(),
        expiry_date: item.expiry_date,
        units: i64::from(item.quantity) + i64::from(item.free_quantity),
        purchase_rate: item.rate,
        mrp: item.mrp,
        purchase_id,
    }
}

fn movement_for(receipt: &InventoryReceipt) -> StockMovement {
    StockMovement {
        product_id: receipt.product_id,
        movement_type: MovementType::Purchase,
        quantity: receipt.units,
        batch_number: Some(receipt.batch_number.clone()).filter(|b| !b.is_empty()),
        reference_id: Some(receipt.purchase_id),
        unit_cost: Some(receipt.purchase_rate),
        notes: None,
    }
}

/// Validate and persist a bill, resetting it once the header is stored
///
/// On any error the bill is left untouched so the user can correct and retry.
pub async fn save_purchase<S>(bill: &mut PurchaseBill, sink: &S) -> Result<SaveOutcome, SaveError>
where
    S: PurchaseSink + ?Sized,
{
    let items: Vec<PurchaseItemRecord> = bill
        .validate_for_save()?
        .into_iter()
        .map(|line| line.to_record())
        .collect();
    let header = bill.to_record()?;

    let purchase_id = sink.insert_bill(&header).await.map_err(|err| {
        tracing::error!("Purchase {} header write failed: {}", header.invoice_number, err);
        SaveError::Header(err)
    })?;
    tracing::info!(
        "Saved purchase {} ({}) with {} line(s)",
        header.invoice_number,
        purchase_id,
        items.len()
    );

    let mut failures = Vec::new();

    if let Err(err) = sink.insert_items(purchase_id, &items).await {
        tracing::warn!("Purchase {} line items not saved: {}", purchase_id, err);
        failures.push(StepFailure::new(SaveStep::LineItems, None, err));
    }

    let receipts: Vec<InventoryReceipt> = items
        .iter()
        .filter_map(|item| item.product_id.map(|id| receipt_for(purchase_id, id, item)))
        .collect();
    let unlinked_lines = items.len() - receipts.len();

    for receipt in &receipts {
        if let Err(err) = sink.upsert_inventory(receipt).await {
            tracing::warn!("Inventory not updated for {}: {}", receipt.product_name, err);
            failures.push(StepFailure::new(
                SaveStep::Inventory,
                Some(receipt.product_name.clone()),
                err,
            ));
        }
    }

    for receipt in &receipts {
        if let Err(err) = sink.record_movement(&movement_for(receipt)).await {
            tracing::warn!("Stock movement not recorded for {}: {}", receipt.product_name, err);
            failures.push(StepFailure::new(
                SaveStep::StockMovement,
                Some(receipt.product_name.clone()),
                err,
            ));
        }
    }

    let outcome = SaveOutcome {
        purchase_id,
        invoice_number: header.invoice_number,
        saved_lines: items.len(),
        unlinked_lines,
        failures,
    };
    bill.reset();
    Ok(outcome)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{GstSplit, PaymentType, PurchaseRecord};
    use std::sync::Mutex;

    /// In-memory sink that records writes and can fail chosen steps
    #[derive(Default)]
    pub struct RecordingSink {
        pub fail_header: Option<StoreError>,
        pub fail_items: Option<StoreError>,
        pub fail_inventory: Option<StoreError>,
        pub fail_movements: Option<StoreError>,
        pub headers: Mutex<Vec<PurchaseRecord>>,
        pub items: Mutex<Vec<PurchaseItemRecord>>,
        pub receipts: Mutex<Vec<InventoryReceipt>>,
        pub movements: Mutex<Vec<StockMovement>>,
    }

    fn check(fail: &Option<StoreError>) -> Result<(), StoreError> {
        match fail {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    #[async_trait]
    impl PurchaseSink for RecordingSink {
        async fn insert_bill(&self, header: &PurchaseRecord) -> Result<Uuid, StoreError> {
            check(&self.fail_header)?;
            self.headers.lock().unwrap().push(header.clone());
            Ok(Uuid::new_v4())
        }

        async fn insert_items(&self, _purchase_id: Uuid, items: &[PurchaseItemRecord]) -> Result<(), StoreError> {
            check(&self.fail_items)?;
            self.items.lock().unwrap().extend_from_slice(items);
            Ok(())
        }

        async fn upsert_inventory(&self, receipt: &InventoryReceipt) -> Result<(), StoreError> {
            check(&self.fail_inventory)?;
            self.receipts.lock().unwrap().push(receipt.clone());
            Ok(())
        }

        async fn record_movement(&self, movement: &StockMovement) -> Result<(), StoreError> {
            check(&self.fail_movements)?;
            self.movements.lock().unwrap().push(movement.clone());
            Ok(())
        }
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    pub fn ready_bill() -> PurchaseBill {
        let mut bill = PurchaseBill::new();
        bill.vendor_id = Some(Uuid::new_v4());
        bill.invoice_number = "INV-001".to_string();
        bill.invoice_date = NaiveDate::from_ymd_opt(2026, 10, 19);
        let id = bill.lines()[0].id();
        let line = bill.line_mut(id).unwrap();
        line.product_ref = Some(Uuid::new_v4());
        line.product_name = "Test Med".to_string();
        line.batch_number = "BT-9".to_string();
        line.set_quantity(10);
        line.set_free_quantity(2);
        line.set_rate(dec("5.00"));
        line.set_mrp(dec("8.00"));
        line.set_gst_split(GstSplit::new(dec("6"), dec("6")));
        bill
    }

    #[tokio::test]
    async fn test_complete_save_resets_bill() {
        let sink = RecordingSink::default();
        let mut bill = ready_bill();

        let outcome = save_purchase(&mut bill, &sink).await.unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.saved_lines, 1);
        assert_eq!(outcome.notification(), "Purchase INV-001 saved with 1 item(s)");
        assert_eq!(sink.headers.lock().unwrap()[0].net_total, dec("56"));
        assert_eq!(sink.receipts.lock().unwrap()[0].units, 12);
        assert_eq!(sink.movements.lock().unwrap()[0].quantity, 12);
        assert!(bill.invoice_number.is_empty());
        assert_eq!(bill.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_bill() {
        let sink = RecordingSink::default();
        let mut bill = ready_bill();
        bill.payment_type = PaymentType::Credit;

        let err = save_purchase(&mut bill, &sink).await.unwrap_err();

        assert!(matches!(err, SaveError::Validation(PurchaseValidationError::MissingDueDate)));
        assert_eq!(bill.invoice_number, "INV-001");
        assert!(sink.headers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_header_failure_is_fatal_and_keeps_bill() {
        let sink = RecordingSink {
            fail_header: Some(StoreError::Missing {
                resource: "purchases".to_string(),
            }),
            ..Default::default()
        };
        let mut bill = ready_bill();

        let err = save_purchase(&mut bill, &sink).await.unwrap_err();

        assert!(matches!(err, SaveError::Header(StoreError::Missing { .. })));
        assert_eq!(bill.invoice_number, "INV-001");
        assert!(sink.items.lock().unwrap().is_empty());
        assert!(sink.receipts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_later_failures_are_qualified_success() {
        let sink = RecordingSink {
            fail_items: Some(StoreError::Missing {
                resource: "purchase_items".to_string(),
            }),
            fail_inventory: Some(StoreError::Rejected {
                reason: "permission denied for table inventory".to_string(),
            }),
            ..Default::default()
        };
        let mut bill = ready_bill();

        let outcome = save_purchase(&mut bill, &sink).await.unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].step, SaveStep::LineItems);
        assert_eq!(outcome.failures[0].code, "RESOURCE_MISSING");
        assert_eq!(outcome.failures[1].code, "WRITE_REJECTED");
        // Movements still attempted after inventory failed
        assert_eq!(sink.movements.lock().unwrap().len(), 1);
        assert_eq!(
            outcome.notification(),
            "Purchase INV-001 saved, but item details and inventory update failed: \
             purchase_items is not available (missing table or endpoint). \
             The database needs provisioning; contact your administrator. \
             Check the entered data and your access rights."
        );
        assert!(bill.invoice_number.is_empty());
    }

    #[test]
    fn test_repeated_error_kind_gives_one_remedy() {
        let unavailable = || StoreError::Unavailable("connection reset".to_string());
        let outcome = SaveOutcome {
            purchase_id: Uuid::nil(),
            invoice_number: "INV-9".to_string(),
            saved_lines: 2,
            unlinked_lines: 0,
            failures: vec![
                StepFailure::new(SaveStep::StockMovement, Some("A".to_string()), unavailable()),
                StepFailure::new(SaveStep::StockMovement, Some("B".to_string()), unavailable()),
            ],
        };

        assert_eq!(
            outcome.notification(),
            "Purchase INV-9 saved, but stock movement log failed: \
             data store unavailable: connection reset. \
             Try again once the connection is restored."
        );
    }

    #[tokio::test]
    async fn test_unlinked_lines_skip_inventory() {
        let sink = RecordingSink::default();
        let mut bill = ready_bill();
        let extra = bill.add_line();
        let line = bill.line_mut(extra).unwrap();
        line.product_name = "Loose item".to_string();
        line.set_quantity(3);
        line.set_mrp(dec("4"));
        // blank row is dropped silently
        bill.add_line();

        let outcome = save_purchase(&mut bill, &sink).await.unwrap();

        assert_eq!(outcome.saved_lines, 2);
        assert_eq!(outcome.unlinked_lines, 1);
        assert_eq!(sink.items.lock().unwrap().len(), 2);
        assert_eq!(sink.receipts.lock().unwrap().len(), 1);
    }
}
