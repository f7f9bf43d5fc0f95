//! Inventory and stock movement models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A received batch of a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: i64,
    pub purchase_rate: Decimal,
    pub mrp: Decimal,
    pub purchase_id: Option<Uuid>,
    pub received_at: DateTime<Utc>,
}

/// Stock movement recorded alongside inventory changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub batch_number: Option<String>,
    /// Purchase or order this movement belongs to
    pub reference_id: Option<Uuid>,
    pub unit_cost: Option<Decimal>,
    pub notes: Option<String>,
}

/// Types of stock movements
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Sale,
    Return,
    Adjustment,
    Expired,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Purchase => "purchase",
            MovementType::Sale => "sale",
            MovementType::Return => "return",
            MovementType::Adjustment => "adjustment",
            MovementType::Expired => "expired",
        }
    }
}

/// Stock to add for one product as a result of a purchase line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReceipt {
    pub product_id: Uuid,
    pub product_name: String,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    /// Billed plus free units
    pub units: i64,
    pub purchase_rate: Decimal,
    pub mrp: Decimal,
    pub purchase_id: Uuid,
}
