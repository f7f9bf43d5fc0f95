//! Persisted purchase records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a purchase bill is paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Cash,
    /// Paid later; requires a due date
    Credit,
    Card,
    Upi,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Credit => "credit",
            PaymentType::Card => "card",
            PaymentType::Upi => "upi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentType::Cash),
            "credit" => Some(PaymentType::Credit),
            "card" => Some(PaymentType::Card),
            "upi" => Some(PaymentType::Upi),
            _ => None,
        }
    }

    pub fn requires_due_date(&self) -> bool {
        matches!(self, PaymentType::Credit)
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Cash => write!(f, "Cash"),
            PaymentType::Credit => write!(f, "Credit"),
            PaymentType::Card => write!(f, "Card"),
            PaymentType::Upi => write!(f, "UPI"),
        }
    }
}

/// Bill header as written to the purchases table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub vendor_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub payment_type: PaymentType,
    pub payment_due_date: Option<NaiveDate>,
    pub bill_discount_percent: Decimal,
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub bill_discount_amount: Decimal,
    pub net_total: Decimal,
}

/// One purchase line as written to the purchase items table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItemRecord {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: u32,
    pub free_quantity: u32,
    pub rate: Decimal,
    pub mrp: Decimal,
    pub discount_percent: Decimal,
    pub scheme_percent: Decimal,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    pub hsn_code: Option<String>,
    pub pack_units: Option<String>,
    pub line_total: Decimal,
}

/// Stored purchase header with identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPurchase {
    pub id: Uuid,
    pub vendor_name: Option<String>,
    #[serde(flatten)]
    pub record: PurchaseRecord,
    pub created_at: DateTime<Utc>,
}

/// Stored purchase together with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDetail {
    pub purchase: StoredPurchase,
    pub items: Vec<PurchaseItemRecord>,
}
