//! Product catalog models
//!
//! The catalog record is kept small. Screens that need more than the base
//! record wrap it in a named extension instead of growing optional fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base catalog product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub generic_name: Option<String>,
    pub composition: Option<String>,
    pub manufacturer: Option<String>,
    pub hsn_code: Option<String>,
    /// Pack description, e.g. "10 tablets" or "100 ml"
    pub pack_units: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub mrp: Decimal,
    /// Purchase price per unit
    pub price: Decimal,
    /// Total GST percentage (CGST + SGST)
    pub gst_percentage: Decimal,
}

impl Product {
    /// Create a product with only the required fields set
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            generic_name: None,
            composition: None,
            manufacturer: None,
            hsn_code: None,
            pack_units: None,
            category: None,
            tags: Vec::new(),
            mrp: Decimal::ZERO,
            price: Decimal::ZERO,
            gst_percentage: Decimal::ZERO,
        }
    }

    pub fn gst_split(&self) -> GstSplit {
        GstSplit::from_total(self.gst_percentage)
    }
}

/// Stock counters for a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StockLevel {
    pub current_stock: i64,
    pub min_stock: i64,
}

impl StockLevel {
    pub fn is_low(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

/// Product together with its stock, as used by search and inventory screens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub stock: StockLevel,
}

impl StockedProduct {
    pub fn new(product: Product, stock: StockLevel) -> Self {
        Self { product, stock }
    }
}

/// CGST/SGST halves of a GST rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GstSplit {
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
}

impl GstSplit {
    pub fn new(cgst_percent: Decimal, sgst_percent: Decimal) -> Self {
        Self {
            cgst_percent,
            sgst_percent,
        }
    }

    /// Split a total GST percentage into equal central and state halves
    pub fn from_total(gst_percentage: Decimal) -> Self {
        let half = gst_percentage / Decimal::TWO;
        Self::new(half, half)
    }

    /// Effective tax rate applied to the taxable amount
    pub fn total(&self) -> Decimal {
        self.cgst_percent + self.sgst_percent
    }
}

/// Vendor (supplier) record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub gst_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_split_halves() {
        let split = GstSplit::from_total(Decimal::from(12));
        assert_eq!(split.cgst_percent, Decimal::from(6));
        assert_eq!(split.sgst_percent, Decimal::from(6));
        assert_eq!(split.total(), Decimal::from(12));
    }

    #[test]
    fn test_gst_split_odd_rate() {
        let split = GstSplit::from_total(Decimal::from(5));
        assert_eq!(split.cgst_percent, Decimal::new(25, 1));
        assert_eq!(split.total(), Decimal::from(5));
    }

    #[test]
    fn test_low_stock() {
        let stock = StockLevel {
            current_stock: 4,
            min_stock: 5,
        };
        assert!(stock.is_low());
        assert!(!StockLevel {
            current_stock: 6,
            min_stock: 5
        }
        .is_low());
    }
}
