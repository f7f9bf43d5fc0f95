//! Purchase line items

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calculation::{calculate_line, clamp_percent, margin_percent, clamp_money, LineCalculation};
use super::expiry::{ExpiryField, ExpiryYearRange};
use crate::models::{GstSplit, PurchaseItemRecord, StockedProduct};

/// Identifier of a line within one bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u32);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line-{}", self.0)
    }
}

/// One row of a purchase bill
///
/// Fields feeding the line total are private; setters recompute the total in
/// the same call so it can never go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineItem {
    id: LineId,
    pub product_ref: Option<Uuid>,
    pub product_name: String,
    pub batch_number: String,
    pub expiry: ExpiryField,
    quantity: u32,
    free_quantity: u32,
    rate: Decimal,
    mrp: Decimal,
    discount_percent: Decimal,
    /// Informational only, never applied to the line total
    scheme_percent: Decimal,
    gst: GstSplit,
    pub hsn_code: Option<String>,
    pub pack_units: Option<String>,
    calculation: LineCalculation,
}

impl PurchaseLineItem {
    /// Blank line
    pub fn new(id: LineId) -> Self {
        Self {
            id,
            product_ref: None,
            product_name: String::new(),
            batch_number: String::new(),
            expiry: ExpiryField::default(),
            quantity: 0,
            free_quantity: 0,
            rate: Decimal::ZERO,
            mrp: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            scheme_percent: Decimal::ZERO,
            gst: GstSplit::default(),
            hsn_code: None,
            pack_units: None,
            calculation: LineCalculation::default(),
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn free_quantity(&self) -> u32 {
        self.free_quantity
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn mrp(&self) -> Decimal {
        self.mrp
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    pub fn scheme_percent(&self) -> Decimal {
        self.scheme_percent
    }

    pub fn gst(&self) -> GstSplit {
        self.gst
    }

    pub fn calculation(&self) -> &LineCalculation {
        &self.calculation
    }

    pub fn line_total(&self) -> Decimal {
        self.calculation.line_total
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.recalculate();
    }

    pub fn set_free_quantity(&mut self, free_quantity: u32) {
        self.free_quantity = free_quantity;
        self.recalculate();
    }

    pub fn set_rate(&mut self, rate: Decimal) {
        self.rate = clamp_money(rate);
        self.recalculate();
    }

    pub fn set_mrp(&mut self, mrp: Decimal) {
        self.mrp = clamp_money(mrp);
        self.recalculate();
    }

    pub fn set_discount_percent(&mut self, discount_percent: Decimal) {
        self.discount_percent = clamp_percent(discount_percent);
        self.recalculate();
    }

    pub fn set_scheme_percent(&mut self, scheme_percent: Decimal) {
        self.scheme_percent = clamp_percent(scheme_percent);
        self.recalculate();
    }

    pub fn set_gst_split(&mut self, gst: GstSplit) {
        self.gst = GstSplit::new(clamp_percent(gst.cgst_percent), clamp_percent(gst.sgst_percent));
        self.recalculate();
    }

    /// Feed raw expiry keystrokes into the line's expiry field
    pub fn input_expiry(&mut self, keystrokes: &str, years: ExpiryYearRange) {
        self.expiry.input(keystrokes, years);
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry.date()
    }

    /// Fill catalog-derived fields from a selected product
    ///
    /// Quantity, free quantity, batch, expiry, discount and scheme are kept.
    pub fn apply_product(&mut self, selected: &StockedProduct) {
        let product = &selected.product;
        self.product_ref = Some(product.id);
        self.product_name = product.name.clone();
        self.rate = clamp_money(product.price);
        self.mrp = clamp_money(product.mrp);
        self.hsn_code = product.hsn_code.clone();
        self.pack_units = product.pack_units.clone();
        self.gst = product.gst_split();
        self.recalculate();
    }

    /// Margin for display, taking the bill-level discount into account
    pub fn margin_percent(&self, bill_discount_percent: Decimal) -> Decimal {
        margin_percent(self.rate, self.mrp, self.discount_percent, bill_discount_percent)
    }

    /// MRP below the purchase rate, shown as a warning only
    pub fn has_margin_warning(&self) -> bool {
        self.mrp < self.rate
    }

    /// Units entering stock: billed plus free
    pub fn received_units(&self) -> u32 {
        self.quantity.saturating_add(self.free_quantity)
    }

    /// Lines with a blank name or zero quantity are left out of a save
    pub fn is_valid_for_save(&self) -> bool {
        !self.product_name.trim().is_empty() && self.quantity > 0
    }

    /// Record shape written to persistence
    pub fn to_record(&self) -> PurchaseItemRecord {
        PurchaseItemRecord {
            product_id: self.product_ref,
            product_name: self.product_name.trim().to_string(),
            batch_number: self.batch_number.trim().to_string(),
            expiry_date: self.expiry.date(),
            quantity: self.quantity,
            free_quantity: self.free_quantity,
            rate: self.rate,
            mrp: self.mrp,
            discount_percent: self.discount_percent,
            scheme_percent: self.scheme_percent,
            cgst_percent: self.gst.cgst_percent,
            sgst_percent: self.gst.sgst_percent,
            hsn_code: self.hsn_code.clone(),
            pack_units: self.pack_units.clone(),
            line_total: self.calculation.line_total,
        }
    }

    /// Rebuild a line from a stored record
    pub fn from_record(id: LineId, record: &PurchaseItemRecord) -> Self {
        let mut line = Self::new(id);
        line.product_ref = record.product_id;
        line.product_name = record.product_name.clone();
        line.batch_number = record.batch_number.clone();
        line.expiry = record
            .expiry_date
            .map(ExpiryField::from_date)
            .unwrap_or_default();
        line.quantity = record.quantity;
        line.free_quantity = record.free_quantity;
        line.rate = clamp_money(record.rate);
        line.mrp = clamp_money(record.mrp);
        line.discount_percent = clamp_percent(record.discount_percent);
        line.scheme_percent = clamp_percent(record.scheme_percent);
        line.gst = GstSplit::new(
            clamp_percent(record.cgst_percent),
            clamp_percent(record.sgst_percent),
        );
        line.hsn_code = record.hsn_code.clone();
        line.pack_units = record.pack_units.clone();
        line.recalculate();
        line
    }

    fn recalculate(&mut self) {
        self.calculation = calculate_line(self.quantity, self.rate, self.discount_percent, self.gst);
    }
}
