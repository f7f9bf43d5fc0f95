//! Purchase bill aggregate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::calculation::{clamp_percent, round_money};
use super::line::{LineId, PurchaseLineItem};
use crate::models::{PaymentType, PurchaseItemRecord, PurchaseRecord};

/// Reasons a bill cannot be saved
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurchaseValidationError {
    #[error("Please select a vendor")]
    MissingVendor,

    #[error("Invoice number is required")]
    MissingInvoiceNumber,

    #[error("Invoice date is required")]
    MissingInvoiceDate,

    #[error("Payment due date is required for credit purchases")]
    MissingDueDate,

    #[error("Add at least one item with a product name and quantity")]
    NoValidLines,

    #[error("MRP must be greater than zero and rate cannot be negative (check line {})", format_lines(.lines))]
    InvalidLinePricing { lines: Vec<usize> },
}

impl PurchaseValidationError {
    /// Name of the offending form field
    pub fn field(&self) -> &'static str {
        match self {
            PurchaseValidationError::MissingVendor => "vendor_id",
            PurchaseValidationError::MissingInvoiceNumber => "invoice_number",
            PurchaseValidationError::MissingInvoiceDate => "invoice_date",
            PurchaseValidationError::MissingDueDate => "payment_due_date",
            PurchaseValidationError::NoValidLines => "lines",
            PurchaseValidationError::InvalidLinePricing { .. } => "lines",
        }
    }
}

fn format_lines(lines: &[usize]) -> String {
    lines
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bill-level totals over the saveable lines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BillTotals {
    /// Sum of taxable amounts before GST
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub bill_discount_amount: Decimal,
    pub net_total: Decimal,
}

impl BillTotals {
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_money(self.subtotal),
            total_tax: round_money(self.total_tax),
            bill_discount_amount: round_money(self.bill_discount_amount),
            net_total: round_money(self.net_total),
        }
    }
}

/// A purchase bill being entered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseBill {
    pub vendor_id: Option<Uuid>,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub payment_type: PaymentType,
    pub payment_due_date: Option<NaiveDate>,
    bill_discount_percent: Decimal,
    lines: Vec<PurchaseLineItem>,
    next_line_id: u32,
}

impl Default for PurchaseBill {
    fn default() -> Self {
        Self::new()
    }
}

impl PurchaseBill {
    /// Fresh bill with a single blank line
    pub fn new() -> Self {
        let mut bill = Self {
            vendor_id: None,
            invoice_number: String::new(),
            invoice_date: None,
            payment_type: PaymentType::default(),
            payment_due_date: None,
            bill_discount_percent: Decimal::ZERO,
            lines: Vec::new(),
            next_line_id: 1,
        };
        bill.add_line();
        bill
    }

    /// Rebuild the entry form from stored records
    pub fn from_saved(header: &PurchaseRecord, items: &[PurchaseItemRecord]) -> Self {
        let mut bill = Self {
            vendor_id: Some(header.vendor_id),
            invoice_number: header.invoice_number.clone(),
            invoice_date: Some(header.invoice_date),
            payment_type: header.payment_type,
            payment_due_date: header.payment_due_date,
            bill_discount_percent: clamp_percent(header.bill_discount_percent),
            lines: Vec::with_capacity(items.len().max(1)),
            next_line_id: 1,
        };
        for item in items {
            let id = bill.allocate_line_id();
            bill.lines.push(PurchaseLineItem::from_record(id, item));
        }
        if bill.lines.is_empty() {
            bill.add_line();
        }
        bill
    }

    fn allocate_line_id(&mut self) -> LineId {
        let id = LineId(self.next_line_id);
        self.next_line_id += 1;
        id
    }

    /// Append a blank line and return its id
    pub fn add_line(&mut self) -> LineId {
        let id = self.allocate_line_id();
        self.lines.push(PurchaseLineItem::new(id));
        id
    }

    /// Remove a line; the bill always keeps at least one line
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        let removed = self.lines.len() != before;
        if self.lines.is_empty() {
            self.add_line();
        }
        removed
    }

    pub fn lines(&self) -> &[PurchaseLineItem] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&PurchaseLineItem> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn line_mut(&mut self, id: LineId) -> Option<&mut PurchaseLineItem> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }

    pub fn bill_discount_percent(&self) -> Decimal {
        self.bill_discount_percent
    }

    pub fn set_bill_discount_percent(&mut self, percent: Decimal) {
        self.bill_discount_percent = clamp_percent(percent);
    }

    /// Lines that would be written on save
    pub fn saveable_lines(&self) -> impl Iterator<Item = &PurchaseLineItem> {
        self.lines.iter().filter(|line| line.is_valid_for_save())
    }

    /// Totals over the saveable lines, at full precision
    pub fn totals(&self) -> BillTotals {
        let (subtotal, total_tax) = self
            .saveable_lines()
            .fold((Decimal::ZERO, Decimal::ZERO), |(sub, tax), line| {
                let calc = line.calculation();
                (sub + calc.taxable_amount, tax + calc.gst_amount)
            });
        let gross = subtotal + total_tax;
        let bill_discount_amount = gross * self.bill_discount_percent / Decimal::ONE_HUNDRED;

        BillTotals {
            subtotal,
            total_tax,
            bill_discount_amount,
            net_total: gross - bill_discount_amount,
        }
    }

    /// Check the bill and return the lines to persist
    pub fn validate_for_save(&self) -> Result<Vec<&PurchaseLineItem>, PurchaseValidationError> {
        if self.vendor_id.is_none() {
            return Err(PurchaseValidationError::MissingVendor);
        }
        if self.invoice_number.trim().is_empty() {
            return Err(PurchaseValidationError::MissingInvoiceNumber);
        }
        if self.invoice_date.is_none() {
            return Err(PurchaseValidationError::MissingInvoiceDate);
        }
        if self.payment_type.requires_due_date() && self.payment_due_date.is_none() {
            return Err(PurchaseValidationError::MissingDueDate);
        }

        let valid: Vec<&PurchaseLineItem> = self.saveable_lines().collect();
        if valid.is_empty() {
            return Err(PurchaseValidationError::NoValidLines);
        }

        let bad_pricing: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_valid_for_save())
            .filter(|(_, line)| line.mrp() <= Decimal::ZERO || line.rate() < Decimal::ZERO)
            .map(|(index, _)| index + 1)
            .collect();
        if !bad_pricing.is_empty() {
            return Err(PurchaseValidationError::InvalidLinePricing { lines: bad_pricing });
        }

        Ok(valid)
    }

    /// Header record for a validated bill
    pub fn to_record(&self) -> Result<PurchaseRecord, PurchaseValidationError> {
        let vendor_id = self.vendor_id.ok_or(PurchaseValidationError::MissingVendor)?;
        let invoice_date = self
            .invoice_date
            .ok_or(PurchaseValidationError::MissingInvoiceDate)?;
        let totals = self.totals();

        Ok(PurchaseRecord {
            vendor_id,
            invoice_number: self.invoice_number.trim().to_string(),
            invoice_date,
            payment_type: self.payment_type,
            payment_due_date: if self.payment_type.requires_due_date() {
                self.payment_due_date
            } else {
                None
            },
            bill_discount_percent: self.bill_discount_percent,
            subtotal: totals.subtotal,
            total_tax: totals.total_tax,
            bill_discount_amount: totals.bill_discount_amount,
            net_total: totals.net_total,
        })
    }

    /// Return to the fresh state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GstSplit;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn filled_bill() -> PurchaseBill {
        let mut bill = PurchaseBill::new();
        bill.vendor_id = Some(Uuid::nil());
        bill.invoice_number = "INV-001".to_string();
        bill.invoice_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let id = bill.lines()[0].id();
        let line = bill.line_mut(id).unwrap();
        line.product_name = "Test Med".to_string();
        line.set_quantity(10);
        line.set_rate(dec("5.00"));
        line.set_mrp(dec("8.00"));
        line.set_gst_split(GstSplit::new(dec("6"), dec("6")));
        bill
    }

    #[test]
    fn test_totals_of_huge_lines_stay_in_range() {
        let mut bill = PurchaseBill::new();
        bill.set_bill_discount_percent(dec("10"));
        for index in 0..3 {
            let id = if index == 0 { bill.lines()[0].id() } else { bill.add_line() };
            let line = bill.line_mut(id).unwrap();
            line.product_name = format!("Bulk {}", index);
            line.set_quantity(u32::MAX);
            line.set_rate(Decimal::MAX / dec("2"));
            line.set_mrp(Decimal::MAX);
            line.set_gst_split(GstSplit::new(dec("100"), dec("100")));
        }

        let line_total = bill.lines()[0].line_total();
        let totals = bill.totals();
        assert_eq!(totals.subtotal + totals.total_tax, line_total * dec("3"));
        assert!(totals.net_total < totals.subtotal + totals.total_tax);
    }

    #[test]
    fn test_new_bill_has_one_blank_line() {
        let bill = PurchaseBill::new();
        assert_eq!(bill.lines().len(), 1);
        assert!(!bill.lines()[0].is_valid_for_save());
        assert_eq!(bill.totals(), BillTotals::default());
    }

    #[test]
    fn test_remove_last_line_keeps_one() {
        let mut bill = PurchaseBill::new();
        let first = bill.lines()[0].id();
        assert!(bill.remove_line(first));
        assert_eq!(bill.lines().len(), 1);
        assert_ne!(bill.lines()[0].id(), first);
        assert!(!bill.remove_line(LineId(999)));
    }

    #[test]
    fn test_line_ids_are_unique() {
        let mut bill = PurchaseBill::new();
        let a = bill.add_line();
        let b = bill.add_line();
        bill.remove_line(a);
        let c = bill.add_line();
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_totals_skip_invalid_lines() {
        let mut bill = filled_bill();
        let extra = bill.add_line();
        let line = bill.line_mut(extra).unwrap();
        line.set_quantity(100);
        line.set_rate(dec("10"));
        // blank name: excluded

        let totals = bill.totals();
        assert_eq!(totals.subtotal, dec("50"));
        assert_eq!(totals.total_tax, dec("6"));
        assert_eq!(totals.net_total, dec("56"));
    }

    #[test]
    fn test_bill_discount() {
        let mut bill = filled_bill();
        bill.set_bill_discount_percent(dec("10"));
        let totals = bill.totals();
        assert_eq!(totals.bill_discount_amount, dec("5.6"));
        assert_eq!(totals.net_total, dec("50.4"));
    }

    #[test]
    fn test_validation_order() {
        let mut bill = filled_bill();
        bill.vendor_id = None;
        bill.invoice_number.clear();
        assert_eq!(
            bill.validate_for_save().unwrap_err(),
            PurchaseValidationError::MissingVendor
        );
    }

    #[test]
    fn test_credit_requires_due_date() {
        let mut bill = filled_bill();
        bill.payment_type = PaymentType::Credit;
        assert_eq!(
            bill.validate_for_save().unwrap_err(),
            PurchaseValidationError::MissingDueDate
        );

        bill.payment_type = PaymentType::Cash;
        assert!(bill.validate_for_save().is_ok());
    }

    #[test]
    fn test_pricing_error_lists_lines() {
        let mut bill = filled_bill();
        let second = bill.add_line();
        let line = bill.line_mut(second).unwrap();
        line.product_name = "No MRP".to_string();
        line.set_quantity(1);

        let err = bill.validate_for_save().unwrap_err();
        assert_eq!(err, PurchaseValidationError::InvalidLinePricing { lines: vec![2] });
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_due_date_dropped_for_non_credit() {
        let mut bill = filled_bill();
        bill.payment_due_date = NaiveDate::from_ymd_opt(2026, 4, 1);
        let record = bill.to_record().unwrap();
        assert_eq!(record.payment_due_date, None);
    }

    #[test]
    fn test_reload_from_saved() {
        let bill = filled_bill();
        let header = bill.to_record().unwrap();
        let items: Vec<_> = bill.saveable_lines().map(|l| l.to_record()).collect();

        let reloaded = PurchaseBill::from_saved(&header, &items);
        assert_eq!(reloaded.invoice_number, "INV-001");
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.totals(), bill.totals());
    }

    #[test]
    fn test_reset() {
        let mut bill = filled_bill();
        bill.add_line();
        bill.reset();
        assert!(bill.vendor_id.is_none());
        assert!(bill.invoice_number.is_empty());
        assert_eq!(bill.lines().len(), 1);
    }
}
