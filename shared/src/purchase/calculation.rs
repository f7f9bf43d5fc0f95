//! Purchase line arithmetic
//!
//! All amounts are kept at full `Decimal` precision. Rounding happens only
//! when values are prepared for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::GstSplit;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest rate or MRP a line accepts: 99,999,999.9999, the widest value
/// stored for a line price
///
/// With a `u32` quantity this keeps every line and bill amount far inside
/// `Decimal`'s range.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 4);

/// Derived amounts for one purchase line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LineCalculation {
    pub base_amount: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub gst_amount: Decimal,
    pub line_total: Decimal,
}

impl LineCalculation {
    /// Copy of the amounts rounded to two decimal places
    pub fn rounded(&self) -> Self {
        Self {
            base_amount: round_money(self.base_amount),
            discount_amount: round_money(self.discount_amount),
            taxable_amount: round_money(self.taxable_amount),
            gst_amount: round_money(self.gst_amount),
            line_total: round_money(self.line_total),
        }
    }
}

/// Calculate base, discount, taxable, GST and total amounts for a line
///
/// Scheme percentage and free quantity are not inputs: they never change
/// the billed amount.
pub fn calculate_line(
    quantity: u32,
    rate: Decimal,
    discount_percent: Decimal,
    gst: GstSplit,
) -> LineCalculation {
    let rate = clamp_money(rate);
    let discount_percent = clamp_percent(discount_percent);
    let gst_percent = clamp_percent(gst.cgst_percent) + clamp_percent(gst.sgst_percent);

    let base_amount = Decimal::from(quantity) * rate;
    let discount_amount = base_amount * discount_percent / HUNDRED;
    let taxable_amount = base_amount - discount_amount;
    let gst_amount = taxable_amount * gst_percent / HUNDRED;

    LineCalculation {
        base_amount,
        discount_amount,
        taxable_amount,
        gst_amount,
        line_total: taxable_amount + gst_amount,
    }
}

/// Margin between MRP and the effective purchase rate, in percent
///
/// The effective rate applies the line discount and then the bill discount.
/// Returns 0 when MRP is 0 and never leaves the 0..=100 range.
pub fn margin_percent(
    rate: Decimal,
    mrp: Decimal,
    discount_percent: Decimal,
    bill_discount_percent: Decimal,
) -> Decimal {
    let mrp = clamp_money(mrp);
    if mrp.is_zero() {
        return Decimal::ZERO;
    }

    let discounted_rate = clamp_money(rate) * (Decimal::ONE - clamp_percent(discount_percent) / HUNDRED);
    let final_rate = discounted_rate * (Decimal::ONE - clamp_percent(bill_discount_percent) / HUNDRED);
    let margin = (mrp - final_rate) / mrp * HUNDRED;

    margin.max(Decimal::ZERO).min(HUNDRED)
}

/// Clamp a percentage into 0..=100
pub fn clamp_percent(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(HUNDRED)
}

/// Clamp a money amount into 0..=MAX_MONEY
pub fn clamp_money(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(MAX_MONEY)
}

/// Round a money amount for display
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}
