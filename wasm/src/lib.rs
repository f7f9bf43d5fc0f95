//! WebAssembly module for the pharmacy admin dashboard
//!
//! Provides client-side computation for:
//! - Purchase line totals and margins
//! - Bill totals
//! - Expiry entry and expiry classification
//! - Product suggestion ranking

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::purchase::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("Pharmacy admin WASM module loaded"));
}

/// Line fields as sent by the purchase form
#[derive(Debug, Deserialize)]
struct LineInput {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    quantity: u32,
    #[serde(default)]
    free_quantity: u32,
    #[serde(default)]
    rate: Decimal,
    #[serde(default)]
    mrp: Decimal,
    #[serde(default)]
    discount_percent: Decimal,
    #[serde(default)]
    scheme_percent: Decimal,
    #[serde(default)]
    cgst_percent: Decimal,
    #[serde(default)]
    sgst_percent: Decimal,
}

impl LineInput {
    fn apply_to(&self, line: &mut PurchaseLineItem) {
        line.product_name = self.product_name.clone();
        line.set_quantity(self.quantity);
        line.set_free_quantity(self.free_quantity);
        line.set_rate(self.rate);
        line.set_mrp(self.mrp);
        line.set_discount_percent(self.discount_percent);
        line.set_scheme_percent(self.scheme_percent);
        line.set_gst_split(GstSplit::new(self.cgst_percent, self.sgst_percent));
    }
}

#[derive(Debug, Deserialize)]
struct LineRequest {
    #[serde(flatten)]
    line: LineInput,
    #[serde(default)]
    bill_discount_percent: Decimal,
}

#[derive(Debug, Serialize)]
struct LineResult {
    #[serde(flatten)]
    calculation: LineCalculation,
    margin_percent: Decimal,
    margin_warning: bool,
}

#[derive(Debug, Deserialize)]
struct BillRequest {
    #[serde(default)]
    bill_discount_percent: Decimal,
    lines: Vec<LineInput>,
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error("Serialization failed", e))
}

fn line_result(request: &LineRequest) -> LineResult {
    let mut line = PurchaseLineItem::new(LineId(1));
    request.line.apply_to(&mut line);
    LineResult {
        calculation: line.calculation().rounded(),
        margin_percent: round_money(line.margin_percent(request.bill_discount_percent)),
        margin_warning: line.has_margin_warning(),
    }
}

fn bill_totals(request: &BillRequest) -> BillTotals {
    let mut bill = PurchaseBill::new();
    bill.set_bill_discount_percent(request.bill_discount_percent);
    for (index, input) in request.lines.iter().enumerate() {
        let id = if index == 0 {
            bill.lines()[0].id()
        } else {
            bill.add_line()
        };
        if let Some(line) = bill.line_mut(id) {
            input.apply_to(line);
        }
    }
    bill.totals().rounded()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .unwrap_or_default()
}

/// Calculate a purchase line: amounts, margin and margin warning
#[wasm_bindgen]
pub fn calculate_purchase_line(line_json: &str) -> Result<String, JsValue> {
    let request: LineRequest =
        serde_json::from_str(line_json).map_err(|e| js_error("Invalid line JSON", e))?;
    to_json(&line_result(&request))
}

/// Margin percentage after line and bill discounts
#[wasm_bindgen]
pub fn calculate_margin(rate: f64, mrp: f64, discount_percent: f64, bill_discount_percent: f64) -> f64 {
    let to_dec = |v: f64| Decimal::try_from(v).unwrap_or(Decimal::ZERO);
    let margin = margin_percent(
        to_dec(rate),
        to_dec(mrp),
        to_dec(discount_percent),
        to_dec(bill_discount_percent),
    );
    round_money(margin).to_string().parse().unwrap_or(0.0)
}

/// Sum saveable lines into bill totals
#[wasm_bindgen]
pub fn calculate_bill_totals(bill_json: &str) -> Result<String, JsValue> {
    let request: BillRequest =
        serde_json::from_str(bill_json).map_err(|e| js_error("Invalid bill JSON", e))?;
    to_json(&bill_totals(&request))
}

/// Filter expiry keystrokes into `MM/YY` shape
#[wasm_bindgen]
pub fn sanitize_expiry(raw: &str) -> String {
    sanitize_expiry_input(raw)
}

/// Normalized ISO date for a complete `MM/YY` entry, or an empty string
#[wasm_bindgen]
pub fn normalize_expiry(raw: &str, min_year: i32, max_year: i32) -> String {
    let text = sanitize_expiry_input(raw);
    parse_expiry(&text, ExpiryYearRange::new(min_year, max_year))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Classify an ISO expiry date; `today` may be empty to use the browser clock
#[wasm_bindgen]
pub fn classify_expiry(expiry: &str, today_iso: &str, window_months: u32) -> Result<String, JsValue> {
    let expiry = parse_date(expiry).ok_or_else(|| JsValue::from_str("Invalid expiry date"))?;
    let today = if today_iso.trim().is_empty() {
        today()
    } else {
        parse_date(today_iso).ok_or_else(|| JsValue::from_str("Invalid date for today"))?
    };
    let status = NearExpiryWindow::new(window_months).classify(expiry, today);
    to_json(&status).map(|s| s.trim_matches('"').to_string())
}

/// Rank catalog products for a query typed into a line
#[wasm_bindgen]
pub fn rank_product_suggestions(query: &str, products_json: &str, limit: usize) -> Result<String, JsValue> {
    let products: Vec<StockedProduct> =
        serde_json::from_str(products_json).map_err(|e| js_error("Invalid products JSON", e))?;
    if products.is_empty() {
        web_sys::console::debug_1(&JsValue::from_str("No catalog products to rank"));
    }
    to_json(&rank_products(query, products, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_result() {
        let request: LineRequest = serde_json::from_str(
            r#"{"product_name":"Test Med","quantity":10,"rate":"5.00","mrp":"8.00","cgst_percent":6,"sgst_percent":6}"#,
        )
        .unwrap();
        let result = line_result(&request);
        assert_eq!(result.calculation.line_total, dec("56.00"));
        assert_eq!(result.margin_percent, dec("37.50"));
        assert!(!result.margin_warning);
    }

    #[test]
    fn test_bill_totals_with_discount() {
        let request: BillRequest = serde_json::from_str(
            r#"{"bill_discount_percent":10,"lines":[
                {"product_name":"Test Med","quantity":10,"rate":5,"mrp":8,"cgst_percent":6,"sgst_percent":6},
                {"product_name":"","quantity":3,"rate":5}
            ]}"#,
        )
        .unwrap();
        let totals = bill_totals(&request);
        assert_eq!(totals.subtotal, dec("50"));
        assert_eq!(totals.total_tax, dec("6"));
        assert_eq!(totals.net_total, dec("50.40"));
    }

    #[test]
    fn test_expiry_helpers() {
        assert_eq!(sanitize_expiry("13/25"), "1");
        assert_eq!(normalize_expiry("0225", 2023, 2050), "2025-02-28");
        assert_eq!(normalize_expiry("02/2", 2023, 2050), "");
        assert_eq!(
            classify_expiry("2026-02-28", "2026-01-10", 6).unwrap(),
            "near_expiry"
        );
    }

    #[test]
    fn test_oversized_rate_is_capped() {
        let request: LineRequest = serde_json::from_str(
            r#"{"product_name":"Bulk","quantity":4294967295,"rate":"1000000000000000000000","mrp":"1000000000000000000000","cgst_percent":100,"sgst_percent":100}"#,
        )
        .unwrap();
        let result = line_result(&request);
        assert_eq!(
            result.calculation.base_amount,
            round_money(Decimal::from(u32::MAX) * MAX_MONEY)
        );
        assert_eq!(result.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn test_calculate_margin() {
        let margin = calculate_margin(80.0, 100.0, 0.0, 0.0);
        assert!((margin - 20.0).abs() < 0.001);
    }
}
