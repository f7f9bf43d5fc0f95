//! HTTP handlers for purchase entry endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    normalize_hsn_code, validate_hsn_code, validate_invoice_number, validate_percentage, BillTotals, ExpiryStatus,
    ExpiryYearRange, GstSplit, NearExpiryWindow, PaginatedResponse, Pagination, PaymentType,
    PurchaseBill, PurchaseDetail, StoredPurchase,
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entry::{save_purchase, StepFailure};
use crate::error::AppResult;
use crate::AppState;

fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    validate_percentage(*value).map_err(|msg| {
        let mut err = ValidationError::new("percentage");
        err.message = Some(msg.into());
        err
    })
}

/// Format check only; a blank number is reported by bill validation
fn invoice_number_format(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_invoice_number(value).map_err(|msg| {
        let mut err = ValidationError::new("invoice_number");
        err.message = Some(msg.into());
        err
    })
}

fn line_hsn_code(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_hsn_code(value).map_err(|msg| {
        let mut err = ValidationError::new("hsn_code");
        err.message = Some(msg.into());
        err
    })
}

/// Purchase bill as submitted by the entry form
#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    pub vendor_id: Option<Uuid>,
    #[validate(custom = "invoice_number_format")]
    #[serde(default)]
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_type: PaymentType,
    pub payment_due_date: Option<NaiveDate>,
    #[validate(custom = "percentage")]
    #[serde(default)]
    pub bill_discount_percent: Decimal,
    #[validate(length(max = 200, message = "A bill can have at most 200 lines"))]
    #[serde(default)]
    pub lines: Vec<PurchaseLineRequest>,
}

/// One line of the entry form
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PurchaseLineRequest {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub batch_number: String,
    /// Expiry as typed, `MM/YY`
    pub expiry: String,
    pub quantity: u32,
    pub free_quantity: u32,
    pub rate: Decimal,
    pub mrp: Decimal,
    pub discount_percent: Decimal,
    pub scheme_percent: Decimal,
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    #[validate(custom = "line_hsn_code")]
    pub hsn_code: Option<String>,
    pub pack_units: Option<String>,
}

impl PurchaseRequest {
    /// Check the payload shape; bill rules are checked separately
    pub fn check(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.lines.iter().try_for_each(|line| line.validate())
    }

    /// Build the bill the same way the form fills it in
    pub fn into_bill(self, years: ExpiryYearRange) -> PurchaseBill {
        let mut bill = PurchaseBill::new();
        bill.vendor_id = self.vendor_id;
        bill.invoice_number = self.invoice_number;
        bill.invoice_date = self.invoice_date;
        bill.payment_type = self.payment_type;
        bill.payment_due_date = self.payment_due_date;
        bill.set_bill_discount_percent(self.bill_discount_percent);

        let first = bill.lines()[0].id();
        for (index, input) in self.lines.into_iter().enumerate() {
            let id = if index == 0 { first } else { bill.add_line() };
            let Some(line) = bill.line_mut(id) else {
                continue;
            };
            line.product_ref = input.product_id;
            line.product_name = input.product_name;
            line.batch_number = input.batch_number;
            line.input_expiry(&input.expiry, years);
            line.set_quantity(input.quantity);
            line.set_free_quantity(input.free_quantity);
            line.set_rate(input.rate);
            line.set_mrp(input.mrp);
            line.set_discount_percent(input.discount_percent);
            line.set_scheme_percent(input.scheme_percent);
            line.set_gst_split(GstSplit::new(input.cgst_percent, input.sgst_percent));
            line.hsn_code = input
                .hsn_code
                .map(|h| normalize_hsn_code(&h))
                .filter(|h| !h.is_empty());
            line.pack_units = input.pack_units.filter(|p| !p.trim().is_empty());
        }
        bill
    }
}

/// Derived figures for one line
#[derive(Debug, Serialize)]
pub struct LinePreview {
    /// 1-based position in the form
    pub line: usize,
    pub line_total: Decimal,
    pub margin_percent: Decimal,
    pub margin_warning: bool,
    pub expiry_date: Option<NaiveDate>,
    pub expiry_status: Option<ExpiryStatus>,
    pub saveable: bool,
}

/// Totals and per-line figures for a bill being entered
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub totals: BillTotals,
    pub lines: Vec<LinePreview>,
    /// First rule preventing a save, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking_error: Option<String>,
}

fn preview(bill: &PurchaseBill, today: NaiveDate, window: NearExpiryWindow) -> PreviewResponse {
    let bill_discount = bill.bill_discount_percent();
    let lines = bill
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| LinePreview {
            line: index + 1,
            line_total: line.calculation().rounded().line_total,
            margin_percent: shared::round_money(line.margin_percent(bill_discount)),
            margin_warning: line.has_margin_warning(),
            expiry_date: line.expiry_date(),
            expiry_status: line.expiry_date().map(|date| window.classify(date, today)),
            saveable: line.is_valid_for_save(),
        })
        .collect();

    PreviewResponse {
        totals: bill.totals().rounded(),
        lines,
        blocking_error: bill.validate_for_save().err().map(|e| e.to_string()),
    }
}

/// Recalculate a bill without saving it
pub async fn preview_purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> AppResult<Json<PreviewResponse>> {
    request.check()?;
    let purchase = &state.config.purchase;
    let bill = request.into_bill(purchase.expiry_years());
    let today = Local::now().date_naive();
    Ok(Json(preview(&bill, today, purchase.near_expiry_window())))
}

/// Response to a save that stored the bill header
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub bill_id: Uuid,
    pub complete: bool,
    pub message: String,
    pub unlinked_lines: usize,
    pub failures: Vec<StepFailure>,
}

/// Save a purchase bill
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> AppResult<Json<SaveResponse>> {
    request.check()?;
    let mut bill = request.into_bill(state.config.purchase.expiry_years());

    let outcome = save_purchase(&mut bill, state.purchases.as_ref()).await?;

    Ok(Json(SaveResponse {
        bill_id: outcome.purchase_id,
        complete: outcome.is_complete(),
        message: outcome.notification(),
        unlinked_lines: outcome.unlinked_lines,
        failures: outcome.failures,
    }))
}

/// List saved purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<StoredPurchase>>> {
    let purchases = state.purchases.list_purchases(pagination).await?;
    Ok(Json(purchases))
}

/// Saved purchase together with the form rebuilt from it
#[derive(Debug, Serialize)]
pub struct PurchaseFormResponse {
    #[serde(flatten)]
    pub detail: PurchaseDetail,
    pub form: PurchaseBill,
}

/// Get a purchase for editing
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseFormResponse>> {
    let detail = state.purchases.get_purchase(purchase_id).await?;
    let form = PurchaseBill::from_saved(&detail.purchase.record, &detail.items);
    Ok(Json(PurchaseFormResponse { detail, form }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn request(lines: Vec<PurchaseLineRequest>) -> PurchaseRequest {
        PurchaseRequest {
            vendor_id: Some(Uuid::new_v4()),
            invoice_number: "INV-42".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 10, 19),
            payment_type: PaymentType::Cash,
            payment_due_date: None,
            bill_discount_percent: Decimal::ZERO,
            lines,
        }
    }

    fn line(name: &str, quantity: u32, rate: &str, mrp: &str) -> PurchaseLineRequest {
        PurchaseLineRequest {
            product_name: name.to_string(),
            quantity,
            rate: dec(rate),
            mrp: dec(mrp),
            cgst_percent: dec("6"),
            sgst_percent: dec("6"),
            ..Default::default()
        }
    }

    #[test]
    fn test_request_builds_bill_lines_in_order() {
        let bill = request(vec![line("A", 10, "5", "8"), line("B", 2, "3", "4")])
            .into_bill(ExpiryYearRange::default());
        assert_eq!(bill.lines().len(), 2);
        assert_eq!(bill.lines()[0].product_name, "A");
        assert_eq!(bill.lines()[0].line_total(), dec("56"));
        assert_eq!(bill.lines()[1].product_name, "B");
    }

    #[test]
    fn test_request_without_lines_keeps_blank_line() {
        let bill = request(Vec::new()).into_bill(ExpiryYearRange::default());
        assert_eq!(bill.lines().len(), 1);
        assert!(!bill.lines()[0].is_valid_for_save());
    }

    #[test]
    fn test_expiry_text_is_normalized() {
        let mut input = line("A", 1, "5", "8");
        input.expiry = "0227".to_string();
        let bill = request(vec![input]).into_bill(ExpiryYearRange::default());
        assert_eq!(bill.lines()[0].expiry_date(), NaiveDate::from_ymd_opt(2027, 2, 28));
    }

    #[test]
    fn test_preview_reports_blocking_error_and_margin() {
        let mut req = request(vec![line("A", 10, "10", "8")]);
        req.vendor_id = None;
        let bill = req.into_bill(ExpiryYearRange::default());
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let result = preview(&bill, today, NearExpiryWindow::PURCHASE_ENTRY);

        assert_eq!(result.blocking_error.as_deref(), Some("Please select a vendor"));
        assert!(result.lines[0].margin_warning);
        assert_eq!(result.lines[0].margin_percent, Decimal::ZERO);
    }

    #[test]
    fn test_preview_flags_near_expiry() {
        let mut input = line("A", 1, "5", "8");
        input.expiry = "01/27".to_string();
        let bill = request(vec![input]).into_bill(ExpiryYearRange::default());
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let result = preview(&bill, today, NearExpiryWindow::PURCHASE_ENTRY);

        assert_eq!(result.lines[0].expiry_status, Some(ExpiryStatus::NearExpiry));
        assert!(result.blocking_error.is_none());
    }

    #[test]
    fn test_invalid_discount_fails_validation() {
        let mut req = request(Vec::new());
        req.bill_discount_percent = dec("150");
        assert!(req.check().is_err());
    }

    #[test]
    fn test_line_hsn_code_is_checked() {
        let mut bad = line("A", 1, "5", "8");
        bad.hsn_code = Some("30A4".to_string());
        assert!(request(vec![bad]).check().is_err());

        let mut blank = line("A", 1, "5", "8");
        blank.hsn_code = Some(String::new());
        assert!(request(vec![blank]).check().is_ok());
    }

    #[test]
    fn test_dotted_hsn_code_is_stored_as_digits() {
        let mut dotted = line("A", 1, "5", "8");
        dotted.hsn_code = Some("3004.90.99".to_string());
        let req = request(vec![dotted]);
        assert!(req.check().is_ok());

        let bill = req.into_bill(ExpiryYearRange::default());
        assert_eq!(bill.lines()[0].hsn_code.as_deref(), Some("30049099"));
    }

    #[test]
    fn test_invoice_number_format_and_line_count() {
        let mut req = request(Vec::new());
        req.invoice_number = "   ".to_string();
        assert!(req.check().is_ok());

        let too_many: Vec<_> = (0..201).map(|_| line("A", 1, "5", "8")).collect();
        let err = request(too_many).check().unwrap_err();
        assert!(err.field_errors().contains_key("lines"));
    }
}
