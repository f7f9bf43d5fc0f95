//! HTTP handlers for inventory endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use shared::NearExpiryWindow;

use crate::error::AppResult;
use crate::services::inventory::ExpiryReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    /// Reference date, defaults to today
    pub today: Option<NaiveDate>,
    /// Overrides the configured near-expiry window
    pub months: Option<u32>,
}

/// Stock batches grouped by expiry status
pub async fn get_expiry_report(
    State(state): State<AppState>,
    Query(query): Query<ExpiryQuery>,
) -> AppResult<Json<ExpiryReport>> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let window = query
        .months
        .map(NearExpiryWindow::new)
        .unwrap_or_else(|| state.config.inventory.near_expiry_window());

    let report = state.inventory.expiry_report(today, window).await?;
    Ok(Json(report))
}
