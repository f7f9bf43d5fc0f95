//! HTTP handlers for product search and vendor lookup

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{LineId, Vendor};

use crate::entry::{ProductCatalog, SearchOutcome, SearchSlot};
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    /// Form line the query was typed into
    #[serde(default)]
    pub line: u32,
    /// Entry session; lines of different sessions never supersede each other
    #[serde(default = "default_session")]
    pub session: String,
}

fn default_session() -> String {
    "default".to_string()
}

/// Search products for a line, newest query per line wins
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchOutcome> {
    let slot = SearchSlot::new(query.session, LineId(query.line));
    Json(state.search.search(&slot, &query.q).await)
}

/// Abandon the pending search for a line, e.g. when the line is removed
pub async fn cancel_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> StatusCode {
    let slot = SearchSlot::new(query.session, LineId(query.line));
    state.search.cancel(&slot);
    StatusCode::NO_CONTENT
}

/// List vendors for the bill header
pub async fn list_vendors(State(state): State<AppState>) -> AppResult<Json<Vec<Vendor>>> {
    let vendors = state.catalog.list_vendors().await?;
    Ok(Json(vendors))
}
