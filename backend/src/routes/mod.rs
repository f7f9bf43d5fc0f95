//! Route definitions for the pharmacy admin API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog lookups for the entry form
        .nest("/products", product_routes())
        .route("/vendors", get(handlers::list_vendors))
        // Purchase entry
        .nest("/purchases", purchase_routes())
        // Inventory browsing
        .route("/inventory/expiry", get(handlers::get_expiry_report))
        // Online order intake
        .nest("/orders", order_routes())
}

/// Product routes
fn product_routes() -> Router<AppState> {
    Router::new().route(
        "/search",
        get(handlers::search_products).delete(handlers::cancel_search),
    )
}

/// Purchase routes
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/preview", post(handlers::preview_purchase))
        .route("/:purchase_id", get(handlers::get_purchase))
}

/// Online order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/online", post(handlers::submit_online_order))
        .route("/pending", get(handlers::take_pending_orders))
}
