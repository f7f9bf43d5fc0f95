//! HTTP handlers for the pharmacy admin API

pub mod health;
pub mod inventory;
pub mod orders;
pub mod product;
pub mod purchase;

pub use health::health_check;
pub use inventory::get_expiry_report;
pub use orders::{submit_online_order, take_pending_orders};
pub use product::{cancel_search, list_vendors, search_products};
pub use purchase::{create_purchase, get_purchase, list_purchases, preview_purchase};
