//! Shared types and purchase-entry logic for the pharmacy admin dashboard
//!
//! This crate has no I/O. It is used by the backend and, through WASM, by
//! the browser dashboard.

pub mod models;
pub mod purchase;
pub mod types;
pub mod validation;

pub use models::*;
pub use purchase::*;
pub use types::*;
pub use validation::*;
