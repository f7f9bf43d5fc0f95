//! Domain models for the pharmacy admin dashboard

mod inventory;
mod product;
mod purchase;

pub use inventory::*;
pub use product::*;
pub use purchase::*;
