//! Data services for the pharmacy admin backend

pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod purchase;

pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use orders::PendingOrderQueue;
pub use purchase::PurchaseService;
