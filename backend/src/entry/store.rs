//! Collaborator interfaces used by purchase entry
//!
//! The catalog and the persistence sink are traits so the entry engine can
//! run against PostgreSQL in production and in-memory fakes in tests.

use async_trait::async_trait;
use shared::{InventoryReceipt, PurchaseItemRecord, PurchaseRecord, StockMovement, StockedProduct, Vendor};
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by the data store
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Table or endpoint does not exist; needs provisioning
    #[error("{resource} is not available (missing table or endpoint)")]
    Missing { resource: String },

    /// The store refused the write (permission or constraint)
    #[error("write rejected: {reason}")]
    Rejected { reason: String },

    /// Connection or other transport failure
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Missing { .. } => "RESOURCE_MISSING",
            StoreError::Rejected { .. } => "WRITE_REJECTED",
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// What the user can do about it
    pub fn remedy(&self) -> &'static str {
        match self {
            StoreError::Missing { .. } => "The database needs provisioning; contact your administrator.",
            StoreError::Rejected { .. } => "Check the entered data and your access rights.",
            StoreError::Unavailable(_) => "Try again once the connection is restored.",
        }
    }
}

const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";
const UNDEFINED_FUNCTION: &str = "42883";
const INSUFFICIENT_PRIVILEGE: &str = "42501";

impl StoreError {
    /// Classify a database error by its SQLSTATE
    ///
    /// Class 22 (data exception, e.g. a value too long for its column) and
    /// class 23 (integrity violation) mean the store refused this data.
    pub fn from_sqlstate(code: &str, table: Option<&str>, message: &str) -> Self {
        match code {
            UNDEFINED_TABLE | UNDEFINED_COLUMN | UNDEFINED_FUNCTION => StoreError::Missing {
                resource: table.unwrap_or(message).to_string(),
            },
            INSUFFICIENT_PRIVILEGE => StoreError::Rejected {
                reason: message.to_string(),
            },
            c if c.starts_with("22") || c.starts_with("23") => StoreError::Rejected {
                reason: message.to_string(),
            },
            _ => StoreError::Unavailable(message.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string()).unwrap_or_default();
                StoreError::from_sqlstate(&code, db_err.table(), db_err.message())
            }
            sqlx::Error::RowNotFound => StoreError::Missing {
                resource: "record".to_string(),
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Product and vendor lookups
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Case-insensitive substring search across name, generic name,
    /// composition, manufacturer and HSN code
    async fn search_products(&self, query: &str, limit: usize) -> Result<Vec<StockedProduct>, StoreError>;

    async fn list_vendors(&self) -> Result<Vec<Vendor>, StoreError>;
}

/// Writes performed when a purchase is saved
#[async_trait]
pub trait PurchaseSink: Send + Sync {
    /// Persist the bill header and return its id
    async fn insert_bill(&self, header: &PurchaseRecord) -> Result<Uuid, StoreError>;

    async fn insert_items(&self, purchase_id: Uuid, items: &[PurchaseItemRecord]) -> Result<(), StoreError>;

    /// Create or extend the product's inventory and append the batch
    async fn upsert_inventory(&self, receipt: &InventoryReceipt) -> Result<(), StoreError>;

    async fn record_movement(&self, movement: &StockMovement) -> Result<(), StoreError>;
}
