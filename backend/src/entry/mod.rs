//! Purchase entry engine: product search and bill save

pub mod save;
pub mod search;
pub mod store;

pub use save::{save_purchase, SaveError, StepFailure};
pub use search::{ProductSearch, SearchOutcome, SearchSlot};
pub use store::{ProductCatalog, PurchaseSink, StoreError};
