//! Purchase entry: line items, bill totals, expiry input and product matching

pub mod bill;
pub mod calculation;
pub mod expiry;
pub mod line;
pub mod matching;

pub use bill::*;
pub use calculation::*;
pub use expiry::*;
pub use line::*;
pub use matching::*;
