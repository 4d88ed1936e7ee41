//! Ledger types, document assembly and address parsing.
//!
//! These are the building blocks shared by the importer, the store
//! abstraction and the QR reporter.

mod address;
mod builder;
mod context;
mod error;
mod totals;
mod types;

pub use address::{ParsedAddress, parse_address_display};
pub use builder::*;
pub use context::*;
pub use error::*;
pub use totals::calculate_totals;
pub use types::*;
