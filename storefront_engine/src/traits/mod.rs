//! Capability traits that a storage backend must implement to drive the storefront engine.
//!
//! The engine APIs in [`crate::api`] are generic over these traits. The SQLite implementation lives in
//! [`crate::sqlite`], but nothing above this module knows or cares which backend is in play.
mod catalog;
mod payment_ledger;

pub use catalog::{CatalogError, CatalogManagement};
pub use payment_ledger::{PaymentLedgerDatabase, PaymentLedgerError};
