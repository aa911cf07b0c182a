//! Flame Storefront Engine
//!
//! The core logic of the storefront backend: the order ledger and its payment state machine, the cart snapshot seam,
//! payment adapters for the three settlement paths, entitlement checks for digital goods, and the encrypted asset
//! vault. It is HTTP-framework agnostic; the server crate wires it to actix-web.
//!
//! The crate is split along the same lines as the storage:
//! 1. Backend traits ([`mod@traits`]) and their SQLite implementation ([`mod@sqlite`]). You should never need to
//!    touch the database directly; go through the engine APIs instead. The record types in [`mod@db_types`] are
//!    public.
//! 2. The engine APIs ([`mod@api`]): [`OrderLedgerApi`] for the order lifecycle, [`CatalogApi`] for product reads
//!    and admin writes, and [`EntitlementApi`] for download gating.
//!
//! Lifecycle events (order created, order paid) are published through a small hook system in [`mod@events`]; the
//! order-paid event fires exactly once per order, on the winning Pending→Paid compare-and-set.
pub mod api;
pub mod cart;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod mail;
pub mod payments;
#[cfg(feature = "sqlite")]
pub mod test_utils;
pub mod traits;
pub mod vault;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use api::{CatalogApi, EntitlementApi, OrderLedgerApi};
pub use traits::{CatalogError, CatalogManagement, PaymentLedgerDatabase, PaymentLedgerError};
