mod catalog_api;
mod entitlement_api;
mod order_ledger_api;

pub use catalog_api::CatalogApi;
pub use entitlement_api::EntitlementApi;
pub use order_ledger_api::OrderLedgerApi;
