//! # Flame storefront server
//!
//! The HTTP face of the storefront. It is responsible for:
//! * serving the public catalog and checkout endpoints,
//! * receiving payment confirmations from the card processor (signed webhook) and the mobile-money provider
//!   (unsigned callback),
//! * gating digital downloads behind entitlement checks, and
//! * exposing the token-guarded `/admin` scope for operators.
//!
//! ## Configuration
//! The server is configured via `FLAME_`-prefixed environment variables. See [config](config/index.html).
//!
//! All domain logic lives in `storefront_engine`; handlers here translate between HTTP and the engine APIs.

pub mod admin_routes;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
