//! Helpers for integration and endpoint tests: throwaway databases and a seeded catalog.
pub mod prepare_env;
