//! HTTP-level tests running the production route tree against throwaway databases.

mod helpers;

mod admin;
mod checkout;
mod notifications;
mod storefront;
mod webhooks;
