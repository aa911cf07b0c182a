use std::{env, path::PathBuf};

use log::*;
use storefront_common::{parse_boolean_flag, Secret};
use storefront_engine::helpers::random_hex;

const DEFAULT_FLAME_HOST: &str = "127.0.0.1";
const DEFAULT_FLAME_PORT: u16 = 8580;
const DEFAULT_VAULT_DIR: &str = "data/vault";
const DEFAULT_SHOP_EMAIL: &str = "orders@feminineflame.example";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret for the admin scope, compared in constant time against the `X-Admin-Token` header. An empty
    /// value disables every admin endpoint.
    pub admin_token: Secret<String>,
    /// HMAC key the card processor signs its webhook bodies with.
    pub card_webhook_secret: Secret<String>,
    /// Base URL of the card processor's hosted checkout page.
    pub checkout_base_url: String,
    /// Business shortcode used for mobile-money push prompts.
    pub mobile_shortcode: String,
    /// 32-byte hex key for the encrypted asset vault.
    pub vault_key: Secret<String>,
    pub vault_dir: PathBuf,
    /// Operator address for new-order alerts; also the contact shown in manual settlement instructions.
    pub shop_email: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FLAME_HOST.to_string(),
            port: DEFAULT_FLAME_PORT,
            database_url: String::default(),
            admin_token: Secret::new(String::default()),
            card_webhook_secret: Secret::new(String::default()),
            checkout_base_url: String::default(),
            mobile_shortcode: String::default(),
            vault_key: Secret::new(random_hex(32)),
            vault_dir: PathBuf::from(DEFAULT_VAULT_DIR),
            shop_email: DEFAULT_SHOP_EMAIL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FLAME_HOST").ok().unwrap_or_else(|| DEFAULT_FLAME_HOST.into());
        let port = env::var("FLAME_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for FLAME_PORT. {e} Using the default, {DEFAULT_FLAME_PORT}, \
                         instead."
                    );
                    DEFAULT_FLAME_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FLAME_PORT);
        let database_url = env::var("FLAME_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ FLAME_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let admin_token = Secret::new(env::var("FLAME_ADMIN_TOKEN").ok().unwrap_or_else(|| {
            warn!("🚨️ FLAME_ADMIN_TOKEN is not set. All admin endpoints are disabled for this session.");
            String::default()
        }));
        let card_webhook_secret = Secret::new(env::var("FLAME_CARD_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ FLAME_CARD_WEBHOOK_SECRET is not set. Card webhook signatures cannot be verified and every \
                 delivery will be rejected. Set it to the shared secret from your card processor."
            );
            String::default()
        }));
        let checkout_base_url = env::var("FLAME_CHECKOUT_BASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ FLAME_CHECKOUT_BASE_URL is not set. Card checkouts will fail until it is configured.");
            String::default()
        });
        let mobile_shortcode = env::var("FLAME_MOBILE_SHORTCODE").ok().unwrap_or_else(|| {
            warn!("🪛️ FLAME_MOBILE_SHORTCODE is not set. Mobile-money checkouts will fail until it is configured.");
            String::default()
        });
        let vault_key = Secret::new(env::var("FLAME_VAULT_KEY").ok().unwrap_or_else(|| {
            warn!(
                "🚨️🚨️🚨️ FLAME_VAULT_KEY is not set. I'm using a random key for this session. Assets stored now \
                 will NOT be readable after a restart. Set FLAME_VAULT_KEY to a 32-byte hex string on production. \
                 🚨️🚨️🚨️"
            );
            random_hex(32)
        }));
        let vault_dir =
            PathBuf::from(env::var("FLAME_VAULT_DIR").ok().unwrap_or_else(|| DEFAULT_VAULT_DIR.to_string()));
        let shop_email = env::var("FLAME_SHOP_EMAIL").ok().unwrap_or_else(|| {
            info!("🪛️ FLAME_SHOP_EMAIL is not set. Using the default, {DEFAULT_SHOP_EMAIL}.");
            DEFAULT_SHOP_EMAIL.to_string()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("FLAME_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("FLAME_USE_FORWARDED").ok(), false);
        Self {
            host,
            port,
            database_url,
            admin_token,
            card_webhook_secret,
            checkout_base_url,
            mobile_shortcode,
            vault_key,
            vault_dir,
            shop_email,
            use_x_forwarded_for,
            use_forwarded,
        }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the configuration that request handlers need. Kept small, and free of secrets, so it can be passed
/// around as app data without passing sensitive information through the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
