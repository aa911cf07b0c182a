use storefront_common::Secret;
use storefront_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path, seed_catalog},
    vault::AssetVault,
    SqliteDatabase,
};

use crate::config::ServerConfig;

pub struct TestShop {
    pub config: ServerConfig,
    pub db: SqliteDatabase,
    pub vault: AssetVault,
    _vault_dir: tempfile::TempDir,
}

pub const TEST_ADMIN_TOKEN: &str = "backstage-pass";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

/// Stands up a migrated, seeded database and a config matching it. Each call is fully isolated.
pub async fn setup() -> TestShop {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    seed_catalog(&db).await;
    let vault_dir = tempfile::tempdir().expect("Error creating vault dir");
    let mut config = ServerConfig::default();
    config.database_url = url;
    config.admin_token = Secret::new(TEST_ADMIN_TOKEN.to_string());
    config.card_webhook_secret = Secret::new(TEST_WEBHOOK_SECRET.to_string());
    config.checkout_base_url = "https://pay.example.com".to_string();
    config.mobile_shortcode = "600123".to_string();
    config.vault_dir = vault_dir.path().to_path_buf();
    let vault = AssetVault::new(&config.vault_key, config.vault_dir.clone()).expect("Error opening vault");
    TestShop { config, db, vault, _vault_dir: vault_dir }
}

/// Initializes the full production route tree for a [`TestShop`]. A macro because the app type cannot be named.
macro_rules! test_app {
    ($shop:expr) => {{
        actix_web::test::init_service(actix_web::App::new().configure($crate::server::configure_api(
            &$shop.config,
            $shop.db.clone(),
            ::storefront_engine::events::EventProducers::default(),
            $shop.vault.clone(),
        )))
        .await
    }};
}
pub(crate) use test_app;

pub fn checkout_body(country: &str, email: Option<&str>, lines: &[(&str, i64)]) -> serde_json::Value {
    let cart: Vec<serde_json::Value> =
        lines.iter().map(|(id, qty)| serde_json::json!({"product_id": id, "quantity": qty})).collect();
    serde_json::json!({
        "name": "Wanjiru Achieng",
        "phone": "+254700111222",
        "address": "4 Peponi Rd, Nairobi",
        "country": country,
        "email": email,
        "cart": cart,
    })
}
