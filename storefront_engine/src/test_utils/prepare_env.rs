use std::path::Path;

use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};
use storefront_common::Cents;

use crate::{
    db_types::{NewProduct, Product, ProductCategory, ProductId},
    traits::CatalogManagement,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/flame_test_store_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Seeds the two launch perfumes and one ebook. Returns the ebook so tests can exercise the digital path.
pub async fn seed_catalog<B: CatalogManagement>(catalog: &B) -> Product {
    catalog
        .upsert_product(NewProduct {
            id: ProductId::from("velvet-bloom"),
            name: "Velvet Bloom".to_string(),
            description: "A rich floral blend with notes of rose, amber, and vanilla.".to_string(),
            price: Cents::from_dollars(89),
            category: ProductCategory::Perfume,
            image: "perfume1.jpg".to_string(),
            preview: None,
        })
        .await
        .expect("Error seeding catalog");
    catalog
        .upsert_product(NewProduct {
            id: ProductId::from("midnight-whisper"),
            name: "Midnight Whisper".to_string(),
            description: "Mysterious and sensual. Oud, sandalwood, and musk.".to_string(),
            price: Cents::from_dollars(75),
            category: ProductCategory::Perfume,
            image: "perfume2.jpg".to_string(),
            preview: None,
        })
        .await
        .expect("Error seeding catalog");
    catalog
        .upsert_product(NewProduct {
            id: ProductId::from("scent-notes"),
            name: "Scent Notes: A Beginner's Guide to Fragrance".to_string(),
            description: "Everything we know about layering and wearing perfume, in one short ebook.".to_string(),
            price: Cents::from(999),
            category: ProductCategory::Ebook,
            image: "ebook1.jpg".to_string(),
            preview: Some("Chapter one: why scent is memory...".to_string()),
        })
        .await
        .expect("Error seeding catalog")
}
