pub mod mocks;

use chrono::Utc;
use fulfillment_engine::{
    db,
    db_types::{ImagePair, OrderItem, ShipmentDetail},
    traits::FulfillmentDatabase,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_url() -> String {
    let path = std::env::temp_dir().join(format!("fulfillment_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn setup() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_url();
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    let database = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db::run_migrations(database.pool()).await.expect("Error running DB migrations");
    database
}

pub async fn tear_down(mut database: SqliteDatabase) {
    let url = database.url().to_string();
    if let Err(e) = database.close().await {
        error!("Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        error!("Failed to drop database {url}: {e:?}");
    }
}

pub fn sample_item(item_id: &str, sku: &str, quantity: i64) -> OrderItem {
    OrderItem {
        item_id: item_id.to_string(),
        variation_id: None,
        title: format!("Item {item_id}"),
        sku: sku.to_string(),
        variant_descriptor: "—".to_string(),
        quantity,
        images: vec![ImagePair::placeholder()],
        vendor_code: None,
        permalink: None,
        logistic_type: None,
    }
}

pub fn sample_detail(shipment_id: &str, order_ids: &[&str], items: Vec<OrderItem>) -> ShipmentDetail {
    let logistic_type = items.first().and_then(|i| i.logistic_type.clone());
    ShipmentDetail {
        shipment_id: shipment_id.to_string(),
        order_ids: order_ids.iter().map(|o| o.to_string()).collect(),
        primary_order_id: order_ids.first().map(|o| o.to_string()),
        customer_name: "ACME_STORE".to_string(),
        marketplace_status_raw: "ready_to_ship".to_string(),
        marketplace_status_label: "Ready to ship".to_string(),
        items,
        fetched_at: Utc::now(),
        logistic_type,
    }
}
