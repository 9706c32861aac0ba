use std::collections::HashMap;

use catalog_tools::data_objects::CatalogItem;
use chrono::Utc;
use fulfillment_engine::{
    db_types::VendorCatalogEntry,
    traits::EnrichmentCacheManagement,
    Enricher,
};
use meli_tools::data_objects::ItemPayload;

mod support;

use support::{
    mocks::{MockCatalog, MockMarketplace},
    sample_item,
    setup,
    tear_down,
};

fn cached_entry(sku: &str, vendor_code: &str) -> VendorCatalogEntry {
    VendorCatalogEntry {
        sku: sku.to_string(),
        vendor_code: Some(vendor_code.to_string()),
        external_item_id: format!("EXT-{sku}"),
        last_synced: Utc::now(),
    }
}

fn permalink_item(item_id: &str) -> ItemPayload {
    serde_json::from_value(serde_json::json!({
        "id": item_id,
        "permalink": format!("https://articulo.example.com/{item_id}"),
    }))
    .unwrap()
}

#[tokio::test]
async fn one_cache_miss_triggers_exactly_one_catalog_sync() {
    let db = setup().await;
    db.upsert_vendor_entries(&[cached_entry("SKU-1", "V-1"), cached_entry("SKU-2", "V-2")]).await.unwrap();

    let catalog = MockCatalog::new(vec![CatalogItem {
        item_id: "903".to_string(),
        item_code: "SKU-3".to_string(),
        vendor_code: Some("V-3".to_string()),
    }]);
    let enricher = Enricher::new(db.clone(), MockMarketplace::default(), catalog.clone());

    // Three SKUs: two cache hits, one miss.
    let mut items = vec![
        sample_item("MLA1", "SKU-1", 1),
        sample_item("MLA2", "SKU-2", 1),
        sample_item("MLA3", "SKU-3", 1),
    ];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(catalog.sync_count(), 1, "one miss set means one sync, not one per SKU");
    assert_eq!(items[0].vendor_code.as_deref(), Some("V-1"));
    assert_eq!(items[1].vendor_code.as_deref(), Some("V-2"));
    assert_eq!(items[2].vendor_code.as_deref(), Some("V-3"));
    // The synced entry is now cached for the next pass.
    let cached = db.vendor_entries_for_skus(&["SKU-3".to_string()]).await.unwrap();
    assert!(cached.contains_key("SKU-3"));

    tear_down(db).await;
}

#[tokio::test]
async fn all_cache_hits_mean_no_sync_at_all() {
    let db = setup().await;
    db.upsert_vendor_entries(&[cached_entry("SKU-1", "V-1")]).await.unwrap();
    let catalog = MockCatalog::default();
    let enricher = Enricher::new(db.clone(), MockMarketplace::default(), catalog.clone());

    let mut items = vec![sample_item("MLA1", "SKU-1", 1), sample_item("MLA2", "SKU-1", 4)];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(catalog.sync_count(), 0);
    assert!(items.iter().all(|i| i.vendor_code.as_deref() == Some("V-1")));

    tear_down(db).await;
}

#[tokio::test]
async fn the_unknown_sku_sentinel_is_never_looked_up() {
    let db = setup().await;
    let catalog = MockCatalog::default();
    let enricher = Enricher::new(db.clone(), MockMarketplace::default(), catalog.clone());

    let mut items = vec![sample_item("MLA1", "unknown", 1)];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(catalog.sync_count(), 0);
    assert_eq!(items[0].vendor_code, None);

    tear_down(db).await;
}

#[tokio::test]
async fn a_failed_sync_leaves_items_unenriched_but_does_not_abort() {
    let db = setup().await;
    let catalog = MockCatalog::failing();
    let enricher = Enricher::new(db.clone(), MockMarketplace::default(), catalog.clone());

    let mut items = vec![sample_item("MLA1", "SKU-1", 1)];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(catalog.sync_count(), 1);
    assert_eq!(items[0].vendor_code, None);

    tear_down(db).await;
}

#[tokio::test]
async fn permalinks_fan_out_over_distinct_items_and_write_through_the_cache() {
    let db = setup().await;
    let client = MockMarketplace::new(
        HashMap::new(),
        HashMap::new(),
        HashMap::new(),
        HashMap::from([
            ("MLA1".to_string(), permalink_item("MLA1")),
            ("MLA2".to_string(), permalink_item("MLA2")),
        ]),
    );
    let enricher = Enricher::new(db.clone(), client.clone(), MockCatalog::default());

    // MLA1 appears twice; the fan-out runs over distinct ids.
    let mut items = vec![
        sample_item("MLA1", "SKU-1", 1),
        sample_item("MLA1", "SKU-1", 2),
        sample_item("MLA2", "SKU-2", 1),
    ];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(client.item_fetches.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert!(items.iter().all(|i| i.permalink.is_some()));
    let cached = db.cached_permalinks(&["MLA1".to_string(), "MLA2".to_string()]).await.unwrap();
    assert_eq!(cached.len(), 2);

    tear_down(db).await;
}

#[tokio::test]
async fn a_failed_permalink_fetch_falls_back_to_the_cached_value() {
    let db = setup().await;
    db.upsert_permalink("MLA1", "https://articulo.example.com/cached").await.unwrap();

    // This client serves no items, so every fetch fails.
    let enricher = Enricher::new(db.clone(), MockMarketplace::default(), MockCatalog::default());
    let mut items = vec![sample_item("MLA1", "SKU-1", 1), sample_item("MLA2", "SKU-2", 1)];
    enricher.enrich(&mut items).await.unwrap();

    assert_eq!(items[0].permalink.as_deref(), Some("https://articulo.example.com/cached"));
    assert_eq!(items[1].permalink, None, "never cached and unfetchable stays unset");

    tear_down(db).await;
}
