//! Concurrent metadata enrichment of resolved items.
//!
//! Both stages fan out over *distinct* keys rather than per item instance, so a shipment with the
//! same SKU on five lines costs one lookup, and both join before returning.

use std::sync::Arc;

use catalog_tools::VendorCatalogApi;
use chrono::Utc;
use futures::future::join_all;
use log::*;
use meli_tools::MarketplaceApi;
use tokio::sync::Semaphore;

use crate::{
    db_types::{OrderItem, VendorCatalogEntry, SKU_UNKNOWN},
    traits::{EnrichmentCacheManagement, FulfillmentStoreError},
};

/// Upper bound on in-flight permalink fetches per enrichment pass.
const MAX_CONCURRENT_FETCHES: usize = 8;

pub struct Enricher<B, C, W> {
    db: B,
    client: C,
    catalog: W,
}

impl<B, C, W> Enricher<B, C, W>
where
    B: EnrichmentCacheManagement,
    C: MarketplaceApi,
    W: VendorCatalogApi,
{
    pub fn new(db: B, client: C, catalog: W) -> Self {
        Self { db, client, catalog }
    }

    /// Attaches permalinks and vendor codes to the items in place. Individual upstream failures
    /// are logged and skipped; only store failures abort the pass.
    pub async fn enrich(&self, items: &mut [OrderItem]) -> Result<(), FulfillmentStoreError> {
        self.attach_permalinks(items).await?;
        self.attach_vendor_codes(items).await?;
        Ok(())
    }

    /// One concurrent fetch per distinct item id, bounded by a semaphore and joined before
    /// assignment. Fresh permalinks are written through to the cache; a failed fetch falls back
    /// to whatever the cache already had for that item.
    async fn attach_permalinks(&self, items: &mut [OrderItem]) -> Result<(), FulfillmentStoreError> {
        let item_ids = distinct(items.iter().map(|i| i.item_id.as_str()));
        if item_ids.is_empty() {
            return Ok(());
        }
        let mut permalinks = self.db.cached_permalinks(&item_ids).await?;
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES));
        let fetches = item_ids
            .iter()
            .map(|item_id| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire().await.ok();
                    match self.client.fetch_item(item_id).await {
                        Ok(payload) => (item_id.clone(), payload.permalink),
                        Err(e) => {
                            warn!("🔗️ Could not fetch permalink for item {item_id}: {e}");
                            (item_id.clone(), None)
                        },
                    }
                }
            })
            .collect::<Vec<_>>();
        let results = join_all(fetches).await;
        for (item_id, permalink) in results {
            if let Some(permalink) = permalink {
                self.db.upsert_permalink(&item_id, &permalink).await?;
                permalinks.insert(item_id, permalink);
            }
        }
        for item in items.iter_mut() {
            if let Some(permalink) = permalinks.get(&item.item_id) {
                item.permalink = Some(permalink.clone());
            }
        }
        Ok(())
    }

    /// Cache-first vendor-code lookup. All missing SKUs are collected into one set and resolved
    /// with a single full catalog sync; SKUs the catalog does not know stay unenriched.
    async fn attach_vendor_codes(&self, items: &mut [OrderItem]) -> Result<(), FulfillmentStoreError> {
        let skus = distinct(items.iter().map(|i| i.sku.as_str()).filter(|sku| *sku != SKU_UNKNOWN));
        if skus.is_empty() {
            return Ok(());
        }
        let mut known = self.db.vendor_entries_for_skus(&skus).await?;
        let missing: Vec<String> = skus.iter().filter(|sku| !known.contains_key(*sku)).cloned().collect();
        if !missing.is_empty() {
            debug!("🗂️ {} SKUs missing from the local catalog cache; running one catalog sync", missing.len());
            match self.catalog.fetch_all_items().await {
                Ok(rows) => {
                    let now = Utc::now();
                    let fresh: Vec<VendorCatalogEntry> = rows
                        .into_iter()
                        .filter(|row| missing.contains(&row.item_code))
                        .map(|row| VendorCatalogEntry {
                            sku: row.item_code,
                            vendor_code: row.vendor_code,
                            external_item_id: row.item_id,
                            last_synced: now,
                        })
                        .collect();
                    if !fresh.is_empty() {
                        let stats = self.db.upsert_vendor_entries(&fresh).await?;
                        info!("🗂️ Catalog sync cached {} new and {} refreshed entries", stats.inserted, stats.updated);
                    }
                    for entry in fresh {
                        known.insert(entry.sku.clone(), entry);
                    }
                },
                Err(e) => warn!("🗂️ Catalog sync failed; vendor codes left unset for this pass: {e}"),
            }
        }
        for item in items.iter_mut() {
            if let Some(entry) = known.get(&item.sku) {
                item.vendor_code = entry.vendor_code.clone();
            }
        }
        Ok(())
    }
}

/// First-seen-order distinct, dropping empty keys.
fn distinct<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for key in keys {
        if !key.is_empty() && !seen.iter().any(|s| s == key) {
            seen.push(key.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod test {
    use super::distinct;

    #[test]
    fn distinct_preserves_first_seen_order() {
        let keys = ["b", "a", "b", "", "c", "a"];
        assert_eq!(distinct(keys.into_iter()), vec!["b", "a", "c"]);
    }
}
