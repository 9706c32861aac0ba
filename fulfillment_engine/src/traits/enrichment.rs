use std::collections::HashMap;

use crate::{db_types::VendorCatalogEntry, traits::{FulfillmentStoreError, VendorSyncStats}};

#[allow(async_fn_in_trait)]
pub trait EnrichmentCacheManagement {
    /// The cached permalinks for the given item ids, keyed by item id.
    async fn cached_permalinks(&self, item_ids: &[String]) -> Result<HashMap<String, String>, FulfillmentStoreError>;

    /// Insert-or-update one permalink with a fresh refresh timestamp.
    async fn upsert_permalink(&self, item_id: &str, permalink: &str) -> Result<(), FulfillmentStoreError>;

    /// The locally cached vendor-catalog entries for the given stock codes, keyed by SKU.
    async fn vendor_entries_for_skus(
        &self,
        skus: &[String],
    ) -> Result<HashMap<String, VendorCatalogEntry>, FulfillmentStoreError>;

    /// Bulk insert-or-update of catalog entries after a sync.
    async fn upsert_vendor_entries(
        &self,
        entries: &[VendorCatalogEntry],
    ) -> Result<VendorSyncStats, FulfillmentStoreError>;
}
