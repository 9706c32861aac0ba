use chrono::Duration;

use crate::{db_types::ShipmentDetail, traits::FulfillmentStoreError};

/// Freshness window for cached shipment details. Entries older than this are misses and trigger
/// a re-resolution; they are not deleted on read.
pub const SHIPMENT_CACHE_TTL: Duration = Duration::minutes(10);

#[allow(async_fn_in_trait)]
pub trait ShipmentCacheManagement {
    /// TTL-bounded read: returns the cached detail only when `now - fetched_at < max_age`.
    /// A stale entry is a miss, nothing more.
    async fn fetch_cached_shipment(
        &self,
        shipment_id: &str,
        max_age: Duration,
    ) -> Result<Option<ShipmentDetail>, FulfillmentStoreError>;

    /// Age-ignoring read, used where any cached snapshot beats none (ledger seeding, the
    /// pre-dispatch cancellation check).
    async fn fetch_cached_shipment_any_age(
        &self,
        shipment_id: &str,
    ) -> Result<Option<ShipmentDetail>, FulfillmentStoreError>;

    /// Insert-or-replace keyed by shipment id, in one guarded statement; `logistic_type` must
    /// already be derived from the first item. Last write wins, including the order_id attribute.
    async fn upsert_shipment_detail(&self, detail: &ShipmentDetail) -> Result<(), FulfillmentStoreError>;

    /// Minimal upsert driven by a push notification: records the shipment/order ids without
    /// clobbering an already-cached detail, and never counts as fresh for the TTL read.
    async fn upsert_shipment_stub(
        &self,
        shipment_id: &str,
        order_id: Option<&str>,
    ) -> Result<(), FulfillmentStoreError>;

    /// Age-based maintenance sweep: deletes entries whose `fetched_at` predates the retention
    /// window, unbounded by count. Returns the number of rows removed.
    async fn purge_older_than(&self, retention: Duration) -> Result<u64, FulfillmentStoreError>;
}
