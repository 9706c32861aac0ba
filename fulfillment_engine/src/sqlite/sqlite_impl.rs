//! `SqliteDatabase` is a concrete implementation of a fulfillment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module.
use std::{collections::HashMap, fmt::Debug};

use chrono::Duration;
use log::*;
use sqlx::SqlitePool;

use super::db::{dashboard, enrichment, new_pool, pick_ledger, shipment_cache};
use crate::{
    db_types::{PickRecord, PickState, ShipmentDetail, VendorCatalogEntry},
    traits::{
        DashboardReport,
        DashboardReporting,
        DispatchOutcome,
        EnrichmentCacheManagement,
        FulfillmentDatabase,
        FulfillmentStoreError,
        PackOutcome,
        PickLedgerManagement,
        ReportWindow,
        ShipmentCacheManagement,
        VendorSyncStats,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, FulfillmentStoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ShipmentCacheManagement for SqliteDatabase {
    async fn fetch_cached_shipment(
        &self,
        shipment_id: &str,
        max_age: Duration,
    ) -> Result<Option<ShipmentDetail>, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        shipment_cache::fetch_fresh_shipment_detail(shipment_id, max_age, &mut conn).await
    }

    async fn fetch_cached_shipment_any_age(
        &self,
        shipment_id: &str,
    ) -> Result<Option<ShipmentDetail>, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        shipment_cache::fetch_shipment_detail(shipment_id, &mut conn).await
    }

    async fn upsert_shipment_detail(&self, detail: &ShipmentDetail) -> Result<(), FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        shipment_cache::upsert_shipment_detail(detail, &mut conn).await?;
        debug!("🗃️ Shipment {} has been cached ({} items)", detail.shipment_id, detail.items.len());
        Ok(())
    }

    async fn upsert_shipment_stub(
        &self,
        shipment_id: &str,
        order_id: Option<&str>,
    ) -> Result<(), FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        shipment_cache::upsert_shipment_stub(shipment_id, order_id, &mut conn).await
    }

    async fn purge_older_than(&self, retention: Duration) -> Result<u64, FulfillmentStoreError> {
        let mut tx = self.pool.begin().await?;
        let cache_rows = shipment_cache::purge_older_than(retention, &mut tx).await?;
        let ledger_rows = pick_ledger::purge_older_than(retention, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Retention sweep removed {cache_rows} cached shipments and {ledger_rows} ledger rows");
        Ok(cache_rows)
    }
}

impl PickLedgerManagement for SqliteDatabase {
    async fn ledger_rows(&self, shipment_id: &str) -> Result<Vec<PickRecord>, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        pick_ledger::rows_for_shipment(shipment_id, &mut conn).await
    }

    async fn seed_ledger(&self, detail: &ShipmentDetail) -> Result<u64, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        pick_ledger::seed_from_detail(detail, &mut conn).await
    }

    async fn mark_packed(&self, shipment_id: &str, operator: &str) -> Result<PackOutcome, FulfillmentStoreError> {
        let mut tx = self.pool.begin().await?;
        let mut rows = pick_ledger::rows_for_shipment(shipment_id, &mut tx).await?;
        if rows.is_empty() {
            // A scan implicitly seeds the ledger from the cached detail.
            let detail = shipment_cache::fetch_shipment_detail(shipment_id, &mut tx).await?;
            let detail = match detail.filter(|d| !d.items.is_empty()) {
                Some(detail) => detail,
                None => return Ok(PackOutcome::UnknownShipment),
            };
            let seeded = pick_ledger::seed_from_detail(&detail, &mut tx).await?;
            debug!("🧾️ Ledger for shipment {shipment_id} seeded with {seeded} rows on first pack action");
            rows = pick_ledger::rows_for_shipment(shipment_id, &mut tx).await?;
        }
        if rows.iter().any(|r| r.state == PickState::Dispatched) {
            return Ok(PackOutcome::AlreadyDispatched);
        }
        if rows.iter().any(|r| r.state == PickState::Cancelled) {
            return Ok(PackOutcome::CancelledShipment);
        }
        if rows.iter().any(|r| r.state == PickState::Packed) {
            return Ok(PackOutcome::AlreadyPacked);
        }
        let updated = pick_ledger::set_packed(shipment_id, operator, &mut tx).await?;
        tx.commit().await?;
        Ok(PackOutcome::Packed { rows: updated })
    }

    async fn mark_dispatched(
        &self,
        shipment_id: &str,
        carrier: &str,
        shipment_type: &str,
        operator: &str,
    ) -> Result<DispatchOutcome, FulfillmentStoreError> {
        let mut tx = self.pool.begin().await?;
        let rows = pick_ledger::rows_for_shipment(shipment_id, &mut tx).await?;
        if rows.is_empty() {
            return Ok(DispatchOutcome::UnknownShipment);
        }
        if rows.iter().any(|r| r.state == PickState::Dispatched) {
            return Ok(DispatchOutcome::AlreadyDispatched);
        }
        if rows.iter().any(|r| r.state == PickState::Cancelled) {
            return Ok(DispatchOutcome::CancelledUpstream);
        }
        if rows.iter().any(|r| r.state != PickState::Packed) {
            return Ok(DispatchOutcome::NotFullyPacked);
        }
        let updated = pick_ledger::set_dispatched(shipment_id, carrier, shipment_type, operator, &mut tx).await?;
        tx.commit().await?;
        Ok(DispatchOutcome::Dispatched { rows: updated })
    }

    async fn cancel_open_rows(&self, shipment_id: &str) -> Result<u64, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        pick_ledger::cancel_open_rows(shipment_id, &mut conn).await
    }
}

impl EnrichmentCacheManagement for SqliteDatabase {
    async fn cached_permalinks(&self, item_ids: &[String]) -> Result<HashMap<String, String>, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        enrichment::cached_permalinks(item_ids, &mut conn).await
    }

    async fn upsert_permalink(&self, item_id: &str, permalink: &str) -> Result<(), FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        enrichment::upsert_permalink(item_id, permalink, &mut conn).await
    }

    async fn vendor_entries_for_skus(
        &self,
        skus: &[String],
    ) -> Result<HashMap<String, VendorCatalogEntry>, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        enrichment::vendor_entries_for_skus(skus, &mut conn).await
    }

    async fn upsert_vendor_entries(
        &self,
        entries: &[VendorCatalogEntry],
    ) -> Result<VendorSyncStats, FulfillmentStoreError> {
        let mut tx = self.pool.begin().await?;
        let stats = enrichment::upsert_vendor_entries(entries, &mut tx).await?;
        tx.commit().await?;
        Ok(stats)
    }
}

impl DashboardReporting for SqliteDatabase {
    async fn dashboard_report(&self, window: &ReportWindow) -> Result<DashboardReport, FulfillmentStoreError> {
        let mut conn = self.pool.acquire().await?;
        dashboard::dashboard_report(window, &mut conn).await
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), FulfillmentStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
