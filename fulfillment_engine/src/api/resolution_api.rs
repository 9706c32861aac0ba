//! Shipment resolution: the cache-first pipeline that turns a shipment or order id into the full
//! canonical picking list.

use std::collections::HashMap;

use catalog_tools::VendorCatalogApi;
use chrono::Utc;
use log::*;
use meli_tools::{data_objects::OrderPayload, MarketplaceApi};

use crate::{
    api::{Enricher, ResolutionError},
    db_types::{OrderItem, ShipmentDetail, UNKNOWN_CUSTOMER},
    helpers::{status_label, STATUS_UNKNOWN},
    parser::{parse_order, resolve_images},
    traits::{FulfillmentDatabase, PickLedgerManagement, ShipmentCacheManagement, SHIPMENT_CACHE_TTL},
};

pub struct ResolutionApi<B, C, W> {
    db: B,
    client: C,
    enricher: Enricher<B, C, W>,
}

impl<B, C, W> ResolutionApi<B, C, W>
where
    B: FulfillmentDatabase,
    C: MarketplaceApi,
    W: VendorCatalogApi,
{
    pub fn new(db: B, client: C, enricher: Enricher<B, C, W>) -> Self {
        Self { db, client, enricher }
    }

    /// The full pipeline for one shipment id: cache read first; on a miss, resolve against the
    /// marketplace, enrich, persist, and keep the ledger in step with an upstream cancellation.
    /// Error-shape results are returned as-is, never enriched or cached.
    pub async fn shipment_details(&self, shipment_id: &str) -> Result<ShipmentDetail, ResolutionError> {
        if let Some(cached) = self.db.fetch_cached_shipment(shipment_id, SHIPMENT_CACHE_TTL).await? {
            debug!("🔄️ Shipment {shipment_id} served from cache (fetched {})", cached.fetched_at);
            return Ok(cached);
        }
        let mut detail = self.resolve_shipment(shipment_id).await?;
        if detail.is_error_shape() {
            return Ok(detail);
        }
        self.enricher.enrich(&mut detail.items).await?;
        detail.logistic_type = detail.derived_logistic_type();
        self.db.upsert_shipment_detail(&detail).await?;
        if detail.is_cancelled() {
            let cancelled = self.db.cancel_open_rows(shipment_id).await?;
            if cancelled > 0 {
                info!("🔄️ Shipment {shipment_id} is cancelled upstream; {cancelled} open ledger rows flipped");
            }
        }
        Ok(detail)
    }

    /// Resolves a shipment against the marketplace, without touching the cache.
    ///
    /// The item-entries listing is the one required call. Entries are processed strictly
    /// sequentially, in input order: the first entry fixes `primary_order_id` and the first
    /// successfully fetched buyer fixes the customer, so concurrency here would change results.
    /// Order payloads are memoized per pass, bounding fetches to the number of distinct order
    /// ids. A failed entry is skipped and logged; aggregating nothing yields the canonical error
    /// shape rather than an error.
    pub async fn resolve_shipment(&self, shipment_id: &str) -> Result<ShipmentDetail, ResolutionError> {
        let entries = self.client.fetch_shipment_items(shipment_id).await.map_err(ResolutionError::from)?;
        if entries.is_empty() {
            warn!("🔄️ No item entries for shipment {shipment_id}");
            return Err(ResolutionError::ShipmentNotFound(shipment_id.to_string()));
        }

        let (status_raw, logistic_type) = match self.client.fetch_shipment(shipment_id).await {
            Ok(shipment) => (shipment.status.unwrap_or_else(|| STATUS_UNKNOWN.to_string()), shipment.logistic_type),
            Err(e) => {
                warn!("🔄️ Could not fetch the status of shipment {shipment_id}: {e}");
                (STATUS_UNKNOWN.to_string(), None)
            },
        };
        let label = status_label(&status_raw);

        let mut fetched: HashMap<String, Option<OrderPayload>> = HashMap::new();
        let mut customer: Option<String> = None;
        let mut primary_order_id: Option<String> = None;
        let mut order_ids: Vec<String> = Vec::new();
        let mut items: Vec<OrderItem> = Vec::new();

        for entry in &entries {
            let Some(order_id) = entry.order_id.clone() else {
                debug!("🔄️ Skipping an item entry of shipment {shipment_id} without an order id");
                continue;
            };
            if primary_order_id.is_none() {
                primary_order_id = Some(order_id.clone());
            }
            let order = match fetched.get(&order_id) {
                Some(cached) => cached.clone(),
                None => {
                    let result = self.fetch_order_with_fallback(&order_id).await;
                    fetched.insert(order_id.clone(), result.clone());
                    result
                },
            };
            let Some(order) = order else {
                warn!("🔄️ Order {order_id} of shipment {shipment_id} is unavailable; entry skipped");
                continue;
            };
            if !order_ids.contains(&order_id) {
                order_ids.push(order_id.clone());
            }
            if customer.is_none() {
                customer = order.buyer_nickname().filter(|name| !name.is_empty());
            }
            let matched = order.order_items.iter().find(|line| {
                let product = line.product();
                product.id == entry.item_id && product.variation_id == entry.variation_id
            });
            let Some(line) = matched else {
                debug!(
                    "🔄️ Order {order_id} has no line matching item {:?} variation {:?}",
                    entry.item_id, entry.variation_id
                );
                continue;
            };
            // Parse just the matching line, wrapped as a one-line order.
            let single = OrderPayload { buyer: order.buyer.clone(), order_items: vec![line.clone()], shipping: None };
            for mut item in parse_order(&single).items {
                item.logistic_type = logistic_type.clone();
                resolve_images(&self.client, &mut item).await;
                items.push(item);
            }
        }

        if items.is_empty() {
            warn!("🔄️ No items could be aggregated for shipment {shipment_id}");
            return Ok(ShipmentDetail::error_shape(shipment_id, status_raw, label));
        }
        Ok(ShipmentDetail {
            shipment_id: shipment_id.to_string(),
            order_ids,
            primary_order_id,
            customer_name: customer.unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            marketplace_status_raw: status_raw,
            marketplace_status_label: label,
            items,
            fetched_at: Utc::now(),
            logistic_type: None,
        })
    }

    /// The direct order path: fetch one order (with the seller-scoped search as fallback), parse
    /// it whole, resolve images, enrich, and cache it under its shipment id when the payload
    /// names one.
    pub async fn order_details(&self, order_id: &str) -> Result<ShipmentDetail, ResolutionError> {
        let order = self
            .fetch_order_with_fallback(order_id)
            .await
            .ok_or_else(|| ResolutionError::OrderNotFound(order_id.to_string()))?;
        let shipment_id = order.shipment_id().unwrap_or_default();
        let (status_raw, logistic_type) = if shipment_id.is_empty() {
            (STATUS_UNKNOWN.to_string(), None)
        } else {
            match self.client.fetch_shipment(&shipment_id).await {
                Ok(shipment) => {
                    (shipment.status.unwrap_or_else(|| STATUS_UNKNOWN.to_string()), shipment.logistic_type)
                },
                Err(e) => {
                    warn!("🔄️ Could not fetch the status of shipment {shipment_id}: {e}");
                    (STATUS_UNKNOWN.to_string(), None)
                },
            }
        };
        let label = status_label(&status_raw);
        let parsed = parse_order(&order);
        let mut items = parsed.items;
        for item in items.iter_mut() {
            item.logistic_type = logistic_type.clone();
            resolve_images(&self.client, item).await;
        }
        self.enricher.enrich(&mut items).await?;
        let mut detail = ShipmentDetail {
            shipment_id: shipment_id.clone(),
            order_ids: vec![order_id.to_string()],
            primary_order_id: Some(order_id.to_string()),
            customer_name: parsed.customer,
            marketplace_status_raw: status_raw,
            marketplace_status_label: label,
            items,
            fetched_at: Utc::now(),
            logistic_type: None,
        };
        detail.logistic_type = detail.derived_logistic_type();
        if !shipment_id.is_empty() {
            self.db.upsert_shipment_detail(&detail).await?;
        }
        Ok(detail)
    }

    async fn fetch_order_with_fallback(&self, order_id: &str) -> Option<OrderPayload> {
        match self.client.fetch_order(order_id).await {
            Ok(order) => Some(order),
            Err(e) => {
                warn!("🔄️ Direct fetch of order {order_id} failed ({e}); trying the seller-scoped search");
                match self.client.search_order_fallback(order_id).await {
                    Ok(Some(order)) => Some(order),
                    Ok(None) => {
                        warn!("🔄️ Order {order_id} not found via the seller-scoped search either");
                        None
                    },
                    Err(e) => {
                        warn!("🔄️ Seller-scoped search for order {order_id} failed: {e}");
                        None
                    },
                }
            },
        }
    }
}
