//! Hand-rolled mock clients with canned payloads and call counters, for exercising the resolver
//! and enrichment fan-out against a real SQLite store without any network.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use catalog_tools::{data_objects::CatalogItem, CatalogApiError, VendorCatalogApi};
use meli_tools::{
    data_objects::{ItemPayload, OrderPayload, ShipmentItemEntry, ShipmentPayload, VariationPayload},
    MarketplaceApi,
    MeliApiError,
};

fn not_found(what: &str) -> MeliApiError {
    MeliApiError::QueryError { status: 404, message: format!("{what} not found") }
}

#[derive(Clone, Default)]
pub struct MockMarketplace {
    orders: Arc<HashMap<String, OrderPayload>>,
    shipments: Arc<HashMap<String, ShipmentPayload>>,
    shipment_items: Arc<HashMap<String, Vec<ShipmentItemEntry>>>,
    items: Arc<HashMap<String, ItemPayload>>,
    variations: Arc<HashMap<(String, i64), VariationPayload>>,
    pub order_fetches: Arc<AtomicUsize>,
    pub item_fetches: Arc<AtomicUsize>,
}

impl MockMarketplace {
    pub fn new(
        orders: HashMap<String, OrderPayload>,
        shipments: HashMap<String, ShipmentPayload>,
        shipment_items: HashMap<String, Vec<ShipmentItemEntry>>,
        items: HashMap<String, ItemPayload>,
    ) -> Self {
        Self {
            orders: Arc::new(orders),
            shipments: Arc::new(shipments),
            shipment_items: Arc::new(shipment_items),
            items: Arc::new(items),
            variations: Arc::new(HashMap::new()),
            order_fetches: Arc::new(AtomicUsize::new(0)),
            item_fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn order_fetch_count(&self) -> usize {
        self.order_fetches.load(Ordering::SeqCst)
    }
}

impl MarketplaceApi for MockMarketplace {
    async fn fetch_order(&self, order_id: &str) -> Result<OrderPayload, MeliApiError> {
        self.order_fetches.fetch_add(1, Ordering::SeqCst);
        self.orders.get(order_id).cloned().ok_or_else(|| not_found("order"))
    }

    async fn search_order_fallback(&self, _order_id: &str) -> Result<Option<OrderPayload>, MeliApiError> {
        Ok(None)
    }

    async fn fetch_shipment(&self, shipment_id: &str) -> Result<ShipmentPayload, MeliApiError> {
        self.shipments.get(shipment_id).cloned().ok_or_else(|| not_found("shipment"))
    }

    async fn fetch_shipment_items(&self, shipment_id: &str) -> Result<Vec<ShipmentItemEntry>, MeliApiError> {
        self.shipment_items.get(shipment_id).cloned().ok_or_else(|| not_found("shipment items"))
    }

    async fn fetch_item(&self, item_id: &str) -> Result<ItemPayload, MeliApiError> {
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        self.items.get(item_id).cloned().ok_or_else(|| not_found("item"))
    }

    async fn fetch_item_variation(&self, item_id: &str, variation_id: i64) -> Result<VariationPayload, MeliApiError> {
        self.variations.get(&(item_id.to_string(), variation_id)).cloned().ok_or_else(|| not_found("variation"))
    }
}

#[derive(Clone, Default)]
pub struct MockCatalog {
    rows: Arc<Vec<CatalogItem>>,
    pub syncs: Arc<AtomicUsize>,
    fail: bool,
}

impl MockCatalog {
    pub fn new(rows: Vec<CatalogItem>) -> Self {
        Self { rows: Arc::new(rows), syncs: Arc::new(AtomicUsize::new(0)), fail: false }
    }

    pub fn failing() -> Self {
        Self { rows: Arc::new(Vec::new()), syncs: Arc::new(AtomicUsize::new(0)), fail: true }
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }
}

impl VendorCatalogApi for MockCatalog {
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, CatalogApiError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CatalogApiError::ResponseError("sync unavailable".to_string()));
        }
        Ok(self.rows.as_ref().clone())
    }
}
