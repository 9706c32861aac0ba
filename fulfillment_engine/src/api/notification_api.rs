//! Push-notification intake: an immediate lightweight upsert, then a background full resolution.
//!
//! This runs over the concrete SQLite backend and clients because the background pass is spawned
//! onto the runtime, and only the concrete future types are known to be `Send`.

use std::sync::Arc;

use catalog_tools::CatalogApi;
use log::*;
use meli_tools::{
    data_objects::{Notification, NotificationKind},
    MarketplaceApi,
    MeliApi,
};

use crate::{
    api::ResolutionApi,
    traits::{FulfillmentStoreError, ShipmentCacheManagement},
    SqliteDatabase,
};

pub struct NotificationProcessor {
    db: SqliteDatabase,
    client: MeliApi,
    resolver: Arc<ResolutionApi<SqliteDatabase, MeliApi, CatalogApi>>,
}

impl NotificationProcessor {
    pub fn new(
        db: SqliteDatabase,
        client: MeliApi,
        resolver: Arc<ResolutionApi<SqliteDatabase, MeliApi, CatalogApi>>,
    ) -> Self {
        Self { db, client, resolver }
    }

    /// Handles one `{topic, resource}` push. Order resources cost one extra call to discover the
    /// shipment id; unrelated or non-numeric resources are ignored. The full
    /// resolution/enrichment pass runs in the background so the caller can acknowledge the push
    /// immediately.
    pub async fn process(&self, notification: &Notification) -> Result<(), FulfillmentStoreError> {
        match notification.kind() {
            NotificationKind::Ignored => {
                trace!("🔔️ Ignoring notification for resource '{}'", notification.resource);
                Ok(())
            },
            NotificationKind::Order(order_id) => {
                let shipment_id = match self.client.fetch_order(&order_id).await {
                    Ok(order) => order.shipment_id(),
                    Err(e) => {
                        warn!("🔔️ Could not resolve order {order_id} from its notification: {e}");
                        None
                    },
                };
                match shipment_id {
                    Some(shipment_id) => self.upsert_and_enqueue(&shipment_id, Some(&order_id)).await,
                    None => Ok(()),
                }
            },
            NotificationKind::Shipment(shipment_id) => self.upsert_and_enqueue(&shipment_id, None).await,
        }
    }

    async fn upsert_and_enqueue(
        &self,
        shipment_id: &str,
        order_id: Option<&str>,
    ) -> Result<(), FulfillmentStoreError> {
        self.db.upsert_shipment_stub(shipment_id, order_id).await?;
        debug!("🔔️ Shipment {shipment_id} stub upserted; scheduling a background resolution");
        let resolver = Arc::clone(&self.resolver);
        let shipment_id = shipment_id.to_string();
        tokio::spawn(async move {
            match resolver.shipment_details(&shipment_id).await {
                Ok(detail) => {
                    debug!("🔔️ Background resolution of shipment {shipment_id} done ({} items)", detail.items.len())
                },
                Err(e) => error!("🔔️ Background resolution of shipment {shipment_id} failed: {e}"),
            }
        });
        Ok(())
    }
}
