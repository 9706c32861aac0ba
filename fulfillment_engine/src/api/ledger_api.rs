//! Pack/dispatch actions with their cancellation guards. The state transitions themselves are
//! transactional backend operations; this layer adds the upstream status checks and logging.

use log::*;
use meli_tools::MarketplaceApi;

use crate::{
    db_types::STATUS_CANCELLED,
    traits::{
        DispatchOutcome,
        FulfillmentDatabase,
        FulfillmentStoreError,
        PackOutcome,
        PickLedgerManagement,
        ShipmentCacheManagement,
    },
};

pub struct LedgerApi<B, C> {
    db: B,
    client: C,
}

impl<B, C> LedgerApi<B, C>
where
    B: FulfillmentDatabase,
    C: MarketplaceApi,
{
    pub fn new(db: B, client: C) -> Self {
        Self { db, client }
    }

    /// Marks every line of the shipment as packed. Seeds the ledger from the cached detail when
    /// this is the first action on the shipment. Repeats and invalid states come back as
    /// [`PackOutcome`] values, never as errors.
    pub async fn mark_packed(&self, shipment_id: &str, operator: &str) -> Result<PackOutcome, FulfillmentStoreError> {
        let outcome = self.db.mark_packed(shipment_id, operator).await?;
        match &outcome {
            PackOutcome::Packed { rows } => info!("🧾️ Shipment {shipment_id} packed by {operator} ({rows} lines)"),
            other => info!("🧾️ Pack action on shipment {shipment_id} rejected: {other}"),
        }
        Ok(outcome)
    }

    /// Marks every line of the shipment as dispatched. Refuses when the cached marketplace
    /// status says cancelled, re-checks the live status where the marketplace answers, and
    /// requires every line to be packed. Dispatched is terminal.
    pub async fn mark_dispatched(
        &self,
        shipment_id: &str,
        carrier: &str,
        shipment_type: &str,
        operator: &str,
    ) -> Result<DispatchOutcome, FulfillmentStoreError> {
        if let Some(cached) = self.db.fetch_cached_shipment_any_age(shipment_id).await? {
            if cached.is_cancelled() {
                info!("🧾️ Dispatch of shipment {shipment_id} refused: cached status is cancelled");
                return Ok(DispatchOutcome::CancelledUpstream);
            }
        }
        match self.client.fetch_shipment(shipment_id).await {
            Ok(shipment) if shipment.status.as_deref() == Some(STATUS_CANCELLED) => {
                info!("🧾️ Dispatch of shipment {shipment_id} refused: live status is cancelled");
                return Ok(DispatchOutcome::CancelledUpstream);
            },
            Ok(_) => {},
            // The live re-check is best-effort; the cached status already had its say.
            Err(e) => debug!("🧾️ Live status re-check for shipment {shipment_id} unavailable: {e}"),
        }
        let outcome = self.db.mark_dispatched(shipment_id, carrier, shipment_type, operator).await?;
        match &outcome {
            DispatchOutcome::Dispatched { rows } => {
                info!("🧾️ Shipment {shipment_id} dispatched via {carrier} by {operator} ({rows} lines)")
            },
            other => info!("🧾️ Dispatch action on shipment {shipment_id} rejected: {other}"),
        }
        Ok(outcome)
    }
}
