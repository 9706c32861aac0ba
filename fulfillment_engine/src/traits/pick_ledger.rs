use crate::{
    db_types::{PickRecord, ShipmentDetail},
    traits::{DispatchOutcome, FulfillmentStoreError, PackOutcome},
};

#[allow(async_fn_in_trait)]
pub trait PickLedgerManagement {
    async fn ledger_rows(&self, shipment_id: &str) -> Result<Vec<PickRecord>, FulfillmentStoreError>;

    /// Seeds one pending row per line item of the detail. Idempotent under the line-identity
    /// unique constraint: re-seeding an already-seeded shipment inserts nothing.
    async fn seed_ledger(&self, detail: &ShipmentDetail) -> Result<u64, FulfillmentStoreError>;

    /// The pack transition, in one transaction: seeds the ledger from the cached detail when no
    /// rows exist yet, requires every row to be pending, then marks every row packed with
    /// timestamp and operator. Rejections come back as [`PackOutcome`] values.
    async fn mark_packed(&self, shipment_id: &str, operator: &str) -> Result<PackOutcome, FulfillmentStoreError>;

    /// The dispatch transition, in one transaction: requires every row to be packed, then marks
    /// every row dispatched with timestamp, operator, carrier and shipment type. The upstream
    /// cancellation re-check happens in the API layer before this is called.
    async fn mark_dispatched(
        &self,
        shipment_id: &str,
        carrier: &str,
        shipment_type: &str,
        operator: &str,
    ) -> Result<DispatchOutcome, FulfillmentStoreError>;

    /// Flips the still-open (pending or packed) rows of a shipment to cancelled. Dispatched rows
    /// are terminal and are never touched.
    async fn cancel_open_rows(&self, shipment_id: &str) -> Result<u64, FulfillmentStoreError>;
}
