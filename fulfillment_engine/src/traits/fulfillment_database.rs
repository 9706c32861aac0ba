use thiserror::Error;

use crate::traits::{
    DashboardReporting,
    EnrichmentCacheManagement,
    PickLedgerManagement,
    ShipmentCacheManagement,
};

/// The umbrella contract a storage backend must satisfy to drive the fulfillment engine. The API
/// structs are generic over this trait; concrete backends live in [`crate::sqlite`].
#[allow(async_fn_in_trait)]
pub trait FulfillmentDatabase:
    Clone + ShipmentCacheManagement + PickLedgerManagement + EnrichmentCacheManagement + DashboardReporting
{
    /// The URL of the database.
    fn url(&self) -> &str;

    async fn close(&mut self) -> Result<(), FulfillmentStoreError>;
}

#[derive(Debug, Error)]
pub enum FulfillmentStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Could not encode or decode a cached payload: {0}")]
    PayloadEncoding(String),
}

impl From<sqlx::Error> for FulfillmentStoreError {
    fn from(e: sqlx::Error) -> Self {
        FulfillmentStoreError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for FulfillmentStoreError {
    fn from(e: serde_json::Error) -> Self {
        FulfillmentStoreError::PayloadEncoding(e.to_string())
    }
}
