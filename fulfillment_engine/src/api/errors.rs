use meli_tools::MeliApiError;
use thiserror::Error;

use crate::traits::FulfillmentStoreError;

#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The token record is missing or corrupt, or the refresh was rejected. Fatal to the calling
    /// operation; there is nothing to retry without operator intervention.
    #[error("No valid marketplace token. {0}")]
    Auth(MeliApiError),
    /// The one required call (the shipment-items listing) failed or came back empty.
    #[error("Shipment {0} has no item entries")]
    ShipmentNotFound(String),
    /// The order could not be fetched directly nor found via the seller-scoped search.
    #[error("Order {0} could not be found")]
    OrderNotFound(String),
    /// A marketplace failure outside the per-entry skip-and-log loops.
    #[error("Marketplace error: {0}")]
    Upstream(MeliApiError),
    #[error("{0}")]
    Store(#[from] FulfillmentStoreError),
}

impl From<MeliApiError> for ResolutionError {
    fn from(e: MeliApiError) -> Self {
        match e {
            MeliApiError::NoValidToken(_) | MeliApiError::TokenStore(_) => ResolutionError::Auth(e),
            other => ResolutionError::Upstream(other),
        }
    }
}
