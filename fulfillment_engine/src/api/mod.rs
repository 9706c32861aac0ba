//! The public API of the fulfillment engine: one thin struct per concern, each generic over the
//! backend traits so tests can swap in mock clients and alternate stores.

mod dashboard_api;
mod enrichment;
mod errors;
mod ledger_api;
#[cfg(feature = "sqlite")]
mod notification_api;
mod resolution_api;

pub use dashboard_api::DashboardApi;
pub use enrichment::Enricher;
pub use errors::ResolutionError;
pub use ledger_api::LedgerApi;
#[cfg(feature = "sqlite")]
pub use notification_api::NotificationProcessor;
pub use resolution_api::ResolutionApi;
