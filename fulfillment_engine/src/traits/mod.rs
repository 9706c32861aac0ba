//! Interface contracts of the fulfillment store *backends*.
//!
//! The engine never talks to a database directly; it goes through these traits, which a concrete
//! backend (currently SQLite, see [`crate::SqliteDatabase`]) implements:
//!
//! * [`ShipmentCacheManagement`] defines the TTL-bounded shipment-detail cache.
//! * [`PickLedgerManagement`] defines the pick/dispatch state machine rows and their guarded
//!   transitions.
//! * [`EnrichmentCacheManagement`] defines the permalink and vendor-catalog caches backing the
//!   enrichment fan-out.
//! * [`DashboardReporting`] provides the read-only windowed dashboard counts.
//! * [`FulfillmentDatabase`] is the umbrella trait tying the above together for API consumers.

mod dashboard;
mod data_objects;
mod enrichment;
mod fulfillment_database;
mod pick_ledger;
mod shipment_cache;

pub use dashboard::DashboardReporting;
pub use data_objects::{DashboardReport, DispatchOutcome, LogisticPartition, PackOutcome, ReportWindow, VendorSyncStats};
pub use enrichment::EnrichmentCacheManagement;
pub use fulfillment_database::{FulfillmentDatabase, FulfillmentStoreError};
pub use pick_ledger::PickLedgerManagement;
pub use shipment_cache::{ShipmentCacheManagement, SHIPMENT_CACHE_TTL};
