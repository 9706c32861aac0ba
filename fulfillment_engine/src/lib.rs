//! Fulfillment Engine
//!
//! Core library of the marketplace fulfillment gateway. Given an order or shipment identifier it
//! resolves the full list of physical items to pick (merging items split across multiple
//! marketplace orders that travel as one shipment), enriches each item with permalink and
//! vendor-code metadata, and tracks pack/dispatch state with cancellation guards.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). You should never
//!    need to access the database directly; use the public API structs instead. The exception is
//!    the data types used in the database, which are defined in the `db_types` module and are
//!    public.
//! 2. The engine public API ([`mod@api`]): one struct per concern (resolution, enrichment,
//!    pack/dispatch ledger, dashboard reporting and push-notification intake). Each is generic
//!    over the backend traits, so alternate stores and mock clients slot in without changes.

mod api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod helpers;
#[cfg(feature = "sqlite")]
pub mod maintenance;
pub mod parser;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use api::NotificationProcessor;
pub use api::{DashboardApi, Enricher, LedgerApi, ResolutionApi, ResolutionError};
#[cfg(feature = "sqlite")]
pub use sqlite::{db, SqliteDatabase};
