//! Client crate for the MercadoLibre-style marketplace REST API.
//!
//! The crate owns the OAuth2 access-token lifecycle (single-flight refresh, atomic persistence of
//! the token record) and exposes typed, authenticated access to the order, shipment and item
//! endpoints. Payloads are validated into explicit record types at this boundary; nothing
//! downstream ever touches raw JSON.

mod api;
mod config;
mod error;
mod token;

pub mod data_objects;
pub mod helpers;

pub use api::{MarketplaceApi, MeliApi};
pub use config::MeliConfig;
pub use error::MeliApiError;
pub use token::{AccessToken, TokenProvider, REFRESH_SAFETY_MARGIN};
