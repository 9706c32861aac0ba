use std::path::PathBuf;

use log::*;
use mfg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct MeliConfig {
    /// Base url of the marketplace REST API, e.g. "https://api.mercadolibre.com"
    pub api_base: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// Seller id used to scope the order-search fallback query.
    pub seller_id: String,
    /// Path to the JSON file holding the current access/refresh token pair.
    pub token_path: PathBuf,
}

impl MeliConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_base = std::env::var("MFG_MELI_API_BASE").unwrap_or_else(|_| {
            warn!("MFG_MELI_API_BASE not set, using https://api.mercadolibre.com as default");
            "https://api.mercadolibre.com".to_string()
        });
        let client_id = std::env::var("MFG_MELI_CLIENT_ID").unwrap_or_else(|_| {
            warn!("MFG_MELI_CLIENT_ID not set, using (probably useless) default");
            "0000000000000000".to_string()
        });
        let client_secret = Secret::new(std::env::var("MFG_MELI_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("MFG_MELI_CLIENT_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let seller_id = std::env::var("MFG_MELI_SELLER_ID").unwrap_or_else(|_| {
            warn!("MFG_MELI_SELLER_ID not set, using (probably useless) default");
            "0".to_string()
        });
        let token_path = std::env::var("MFG_MELI_TOKEN_PATH").unwrap_or_else(|_| {
            warn!("MFG_MELI_TOKEN_PATH not set, using ml_token.json in the working directory");
            "ml_token.json".to_string()
        });
        Self { api_base, client_id, client_secret, seller_id, token_path: PathBuf::from(token_path) }
    }
}
