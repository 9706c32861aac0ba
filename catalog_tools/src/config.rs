use std::path::PathBuf;

use log::*;

#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// Url of the SOAP query endpoint.
    pub endpoint: String,
    /// Path to the JSON file holding the account credentials and the cached session token.
    pub auth_path: PathBuf,
}

impl CatalogConfig {
    pub fn new_from_env_or_default() -> Self {
        let endpoint = std::env::var("MFG_CATALOG_ENDPOINT").unwrap_or_else(|_| {
            warn!("MFG_CATALOG_ENDPOINT not set, using (probably useless) default");
            "https://ws.example.com/app_webservices/wsBasicQuery.asmx".to_string()
        });
        let auth_path = std::env::var("MFG_CATALOG_AUTH_PATH").unwrap_or_else(|_| {
            warn!("MFG_CATALOG_AUTH_PATH not set, using ws_auth.json in the working directory");
            "ws_auth.json".to_string()
        });
        Self { endpoint, auth_path: PathBuf::from(auth_path) }
    }
}
