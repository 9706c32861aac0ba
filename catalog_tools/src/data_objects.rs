use mfg_common::Secret;
use serde::{Deserialize, Serialize};

/// One row of the vendor catalog: the vendor's own item id, the seller stock code it is filed
/// under, and the vendor's ordering code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub item_id: String,
    pub item_code: String,
    pub vendor_code: Option<String>,
}

/// The persisted credential record, including the cached session token once one has been issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSession {
    pub username: String,
    pub password: Secret<String>,
    pub company_id: String,
    pub webservice_id: String,
    #[serde(default)]
    pub token: Option<String>,
}
