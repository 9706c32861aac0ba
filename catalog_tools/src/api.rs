use std::{fs, path::Path, sync::Arc};

use log::*;
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::{
    data_objects::{CatalogItem, CatalogSession},
    xml::{element_text, parse_catalog_rows},
    CatalogApiError,
    CatalogConfig,
};

/// The service reports an expired session token with this string inside an otherwise well-formed
/// response body, not with an HTTP status.
pub const TOKEN_EXPIRED_SENTINEL: &str = "TOKEN Expired";

const SERVICE_NAMESPACE: &str = "http://microsoft.com/webservices/";
const AUTH_ACTION: &str = "AuthenticateUser";
const FETCH_ITEMS_ACTION: &str = "Item_funGetXMLData";

/// The catalog operation the enrichment stage consumes. A trait so tests can count sync calls
/// against a canned catalog.
#[allow(async_fn_in_trait)]
pub trait VendorCatalogApi {
    /// Performs one full catalog sync and returns every row the service knows about.
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, CatalogApiError>;
}

#[derive(Clone)]
pub struct CatalogApi {
    config: CatalogConfig,
    client: Arc<Client>,
    // Shared across clones so the session token stays single-flight for the whole process.
    session: Arc<Mutex<Option<CatalogSession>>>,
}

impl CatalogApi {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogApiError> {
        let client = Client::builder().build().map_err(|e| CatalogApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), session: Arc::new(Mutex::new(None)) })
    }

    fn load_session(&self) -> Result<CatalogSession, CatalogApiError> {
        let raw = fs::read_to_string(&self.config.auth_path)
            .map_err(|e| CatalogApiError::SessionStore(format!("credential record is missing: {e}")))?;
        serde_json::from_str(&raw)
            .map_err(|e| CatalogApiError::SessionStore(format!("credential record is corrupt: {e}")))
    }

    fn persist_session(&self, session: &CatalogSession) -> Result<(), CatalogApiError> {
        let dir = self.config.auth_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let tmp = NamedTempFile::new_in(dir).map_err(|e| CatalogApiError::SessionStore(e.to_string()))?;
        serde_json::to_writer_pretty(&tmp, session).map_err(|e| CatalogApiError::SessionStore(e.to_string()))?;
        tmp.persist(&self.config.auth_path).map_err(|e| CatalogApiError::SessionStore(e.to_string()))?;
        Ok(())
    }

    /// Raw SOAP POST; returns the response body. The header carries the credentials and session
    /// token on every call, which is just how this service works.
    async fn soap_call(&self, session: &CatalogSession, action: &str) -> Result<String, CatalogApiError> {
        let token = session.token.as_deref().unwrap_or_default();
        // "pWebWervice" is not a typo on our side; the service really spells it that way.
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Header>
    <wsBasicQueryHeader xmlns="{SERVICE_NAMESPACE}">
      <pUsername>{username}</pUsername>
      <pPassword>{password}</pPassword>
      <pCompany>{company}</pCompany>
      <pWebWervice>{webservice}</pWebWervice>
      <pAuthenticatedToken>{token}</pAuthenticatedToken>
    </wsBasicQueryHeader>
  </soap:Header>
  <soap:Body>
    <{action} xmlns="{SERVICE_NAMESPACE}" />
  </soap:Body>
</soap:Envelope>"#,
            username = session.username,
            password = session.password.reveal(),
            company = session.company_id,
            webservice = session.webservice_id,
        );
        trace!("→ Sending catalog SOAP query: {action}");
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("{SERVICE_NAMESPACE}{action}"))
            .body(body)
            .send()
            .await
            .map_err(|e| CatalogApiError::ResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| CatalogApiError::ResponseError(e.to_string()))?;
            return Err(CatalogApiError::QueryError { status, message });
        }
        response.text().await.map_err(|e| CatalogApiError::ResponseError(e.to_string()))
    }

    /// Authenticates with the stored credentials, caches the new session token and persists it
    /// beside the credentials.
    async fn authenticate(&self, session: &mut CatalogSession) -> Result<(), CatalogApiError> {
        debug!("🗂️ Authenticating against the catalog service");
        let bare = CatalogSession { token: None, ..session.clone() };
        let response = self.soap_call(&bare, AUTH_ACTION).await?;
        let token = element_text(&response, "AuthenticateUserResult")
            .ok_or_else(|| CatalogApiError::AuthFailed("no token in the authentication response".to_string()))?;
        session.token = Some(token);
        self.persist_session(session)?;
        info!("🗂️ Catalog session token renewed and persisted");
        Ok(())
    }

    async fn fetch_items_once(&self, session: &CatalogSession) -> Result<String, CatalogApiError> {
        let response = self.soap_call(session, FETCH_ITEMS_ACTION).await?;
        element_text(&response, "Item_funGetXMLDataResult")
            .ok_or_else(|| CatalogApiError::ResponseError("catalog result element is empty or missing".to_string()))
    }
}

impl VendorCatalogApi for CatalogApi {
    /// One full catalog sync. If the response signals an expired session token, the client
    /// re-authenticates and retries the sync exactly once.
    async fn fetch_all_items(&self) -> Result<Vec<CatalogItem>, CatalogApiError> {
        let mut guard = self.session.lock().await;
        let mut session = match guard.take() {
            Some(session) => session,
            None => self.load_session()?,
        };
        if session.token.is_none() {
            self.authenticate(&mut session).await?;
        }
        let mut inner = self.fetch_items_once(&session).await?;
        if inner.contains(TOKEN_EXPIRED_SENTINEL) {
            info!("🗂️ Catalog session token expired; re-authenticating and retrying the sync once");
            self.authenticate(&mut session).await?;
            inner = self.fetch_items_once(&session).await?;
        }
        let items = parse_catalog_rows(&inner)?;
        info!("🗂️ Catalog sync fetched {} rows", items.len());
        *guard = Some(session);
        Ok(items)
    }
}
