use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    data_objects::{
        ItemPayload,
        OrderPayload,
        OrderSearchResults,
        ShipmentItemEntry,
        ShipmentPayload,
        VariationPayload,
    },
    MeliApiError,
    MeliConfig,
    TokenProvider,
};

/// The marketplace operations the fulfillment pipeline consumes. Kept as a trait so the resolver
/// and enrichment stages can run against canned payloads in tests.
#[allow(async_fn_in_trait)]
pub trait MarketplaceApi {
    async fn fetch_order(&self, order_id: &str) -> Result<OrderPayload, MeliApiError>;
    /// Seller-scoped search used when a direct order fetch fails transiently (permission or
    /// propagation delays). Returns the first match, or `None`.
    async fn search_order_fallback(&self, order_id: &str) -> Result<Option<OrderPayload>, MeliApiError>;
    async fn fetch_shipment(&self, shipment_id: &str) -> Result<ShipmentPayload, MeliApiError>;
    async fn fetch_shipment_items(&self, shipment_id: &str) -> Result<Vec<ShipmentItemEntry>, MeliApiError>;
    async fn fetch_item(&self, item_id: &str) -> Result<ItemPayload, MeliApiError>;
    async fn fetch_item_variation(&self, item_id: &str, variation_id: i64) -> Result<VariationPayload, MeliApiError>;
}

#[derive(Clone)]
pub struct MeliApi {
    config: MeliConfig,
    tokens: Arc<TokenProvider>,
    client: Arc<Client>,
}

impl MeliApi {
    pub fn new(config: MeliConfig) -> Result<Self, MeliApiError> {
        let tokens = Arc::new(TokenProvider::new(config.clone())?);
        let client = Client::builder().build().map_err(|e| MeliApiError::Initialization(e.to_string()))?;
        Ok(Self { config, tokens, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base)
    }

    /// Generic authenticated GET. Raises [`MeliApiError::QueryError`] on any non-2xx response;
    /// callers decide whether that is fatal or a skip.
    pub async fn rest_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        extra_headers: &[(&str, &str)],
    ) -> Result<T, MeliApiError> {
        let token = self.tokens.acquire().await?;
        let url = self.url(path);
        trace!("→ Sending marketplace query: GET {url}");
        let mut req = self.client.get(url).bearer_auth(token);
        if !params.is_empty() {
            req = req.query(params);
        }
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }
        let response = req.send().await.map_err(|e| MeliApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Marketplace query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MeliApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MeliApiError::RestResponseError(e.to_string()))?;
            Err(MeliApiError::QueryError { status, message })
        }
    }
}

impl MarketplaceApi for MeliApi {
    async fn fetch_order(&self, order_id: &str) -> Result<OrderPayload, MeliApiError> {
        debug!("Fetching order #{order_id}");
        let order = self.rest_get::<OrderPayload>(&format!("/orders/{order_id}"), &[], &[]).await?;
        info!("Fetched order #{order_id}");
        Ok(order)
    }

    async fn search_order_fallback(&self, order_id: &str) -> Result<Option<OrderPayload>, MeliApiError> {
        debug!("Searching for order #{order_id} via the seller-scoped query");
        let results = self
            .rest_get::<OrderSearchResults>(
                "/orders/search",
                &[("seller", self.config.seller_id.as_str()), ("q", order_id)],
                &[],
            )
            .await?;
        Ok(results.results.into_iter().next())
    }

    async fn fetch_shipment(&self, shipment_id: &str) -> Result<ShipmentPayload, MeliApiError> {
        debug!("Fetching shipment #{shipment_id}");
        self.rest_get::<ShipmentPayload>(&format!("/shipments/{shipment_id}"), &[], &[]).await
    }

    async fn fetch_shipment_items(&self, shipment_id: &str) -> Result<Vec<ShipmentItemEntry>, MeliApiError> {
        debug!("Fetching item entries for shipment #{shipment_id}");
        // The extended response format carries order_id and variation_id per entry.
        let entries = self
            .rest_get::<Vec<ShipmentItemEntry>>(
                &format!("/shipments/{shipment_id}/items"),
                &[],
                &[("x-format-new", "true")],
            )
            .await?;
        info!("Fetched {} item entries for shipment #{shipment_id}", entries.len());
        Ok(entries)
    }

    async fn fetch_item(&self, item_id: &str) -> Result<ItemPayload, MeliApiError> {
        trace!("Fetching item {item_id}");
        self.rest_get::<ItemPayload>(&format!("/items/{item_id}"), &[], &[]).await
    }

    async fn fetch_item_variation(&self, item_id: &str, variation_id: i64) -> Result<VariationPayload, MeliApiError> {
        trace!("Fetching variation {variation_id} of item {item_id}");
        self.rest_get::<VariationPayload>(&format!("/items/{item_id}/variations/{variation_id}"), &[], &[]).await
    }
}
