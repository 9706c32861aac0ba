//! Typed payload objects for the marketplace REST API.
//!
//! The order endpoints still serve two legacy line-item shapes: the current one nests the product
//! fields in an `item` object, the older one carries them flat on the line itself. Both shapes
//! deserialize into [`OrderLine`]; [`OrderLine::product`] collapses the difference for callers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariationAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemSummary {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variation_id: Option<i64>,
    #[serde(default)]
    pub variation_attributes: Vec<VariationAttribute>,
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub seller_custom_field: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLine {
    /// Present in the nested legacy shape only.
    #[serde(default)]
    pub item: Option<ItemSummary>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub seller_custom_field: Option<String>,
    // Flat legacy shape carries the product fields on the line itself.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub variation_id: Option<i64>,
    #[serde(default)]
    pub variation_attributes: Vec<VariationAttribute>,
}

impl OrderLine {
    /// The product fields of this line, regardless of which legacy shape the payload used.
    pub fn product(&self) -> ItemSummary {
        match &self.item {
            Some(item) => item.clone(),
            None => ItemSummary {
                id: self.id.clone(),
                title: self.title.clone(),
                variation_id: self.variation_id,
                variation_attributes: self.variation_attributes.clone(),
                seller_sku: self.seller_sku.clone(),
                seller_custom_field: self.seller_custom_field.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingRef {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub buyer: Option<Buyer>,
    #[serde(default, alias = "items")]
    pub order_items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping: Option<ShippingRef>,
}

impl OrderPayload {
    pub fn buyer_nickname(&self) -> Option<String> {
        self.buyer.as_ref().and_then(|b| b.nickname.clone())
    }

    pub fn shipment_id(&self) -> Option<String> {
        self.shipping.as_ref().and_then(|s| s.id.clone())
    }
}

/// Wrapper for the seller-scoped `/orders/search` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSearchResults {
    #[serde(default)]
    pub results: Vec<OrderPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logistic_type: Option<String>,
}

/// One entry in the `/shipments/{id}/items` listing (extended response format).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentItemEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_id: Option<String>,
    #[serde(default)]
    pub variation_id: Option<i64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub secure_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariationPayload {
    #[serde(default)]
    pub picture_ids: Vec<String>,
}

/// An inbound push notification from the marketplace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    Order(String),
    Shipment(String),
    Ignored,
}

impl Notification {
    /// Classifies the notification by its resource path. Only `/orders/{numeric-id}` and
    /// `/shipments/{numeric-id}` are actionable; everything else is ignored.
    pub fn kind(&self) -> NotificationKind {
        match self.resource.trim_end_matches('/').rsplit_once('/') {
            Some(("/orders", id)) if is_numeric_id(id) => NotificationKind::Order(id.to_string()),
            Some(("/shipments", id)) if is_numeric_id(id) => NotificationKind::Shipment(id.to_string()),
            _ => NotificationKind::Ignored,
        }
    }
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Marketplace ids arrive as JSON numbers from some endpoints and strings from others; normalize
/// both to strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_and_flat_line_shapes_expose_the_same_product() {
        let nested: OrderLine = serde_json::from_str(
            r#"{"item": {"id": "MLA123", "title": "Mesa Bandeja", "variation_id": 42, "seller_sku": "SKU-1"},
                "quantity": 2, "seller_custom_field": "CF-1"}"#,
        )
        .unwrap();
        let flat: OrderLine = serde_json::from_str(
            r#"{"id": "MLA123", "title": "Mesa Bandeja", "variation_id": 42, "seller_sku": "SKU-1", "quantity": 2}"#,
        )
        .unwrap();
        let a = nested.product();
        let b = flat.product();
        assert_eq!(a.id, b.id);
        assert_eq!(a.title, b.title);
        assert_eq!(a.variation_id, Some(42));
        assert_eq!(a.seller_sku.as_deref(), Some("SKU-1"));
        assert_eq!(nested.quantity, 2);
    }

    #[test]
    fn order_items_alias_covers_the_older_key() {
        let payload: OrderPayload =
            serde_json::from_str(r#"{"buyer": {"nickname": "ACME"}, "items": [{"id": "MLA9", "quantity": 1}]}"#)
                .unwrap();
        assert_eq!(payload.order_items.len(), 1);
        assert_eq!(payload.buyer_nickname().as_deref(), Some("ACME"));
    }

    #[test]
    fn numeric_ids_normalize_to_strings() {
        let entry: ShipmentItemEntry =
            serde_json::from_str(r#"{"item_id": "MLA1703763596", "variation_id": 186044755919, "quantity": 1, "order_id": 2000011777021922}"#)
                .unwrap();
        assert_eq!(entry.order_id.as_deref(), Some("2000011777021922"));
        assert_eq!(entry.item_id.as_deref(), Some("MLA1703763596"));
    }

    #[test]
    fn notification_kinds() {
        let n = |resource: &str| Notification { topic: Some("orders_v2".to_string()), resource: resource.to_string() };
        assert_eq!(n("/orders/2000011777021922").kind(), NotificationKind::Order("2000011777021922".to_string()));
        assert_eq!(n("/shipments/44916398749").kind(), NotificationKind::Shipment("44916398749".to_string()));
        assert_eq!(n("/orders/abc").kind(), NotificationKind::Ignored);
        assert_eq!(n("/payments/123").kind(), NotificationKind::Ignored);
        assert_eq!(n("").kind(), NotificationKind::Ignored);
    }
}
