//! Normalization of marketplace order payloads into canonical line items.
//!
//! [`parse_order`] is pure: it touches no network and can be unit-tested against payload fixtures.
//! Image resolution needs item/variation lookups and is therefore a separate, explicitly
//! side-effecting step ([`resolve_images`]) that the resolver invokes per item.

use log::*;
use meli_tools::{
    data_objects::{OrderLine, OrderPayload},
    helpers::picture_image_urls,
    MarketplaceApi,
};

use crate::db_types::{ImagePair, OrderItem, NO_VARIANT, SKU_UNKNOWN, UNKNOWN_CUSTOMER, UNTITLED};

#[derive(Debug, Clone)]
pub struct ParsedOrder {
    pub customer: String,
    pub items: Vec<OrderItem>,
}

/// Parses one order payload into canonical items: exactly one item per line, non-empty title,
/// quantity clamped to ≥ 0. Both legacy line shapes are accepted transparently.
pub fn parse_order(payload: &OrderPayload) -> ParsedOrder {
    let customer = payload
        .buyer_nickname()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    let items = payload.order_items.iter().map(parse_line).collect();
    ParsedOrder { customer, items }
}

fn parse_line(line: &OrderLine) -> OrderItem {
    let product = line.product();
    let title = product.title.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| UNTITLED.to_string());
    let descriptor = product
        .variation_attributes
        .iter()
        .filter_map(|attr| match (&attr.name, &attr.value_name) {
            (Some(name), Some(value)) if !value.is_empty() => Some(format!("{name}: {value}")),
            _ => None,
        })
        .collect::<Vec<String>>()
        .join(" | ");
    let variant_descriptor = if descriptor.is_empty() { NO_VARIANT.to_string() } else { descriptor };
    // SKU priority: variant-level seller sku, variant-level custom field, item-level seller sku,
    // item-level custom field, sentinel.
    let sku = product
        .seller_sku
        .clone()
        .or_else(|| product.seller_custom_field.clone())
        .or_else(|| line.seller_sku.clone())
        .or_else(|| line.seller_custom_field.clone())
        .filter(|sku| !sku.is_empty())
        .unwrap_or_else(|| SKU_UNKNOWN.to_string());
    OrderItem {
        item_id: product.id.clone().unwrap_or_default(),
        variation_id: product.variation_id,
        title,
        sku,
        variant_descriptor,
        quantity: line.quantity.max(0),
        images: vec![ImagePair::placeholder()],
        vendor_code: None,
        permalink: None,
        logistic_type: None,
    }
}

/// Resolves the image list for one item: the variation's picture ids when the line has a
/// variation, the item's own pictures otherwise. An upstream failure leaves the placeholder pair
/// in place; it never aborts the caller.
pub async fn resolve_images<C: MarketplaceApi>(client: &C, item: &mut OrderItem) {
    if item.item_id.is_empty() {
        return;
    }
    let mut images = Vec::new();
    if let Some(variation_id) = item.variation_id {
        match client.fetch_item_variation(&item.item_id, variation_id).await {
            Ok(variation) => {
                for picture_id in &variation.picture_ids {
                    let (url, thumbnail) = picture_image_urls(picture_id);
                    images.push(ImagePair { url, thumbnail });
                }
            },
            Err(e) => warn!("🖼️ Could not fetch variation {variation_id} of item {}: {e}", item.item_id),
        }
    } else {
        match client.fetch_item(&item.item_id).await {
            Ok(payload) => {
                for picture in payload.pictures {
                    if let Some(url) = picture.url {
                        let thumbnail = picture.secure_url.unwrap_or_else(|| url.clone());
                        images.push(ImagePair { url, thumbnail });
                    }
                }
            },
            Err(e) => warn!("🖼️ Could not fetch pictures of item {}: {e}", item.item_id),
        }
    }
    if !images.is_empty() {
        item.images = images;
    }
}
