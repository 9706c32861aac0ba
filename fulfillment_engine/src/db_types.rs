use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use meli_tools::helpers::PLACEHOLDER_IMAGE;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Sentinel stock code for lines where the whole SKU priority chain came up empty.
pub const SKU_UNKNOWN: &str = "unknown";
/// Sentinel variant descriptor for items without variation attributes.
pub const NO_VARIANT: &str = "—";
/// Sentinel title for lines without one.
pub const UNTITLED: &str = "Untitled";
/// Customer name carried by the canonical error shape.
pub const ERROR_CUSTOMER: &str = "Error";
/// Customer name used when no buyer could be resolved.
pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";
/// Raw marketplace status meaning "the shipment was cancelled upstream".
pub const STATUS_CANCELLED: &str = "cancelled";
/// The logistic type of marketplace-fulfilled shipments; the warehouse never handles these.
pub const LOGISTIC_TYPE_FULFILLMENT: &str = "fulfillment";

//--------------------------------------      ImagePair       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub url: String,
    pub thumbnail: String,
}

impl ImagePair {
    pub fn placeholder() -> Self {
        Self { url: PLACEHOLDER_IMAGE.to_string(), thumbnail: PLACEHOLDER_IMAGE.to_string() }
    }
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
/// One canonical line item of a resolved shipment. Serialized as JSON into the shipment cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub variation_id: Option<i64>,
    pub title: String,
    pub sku: String,
    /// `name: value` pairs of the variation attributes, or [`NO_VARIANT`].
    pub variant_descriptor: String,
    pub quantity: i64,
    /// Never empty; holds a placeholder pair until image resolution runs (and after it, if the
    /// item resolved no pictures).
    pub images: Vec<ImagePair>,
    #[serde(default)]
    pub vendor_code: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    /// Copied from the parent shipment during resolution.
    #[serde(default)]
    pub logistic_type: Option<String>,
}

//--------------------------------------    ShipmentDetail    ---------------------------------------------------------
/// The resolved, enriched view of one physical shipment. One per shipment id; overwritten
/// wholesale on each re-resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentDetail {
    pub shipment_id: String,
    /// Every order id that contributed items, in first-seen order, unique.
    pub order_ids: Vec<String>,
    /// The order id of the first item entry seen in this resolution pass.
    pub primary_order_id: Option<String>,
    pub customer_name: String,
    pub marketplace_status_raw: String,
    pub marketplace_status_label: String,
    pub items: Vec<OrderItem>,
    pub fetched_at: DateTime<Utc>,
    /// Derived from the first item at upsert time.
    pub logistic_type: Option<String>,
}

impl ShipmentDetail {
    /// The canonical error shape: customer "Error", no items. Returned (not raised) when a
    /// resolution pass aggregates nothing.
    pub fn error_shape(shipment_id: &str, status_raw: String, status_label: String) -> Self {
        Self {
            shipment_id: shipment_id.to_string(),
            order_ids: Vec::new(),
            primary_order_id: None,
            customer_name: ERROR_CUSTOMER.to_string(),
            marketplace_status_raw: status_raw,
            marketplace_status_label: status_label,
            items: Vec::new(),
            fetched_at: Utc::now(),
            logistic_type: None,
        }
    }

    pub fn is_error_shape(&self) -> bool {
        self.customer_name == ERROR_CUSTOMER && self.items.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.marketplace_status_raw == STATUS_CANCELLED
    }

    pub fn derived_logistic_type(&self) -> Option<String> {
        self.items.first().and_then(|item| item.logistic_type.clone())
    }
}

//--------------------------------------      PickState       ---------------------------------------------------------
/// Warehouse state of a ledger line. The only forward path is pending → packed → dispatched;
/// cancelled is reachable from pending or packed, and dispatched is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type)]
#[sqlx(rename_all = "lowercase")]
pub enum PickState {
    Pending,
    Packed,
    Dispatched,
    Cancelled,
}

impl Display for PickState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PickState::Pending => write!(f, "pending"),
            PickState::Packed => write!(f, "packed"),
            PickState::Dispatched => write!(f, "dispatched"),
            PickState::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid pick state: {0}")]
pub struct ConversionError(String);

impl FromStr for PickState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "packed" => Ok(Self::Packed),
            "dispatched" => Ok(Self::Dispatched),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid pick state: {s}"))),
        }
    }
}

impl From<String> for PickState {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid pick state: {value}. But this conversion cannot fail. Defaulting to Pending");
            PickState::Pending
        })
    }
}

//--------------------------------------      PickRecord      ---------------------------------------------------------
/// One ledger row per shipment line. Created lazily on the first pack action, mutated in place
/// afterwards, and only ever deleted by the retention sweep.
#[derive(Debug, Clone, FromRow)]
pub struct PickRecord {
    pub id: i64,
    pub shipment_id: String,
    pub order_id: String,
    pub item_id: String,
    /// 0 for lines without a variation, so the line-identity constraint stays total.
    pub variation_id: i64,
    pub title: String,
    pub quantity: i64,
    pub state: PickState,
    pub created_at: DateTime<Utc>,
    pub packed_at: Option<DateTime<Utc>>,
    pub packed_by: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub dispatched_by: Option<String>,
    pub carrier: Option<String>,
    pub shipment_type: Option<String>,
}

//--------------------------------------  VendorCatalogEntry  ---------------------------------------------------------
/// One locally cached vendor-catalog row, keyed by seller stock code.
#[derive(Debug, Clone, FromRow)]
pub struct VendorCatalogEntry {
    pub sku: String,
    pub vendor_code: Option<String>,
    pub external_item_id: String,
    pub last_synced: DateTime<Utc>,
}

//--------------------------------------    PermalinkEntry    ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct PermalinkEntry {
    pub item_id: String,
    pub permalink: String,
    pub refreshed_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pick_state_round_trips() {
        for state in [PickState::Pending, PickState::Packed, PickState::Dispatched, PickState::Cancelled] {
            assert_eq!(state.to_string().parse::<PickState>().unwrap(), state);
        }
        assert!("armado".parse::<PickState>().is_err());
    }

    #[test]
    fn error_shape_is_recognised() {
        let detail = ShipmentDetail::error_shape("44916398749", "cancelled".to_string(), "Cancelled".to_string());
        assert!(detail.is_error_shape());
        assert!(detail.is_cancelled());
        assert_eq!(detail.derived_logistic_type(), None);
    }
}
