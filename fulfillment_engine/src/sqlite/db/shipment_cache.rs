use chrono::{DateTime, Duration, Utc};
use log::trace;
use sqlx::{FromRow, SqliteConnection};

use crate::{db_types::ShipmentDetail, traits::FulfillmentStoreError};

/// Raw row of the `shipment_cache` table; item and order-id payloads are JSON columns.
#[derive(Debug, Clone, FromRow)]
struct ShipmentCacheRow {
    shipment_id: String,
    #[allow(dead_code)]
    order_id: Option<String>,
    primary_order_id: Option<String>,
    order_ids: String,
    customer: String,
    status_raw: String,
    status_label: String,
    items: String,
    fetched_at: DateTime<Utc>,
    logistic_type: Option<String>,
}

impl TryFrom<ShipmentCacheRow> for ShipmentDetail {
    type Error = FulfillmentStoreError;

    fn try_from(row: ShipmentCacheRow) -> Result<Self, Self::Error> {
        Ok(ShipmentDetail {
            shipment_id: row.shipment_id,
            order_ids: serde_json::from_str(&row.order_ids)?,
            primary_order_id: row.primary_order_id,
            customer_name: row.customer,
            marketplace_status_raw: row.status_raw,
            marketplace_status_label: row.status_label,
            items: serde_json::from_str(&row.items)?,
            fetched_at: row.fetched_at,
            logistic_type: row.logistic_type,
        })
    }
}

pub async fn fetch_shipment_detail(
    shipment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ShipmentDetail>, FulfillmentStoreError> {
    let row: Option<ShipmentCacheRow> =
        sqlx::query_as("SELECT * FROM shipment_cache WHERE shipment_id = $1").bind(shipment_id).fetch_optional(conn).await?;
    row.map(ShipmentDetail::try_from).transpose()
}

/// TTL-aware read: a row older than `max_age` is a miss. The row itself stays put; only the
/// retention sweep deletes.
pub async fn fetch_fresh_shipment_detail(
    shipment_id: &str,
    max_age: Duration,
    conn: &mut SqliteConnection,
) -> Result<Option<ShipmentDetail>, FulfillmentStoreError> {
    let detail = fetch_shipment_detail(shipment_id, conn).await?;
    Ok(detail.filter(|d| Utc::now() - d.fetched_at < max_age))
}

/// Insert-or-replace keyed by shipment id. The unique key makes concurrent resolutions of the
/// same shipment collapse into last-write-wins instead of duplicating rows.
pub async fn upsert_shipment_detail(
    detail: &ShipmentDetail,
    conn: &mut SqliteConnection,
) -> Result<(), FulfillmentStoreError> {
    let items = serde_json::to_string(&detail.items)?;
    let order_ids = serde_json::to_string(&detail.order_ids)?;
    let last_order_id = detail.order_ids.last().cloned().or_else(|| detail.primary_order_id.clone());
    sqlx::query(
        r#"
        INSERT INTO shipment_cache (
            shipment_id, order_id, primary_order_id, order_ids, customer,
            status_raw, status_label, items, fetched_at, logistic_type
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (shipment_id) DO UPDATE SET
            order_id = excluded.order_id,
            primary_order_id = excluded.primary_order_id,
            order_ids = excluded.order_ids,
            customer = excluded.customer,
            status_raw = excluded.status_raw,
            status_label = excluded.status_label,
            items = excluded.items,
            fetched_at = excluded.fetched_at,
            logistic_type = excluded.logistic_type
        "#,
    )
    .bind(&detail.shipment_id)
    .bind(last_order_id)
    .bind(&detail.primary_order_id)
    .bind(order_ids)
    .bind(&detail.customer_name)
    .bind(&detail.marketplace_status_raw)
    .bind(&detail.marketplace_status_label)
    .bind(items)
    .bind(detail.fetched_at)
    .bind(&detail.logistic_type)
    .execute(conn)
    .await?;
    trace!("🗃️ Cached shipment detail for {}", detail.shipment_id);
    Ok(())
}

/// Minimal notification-driven upsert. New rows are backdated to the epoch so the TTL read never
/// serves an item-less stub as fresh; existing rows only pick up a missing order id.
pub async fn upsert_shipment_stub(
    shipment_id: &str,
    order_id: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<(), FulfillmentStoreError> {
    sqlx::query(
        r#"
        INSERT INTO shipment_cache (shipment_id, order_id, fetched_at) VALUES ($1, $2, $3)
        ON CONFLICT (shipment_id) DO UPDATE SET
            order_id = COALESCE(excluded.order_id, shipment_cache.order_id)
        "#,
    )
    .bind(shipment_id)
    .bind(order_id)
    .bind(DateTime::<Utc>::UNIX_EPOCH)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn purge_older_than(
    retention: Duration,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let cutoff = Utc::now() - retention;
    let result = sqlx::query("DELETE FROM shipment_cache WHERE fetched_at < $1").bind(cutoff).execute(conn).await?;
    Ok(result.rows_affected())
}
