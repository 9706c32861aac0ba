use chrono::{Duration, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{PickRecord, ShipmentDetail},
    traits::FulfillmentStoreError,
};

pub async fn rows_for_shipment(
    shipment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<PickRecord>, FulfillmentStoreError> {
    let rows = sqlx::query_as("SELECT * FROM pick_ledger WHERE shipment_id = $1 ORDER BY id")
        .bind(shipment_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

/// Inserts one pending row per line item of the detail. The line-identity unique constraint makes
/// this idempotent: conflicting rows are left exactly as they are.
pub async fn seed_from_detail(
    detail: &ShipmentDetail,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let order_id =
        detail.primary_order_id.clone().or_else(|| detail.order_ids.first().cloned()).unwrap_or_default();
    let mut inserted = 0;
    for item in &detail.items {
        let result = sqlx::query(
            r#"
            INSERT INTO pick_ledger (shipment_id, order_id, item_id, variation_id, title, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (shipment_id, order_id, item_id, variation_id) DO NOTHING
            "#,
        )
        .bind(&detail.shipment_id)
        .bind(&order_id)
        .bind(&item.item_id)
        .bind(item.variation_id.unwrap_or(0))
        .bind(&item.title)
        .bind(item.quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        inserted += result.rows_affected();
    }
    trace!("🧾️ Seeded {inserted} ledger rows for shipment {}", detail.shipment_id);
    Ok(inserted)
}

pub async fn set_packed(
    shipment_id: &str,
    operator: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let result = sqlx::query(
        "UPDATE pick_ledger SET state = 'packed', packed_at = $1, packed_by = $2 \
         WHERE shipment_id = $3 AND state = 'pending'",
    )
    .bind(Utc::now())
    .bind(operator)
    .bind(shipment_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_dispatched(
    shipment_id: &str,
    carrier: &str,
    shipment_type: &str,
    operator: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let result = sqlx::query(
        "UPDATE pick_ledger SET state = 'dispatched', dispatched_at = $1, dispatched_by = $2, \
         carrier = $3, shipment_type = $4 WHERE shipment_id = $5 AND state = 'packed'",
    )
    .bind(Utc::now())
    .bind(operator)
    .bind(carrier)
    .bind(shipment_type)
    .bind(shipment_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Flips open rows to cancelled. Dispatched rows are terminal; the guard lives in the WHERE
/// clause, not in the caller.
pub async fn cancel_open_rows(
    shipment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let result = sqlx::query(
        "UPDATE pick_ledger SET state = 'cancelled' WHERE shipment_id = $1 AND state IN ('pending', 'packed')",
    )
    .bind(shipment_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn purge_older_than(
    retention: Duration,
    conn: &mut SqliteConnection,
) -> Result<u64, FulfillmentStoreError> {
    let cutoff = Utc::now() - retention;
    let result = sqlx::query("DELETE FROM pick_ledger WHERE created_at < $1").bind(cutoff).execute(conn).await?;
    Ok(result.rows_affected())
}
