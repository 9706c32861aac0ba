use std::collections::BTreeMap;

use sqlx::SqliteConnection;

use crate::{
    db_types::{LOGISTIC_TYPE_FULFILLMENT, STATUS_CANCELLED},
    traits::{DashboardReport, FulfillmentStoreError, LogisticPartition, ReportWindow},
};

/// Windowed read-side counts. Shipments are partitioned by logistic type (NULL partitions under
/// "unknown"); the marketplace-fulfilled partition is excluded because the warehouse never packs
/// those.
pub async fn dashboard_report(
    window: &ReportWindow,
    conn: &mut SqliteConnection,
) -> Result<DashboardReport, FulfillmentStoreError> {
    let seen: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT COALESCE(logistic_type, 'unknown') AS logistic_type, COUNT(*) AS seen
        FROM shipment_cache
        WHERE fetched_at >= $1 AND fetched_at < $2
          AND COALESCE(logistic_type, 'unknown') <> $3
        GROUP BY COALESCE(logistic_type, 'unknown')
        "#,
    )
    .bind(window.since)
    .bind(window.until)
    .bind(LOGISTIC_TYPE_FULFILLMENT)
    .fetch_all(&mut *conn)
    .await?;

    let packed: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT COALESCE(c.logistic_type, 'unknown') AS logistic_type, COUNT(DISTINCT l.shipment_id) AS packed
        FROM pick_ledger l
        JOIN shipment_cache c ON c.shipment_id = l.shipment_id
        WHERE l.packed_at >= $1 AND l.packed_at < $2
          AND COALESCE(c.logistic_type, 'unknown') <> $3
        GROUP BY COALESCE(c.logistic_type, 'unknown')
        "#,
    )
    .bind(window.since)
    .bind(window.until)
    .bind(LOGISTIC_TYPE_FULFILLMENT)
    .fetch_all(&mut *conn)
    .await?;

    let cancelled_shipments: Vec<String> = sqlx::query_scalar(
        "SELECT shipment_id FROM shipment_cache \
         WHERE status_raw = $1 AND fetched_at >= $2 AND fetched_at < $3 ORDER BY fetched_at",
    )
    .bind(STATUS_CANCELLED)
    .bind(window.since)
    .bind(window.until)
    .fetch_all(&mut *conn)
    .await?;

    let mut partitions: BTreeMap<String, LogisticPartition> = BTreeMap::new();
    for (logistic_type, count) in seen {
        partitions
            .entry(logistic_type.clone())
            .or_insert_with(|| LogisticPartition { logistic_type, seen: 0, packed: 0 })
            .seen = count.max(0) as u64;
    }
    for (logistic_type, count) in packed {
        partitions
            .entry(logistic_type.clone())
            .or_insert_with(|| LogisticPartition { logistic_type, seen: 0, packed: 0 })
            .packed = count.max(0) as u64;
    }
    Ok(DashboardReport { partitions: partitions.into_values().collect(), cancelled_shipments })
}
