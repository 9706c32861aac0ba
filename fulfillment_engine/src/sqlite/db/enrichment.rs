use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::VendorCatalogEntry,
    traits::{FulfillmentStoreError, VendorSyncStats},
};

pub async fn cached_permalinks(
    item_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<HashMap<String, String>, FulfillmentStoreError> {
    if item_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut builder = QueryBuilder::new("SELECT item_id, permalink FROM item_permalinks WHERE item_id IN (");
    let mut values = builder.separated(", ");
    for item_id in item_ids {
        values.push_bind(item_id);
    }
    builder.push(")");
    let rows: Vec<(String, String)> = builder.build_query_as().fetch_all(conn).await?;
    Ok(rows.into_iter().collect())
}

pub async fn upsert_permalink(
    item_id: &str,
    permalink: &str,
    conn: &mut SqliteConnection,
) -> Result<(), FulfillmentStoreError> {
    sqlx::query(
        r#"
        INSERT INTO item_permalinks (item_id, permalink, refreshed_at) VALUES ($1, $2, $3)
        ON CONFLICT (item_id) DO UPDATE SET
            permalink = excluded.permalink,
            refreshed_at = excluded.refreshed_at
        "#,
    )
    .bind(item_id)
    .bind(permalink)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn vendor_entries_for_skus(
    skus: &[String],
    conn: &mut SqliteConnection,
) -> Result<HashMap<String, VendorCatalogEntry>, FulfillmentStoreError> {
    if skus.is_empty() {
        return Ok(HashMap::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM vendor_catalog WHERE sku IN (");
    let mut values = builder.separated(", ");
    for sku in skus {
        values.push_bind(sku);
    }
    builder.push(")");
    let entries: Vec<VendorCatalogEntry> = builder.build_query_as().fetch_all(conn).await?;
    Ok(entries.into_iter().map(|e| (e.sku.clone(), e)).collect())
}

/// Inserts the entry, or refreshes it if the SKU is already cached. Returns true when the row
/// was new.
pub async fn upsert_vendor_entry(
    entry: &VendorCatalogEntry,
    conn: &mut SqliteConnection,
) -> Result<bool, FulfillmentStoreError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT 1 FROM vendor_catalog WHERE sku = $1")
        .bind(&entry.sku)
        .fetch_optional(&mut *conn)
        .await?;
    sqlx::query(
        r#"
        INSERT INTO vendor_catalog (sku, vendor_code, external_item_id, last_synced)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (sku) DO UPDATE SET
            vendor_code = excluded.vendor_code,
            external_item_id = excluded.external_item_id,
            last_synced = excluded.last_synced
        "#,
    )
    .bind(&entry.sku)
    .bind(&entry.vendor_code)
    .bind(&entry.external_item_id)
    .bind(entry.last_synced)
    .execute(conn)
    .await?;
    Ok(existing.is_none())
}

pub async fn upsert_vendor_entries(
    entries: &[VendorCatalogEntry],
    conn: &mut SqliteConnection,
) -> Result<VendorSyncStats, FulfillmentStoreError> {
    let mut stats = VendorSyncStats::default();
    for entry in entries {
        if upsert_vendor_entry(entry, &mut *conn).await? {
            stats.inserted += 1;
        } else {
            stats.updated += 1;
        }
    }
    Ok(stats)
}
