use chrono::Duration;
use log::*;
use tokio::task::JoinHandle;

use crate::{traits::ShipmentCacheManagement, SqliteDatabase};

/// Starts the cache retention worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
pub fn start_retention_worker(
    db: SqliteDatabase,
    retention: Duration,
    check_interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(check_interval);
        info!("🕰️ Shipment cache retention worker started");
        loop {
            timer.tick().await;
            debug!("🕰️ Running the cache retention sweep");
            match db.purge_older_than(retention).await {
                Ok(0) => debug!("🕰️ Retention sweep removed nothing"),
                Ok(count) => info!("🕰️ Retention sweep removed {count} cached shipments"),
                Err(e) => error!("🕰️ Error running the cache retention sweep: {e}"),
            }
        }
    })
}
