use chrono::{Duration, Utc};
use fulfillment_engine::{
    traits::{PickLedgerManagement, ReportWindow, ShipmentCacheManagement},
    DashboardApi,
};

mod support;

use support::{sample_detail, sample_item, setup, tear_down};

#[tokio::test]
async fn partitions_split_seen_vs_packed_and_exclude_marketplace_fulfilled() {
    let db = setup().await;

    let mut item = sample_item("MLA1", "SKU-1", 1);
    item.logistic_type = Some("cross_docking".to_string());
    db.upsert_shipment_detail(&sample_detail("45000001", &["O-1"], vec![item])).await.unwrap();

    let mut item = sample_item("MLA2", "SKU-2", 1);
    item.logistic_type = Some("cross_docking".to_string());
    let mut cancelled = sample_detail("45000002", &["O-2"], vec![item]);
    cancelled.marketplace_status_raw = "cancelled".to_string();
    cancelled.marketplace_status_label = "Cancelled".to_string();
    db.upsert_shipment_detail(&cancelled).await.unwrap();

    let mut item = sample_item("MLA3", "SKU-3", 2);
    item.logistic_type = Some("self_service".to_string());
    db.upsert_shipment_detail(&sample_detail("45000003", &["O-3"], vec![item])).await.unwrap();
    assert!(db.mark_packed("45000003", "maria").await.unwrap().succeeded());

    // Marketplace-fulfilled shipments never show up in the report.
    let mut item = sample_item("MLA4", "SKU-4", 1);
    item.logistic_type = Some("fulfillment".to_string());
    db.upsert_shipment_detail(&sample_detail("45000004", &["O-4"], vec![item])).await.unwrap();

    let api = DashboardApi::new(db.clone());
    let report = api.report(&ReportWindow::last_hours(24)).await.unwrap();

    assert_eq!(report.partitions.len(), 2);
    let cross = report.partitions.iter().find(|p| p.logistic_type == "cross_docking").unwrap();
    assert_eq!(cross.seen, 2);
    assert_eq!(cross.packed, 0);
    let self_service = report.partitions.iter().find(|p| p.logistic_type == "self_service").unwrap();
    assert_eq!(self_service.seen, 1);
    assert_eq!(self_service.packed, 1);
    assert!(!report.partitions.iter().any(|p| p.logistic_type == "fulfillment"));
    assert_eq!(report.cancelled_shipments, vec!["45000002".to_string()]);

    tear_down(db).await;
}

#[tokio::test]
async fn shipments_outside_the_window_are_not_counted() {
    let db = setup().await;

    let mut item = sample_item("MLA1", "SKU-1", 1);
    item.logistic_type = Some("cross_docking".to_string());
    let mut old = sample_detail("45000005", &["O-1"], vec![item]);
    old.fetched_at = Utc::now() - Duration::days(2);
    db.upsert_shipment_detail(&old).await.unwrap();

    let api = DashboardApi::new(db.clone());
    let report = api.report(&ReportWindow::last_hours(24)).await.unwrap();
    assert!(report.partitions.is_empty());
    assert!(report.cancelled_shipments.is_empty());

    let wide = ReportWindow::new(Utc::now() - Duration::days(3), Utc::now());
    let report = api.report(&wide).await.unwrap();
    assert_eq!(report.partitions.len(), 1);
    assert_eq!(report.partitions[0].seen, 1);

    tear_down(db).await;
}
