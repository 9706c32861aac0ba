use std::collections::HashMap;

use fulfillment_engine::{
    db_types::PickState,
    traits::{DispatchOutcome, PackOutcome, PickLedgerManagement, ShipmentCacheManagement},
    LedgerApi,
};
use meli_tools::data_objects::ShipmentPayload;

mod support;

use support::{
    mocks::MockMarketplace,
    sample_detail,
    sample_item,
    setup,
    tear_down,
};

#[tokio::test]
async fn first_pack_action_seeds_the_ledger_and_repeats_are_rejected() {
    let db = setup().await;
    let detail = sample_detail(
        "43000001",
        &["O-1"],
        vec![sample_item("MLA1", "SKU-1", 2), sample_item("MLA2", "SKU-2", 1)],
    );
    db.upsert_shipment_detail(&detail).await.unwrap();

    let outcome = db.mark_packed("43000001", "maria").await.unwrap();
    assert_eq!(outcome, PackOutcome::Packed { rows: 2 });
    let rows = db.ledger_rows("43000001").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.state == PickState::Packed));
    assert!(rows.iter().all(|r| r.packed_by.as_deref() == Some("maria")));
    let packed_at: Vec<_> = rows.iter().map(|r| r.packed_at).collect();

    // Idempotence: the repeat is a structured failure and mutates no timestamps.
    let repeat = db.mark_packed("43000001", "carlos").await.unwrap();
    assert_eq!(repeat, PackOutcome::AlreadyPacked);
    let rows = db.ledger_rows("43000001").await.unwrap();
    assert_eq!(rows.iter().map(|r| r.packed_at).collect::<Vec<_>>(), packed_at);
    assert!(rows.iter().all(|r| r.packed_by.as_deref() == Some("maria")));

    tear_down(db).await;
}

#[tokio::test]
async fn packing_an_unknown_shipment_is_rejected() {
    let db = setup().await;
    assert_eq!(db.mark_packed("43999999", "maria").await.unwrap(), PackOutcome::UnknownShipment);
    tear_down(db).await;
}

#[tokio::test]
async fn dispatch_requires_every_line_packed_and_is_terminal() {
    let db = setup().await;
    let detail = sample_detail(
        "43000002",
        &["O-1"],
        vec![sample_item("MLA1", "SKU-1", 1), sample_item("MLA2", "SKU-2", 3)],
    );
    db.upsert_shipment_detail(&detail).await.unwrap();

    // No rows yet.
    let outcome = db.mark_dispatched("43000002", "Oca", "standard", "maria").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::UnknownShipment);

    // Seeded but still pending; re-seeding inserts nothing thanks to the line-identity constraint.
    assert_eq!(db.seed_ledger(&detail).await.unwrap(), 2);
    assert_eq!(db.seed_ledger(&detail).await.unwrap(), 0);
    let outcome = db.mark_dispatched("43000002", "Oca", "standard", "maria").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::NotFullyPacked);

    assert!(db.mark_packed("43000002", "maria").await.unwrap().succeeded());
    let outcome = db.mark_dispatched("43000002", "Oca", "standard", "maria").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Dispatched { rows: 2 });
    let rows = db.ledger_rows("43000002").await.unwrap();
    assert!(rows.iter().all(|r| r.state == PickState::Dispatched));
    assert!(rows.iter().all(|r| r.carrier.as_deref() == Some("Oca")));

    // Repeats of either action are structured failures.
    assert_eq!(
        db.mark_dispatched("43000002", "Oca", "standard", "maria").await.unwrap(),
        DispatchOutcome::AlreadyDispatched
    );
    assert_eq!(db.mark_packed("43000002", "maria").await.unwrap(), PackOutcome::AlreadyDispatched);

    // A late cancellation signal must never alter dispatched rows.
    assert_eq!(db.cancel_open_rows("43000002").await.unwrap(), 0);
    let rows = db.ledger_rows("43000002").await.unwrap();
    assert!(rows.iter().all(|r| r.state == PickState::Dispatched));

    tear_down(db).await;
}

#[tokio::test]
async fn dispatch_is_refused_while_the_cached_status_is_cancelled() {
    let db = setup().await;
    let mut detail = sample_detail("43000003", &["O-1"], vec![sample_item("MLA1", "SKU-1", 1)]);
    db.upsert_shipment_detail(&detail).await.unwrap();
    assert!(db.mark_packed("43000003", "maria").await.unwrap().succeeded());

    detail.marketplace_status_raw = "cancelled".to_string();
    detail.marketplace_status_label = "Cancelled".to_string();
    db.upsert_shipment_detail(&detail).await.unwrap();

    // The mock has no live shipment record, so only the cached status can refuse.
    let api = LedgerApi::new(db.clone(), MockMarketplace::default());
    let outcome = api.mark_dispatched("43000003", "Oca", "standard", "maria").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::CancelledUpstream);
    let rows = db.ledger_rows("43000003").await.unwrap();
    assert!(rows.iter().all(|r| r.state == PickState::Packed), "ledger rows must be unchanged");

    tear_down(db).await;
}

#[tokio::test]
async fn dispatch_is_refused_when_the_live_status_says_cancelled() {
    let db = setup().await;
    let detail = sample_detail("43000004", &["O-1"], vec![sample_item("MLA1", "SKU-1", 1)]);
    db.upsert_shipment_detail(&detail).await.unwrap();
    assert!(db.mark_packed("43000004", "maria").await.unwrap().succeeded());

    let live = ShipmentPayload {
        id: Some("43000004".to_string()),
        status: Some("cancelled".to_string()),
        logistic_type: None,
    };
    let client = MockMarketplace::new(
        HashMap::new(),
        HashMap::from([("43000004".to_string(), live)]),
        HashMap::new(),
        HashMap::new(),
    );
    let api = LedgerApi::new(db.clone(), client);
    let outcome = api.mark_dispatched("43000004", "Oca", "standard", "maria").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::CancelledUpstream);

    tear_down(db).await;
}
