use super::common::*;
use crate::analysis::domain::{DealClass, PropertyId};
use crate::analysis::orchestrator::{BatchOptions, CancellationFlag};
use crate::analysis::repository::{PropertyStore, StoreError};
use crate::analysis::{DealAnalysisService, DealServiceError, SinkDelivery};
use std::collections::BTreeMap;
use std::sync::Arc;

#[test]
fn overrides_apply_to_a_single_run_only() {
    let (service, _, _) = build_service();
    let records = vec![solid_property("p-1")];

    let relaxed = service
        .analyze_records(&records, &settings(&[("hotMinSpread", "20000")]))
        .expect("valid overrides");
    assert_eq!(relaxed.verdicts[0].classification, DealClass::Hot);

    let standard = service
        .analyze_records(&records, &BTreeMap::new())
        .expect("defaults are valid");
    assert_eq!(standard.verdicts[0].classification, DealClass::Solid);
}

#[test]
fn base_settings_are_applied_under_overrides() {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(MemorySink::default());
    let service = DealAnalysisService::new(
        store,
        sink,
        settings(&[("hotMinSpread", "20000"), ("hotMinProfitPct", "90")]),
    );
    let records = vec![solid_property("p-1")];

    let base = service
        .analyze_records(&records, &BTreeMap::new())
        .expect("valid base settings");
    assert_eq!(base.verdicts[0].classification, DealClass::Solid);

    let overridden = service
        .analyze_records(&records, &settings(&[("hotMinProfitPct", "20")]))
        .expect("valid overrides");
    assert_eq!(overridden.verdicts[0].classification, DealClass::Hot);
}

#[test]
fn invalid_setting_fails_the_whole_run() {
    let (service, _, _) = build_service();
    let records = vec![hot_property("p-1"), solid_property("p-2")];

    match service.analyze_records(&records, &settings(&[("arvMultiplier", "seventy")])) {
        Err(DealServiceError::Configuration(err)) => assert_eq!(err.key, "arvMultiplier"),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn stored_batch_publishes_every_verdict_and_alerts_hot_deals() {
    let (service, _, sink) = build_service();
    service.register(pass_property("c")).expect("register pass");
    service.register(hot_property("a")).expect("register hot");
    service.register(solid_property("b")).expect("register solid");

    let report = service
        .run_stored_batch(&BTreeMap::new(), &BatchOptions::default())
        .expect("batch runs");

    assert_eq!(report.summary.succeeded, 3);
    assert_eq!(report.published, 3);
    assert!(report.sink_failures.is_empty());
    let published: Vec<_> = sink
        .published()
        .into_iter()
        .map(|record| record.verdict.classification)
        .collect();
    assert_eq!(
        published,
        vec![DealClass::Hot, DealClass::Solid, DealClass::Pass]
    );

    let alerts = sink.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].template, "hot_deal");
    assert_eq!(alerts[0].property_id, PropertyId::from("a"));
    assert_eq!(
        alerts[0].details.get("maximum_allowable_offer").map(String::as_str),
        Some("$172,000")
    );
}

#[test]
fn cancelled_stored_batch_publishes_nothing() {
    let (service, _, sink) = build_service();
    service.register(hot_property("a")).expect("register");
    let cancellation = CancellationFlag::new();
    cancellation.cancel();

    let report = service
        .run_stored_batch(
            &BTreeMap::new(),
            &BatchOptions {
                cancellation: Some(cancellation),
                deadline: None,
            },
        )
        .expect("batch runs");

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.unprocessed, 1);
    assert_eq!(report.published, 0);
    assert!(sink.published().is_empty());
}

#[test]
fn offline_sink_keeps_the_summary_and_reports_each_verdict() {
    let store = Arc::new(MemoryStore::default());
    let service = DealAnalysisService::new(store, Arc::new(OfflineSink), BTreeMap::new());
    service.register(hot_property("a")).expect("register hot");
    service.register(solid_property("b")).expect("register solid");

    let report = service
        .run_stored_batch(&BTreeMap::new(), &BatchOptions::default())
        .expect("sink outages do not fail the batch");

    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.verdicts.len(), 2);
    assert_eq!(report.published, 0);
    let failures: Vec<_> = report
        .sink_failures
        .iter()
        .map(|failure| (failure.property_id.0.as_str(), failure.delivery))
        .collect();
    assert_eq!(
        failures,
        vec![("a", SinkDelivery::Publish), ("b", SinkDelivery::Publish)]
    );
    assert_eq!(
        report.sink_failures[0].message,
        "sink transport unavailable: crm webhook unreachable"
    );
}

#[test]
fn hot_alert_is_withheld_when_its_verdict_is_not_published() {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(PublishRejectingSink::default());
    let service = DealAnalysisService::new(store, sink.clone(), BTreeMap::new());
    service.register(hot_property("a")).expect("register hot");
    service.register(solid_property("b")).expect("register solid");

    let report = service
        .run_stored_batch(&BTreeMap::new(), &BatchOptions::default())
        .expect("batch runs");

    assert!(sink.alerts().is_empty());
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.verdicts[0].classification, DealClass::Hot);
    assert_eq!(report.published, 0);
    assert_eq!(report.sink_failures.len(), 2);
    assert!(report
        .sink_failures
        .iter()
        .all(|failure| failure.delivery == SinkDelivery::Publish));
}

#[test]
fn register_propagates_conflicts() {
    let service = DealAnalysisService::new(
        Arc::new(ConflictStore),
        Arc::new(MemorySink::default()),
        BTreeMap::new(),
    );

    match service.register(hot_property("a")) {
        Err(DealServiceError::Store(StoreError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.get_property(&PropertyId::from("missing")) {
        Err(DealServiceError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn update_replaces_existing_records_only() {
    let (service, store, _) = build_service();
    service.register(solid_property("a")).expect("register");

    let mut revised = solid_property("a");
    revised.notes = Some("Seller mentioned a lien on the title".to_string());
    service.update_property(revised).expect("update succeeds");

    let stored = store
        .fetch(&PropertyId::from("a"))
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(
        stored.notes.as_deref(),
        Some("Seller mentioned a lien on the title")
    );

    match service.update_property(solid_property("b")) {
        Err(DealServiceError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn store_outage_fails_the_stored_batch() {
    let service = DealAnalysisService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemorySink::default()),
        BTreeMap::new(),
    );

    match service.run_stored_batch(&BTreeMap::new(), &BatchOptions::default()) {
        Err(DealServiceError::Store(StoreError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline")
        }
        other => panic!("expected unavailable store, got {other:?}"),
    }
}
