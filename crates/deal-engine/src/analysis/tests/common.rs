use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::analysis::domain::{PropertyId, PropertyRecord};
use crate::analysis::repository::{
    DealAlert, PropertyStore, SinkError, StoreError, VerdictRecord, VerdictSink,
};
use crate::analysis::{deal_router, DealAnalysisService};

pub(super) fn property(id: &str, asking: f64, arv: f64, repairs: f64) -> PropertyRecord {
    let mut record = PropertyRecord::new(id);
    record.location.address = format!("{id} Walnut St");
    record.location.city = "Des Moines".to_string();
    record.location.state = "IA".to_string();
    record.financials.asking_price = Some(asking);
    record.financials.after_repair_value = Some(arv);
    record.financials.repair_estimate = Some(repairs);
    record.financials.square_footage = Some(1_500);
    record.financials.year_built = Some(2005);
    record
}

/// Spread 52,000 and profit 124,000 on a 120,000 ask.
pub(super) fn hot_property(id: &str) -> PropertyRecord {
    property(id, 120_000.0, 300_000.0, 20_000.0)
}

/// Spread 22,000: just short of the HOT spread floor.
pub(super) fn solid_property(id: &str) -> PropertyRecord {
    property(id, 150_000.0, 300_000.0, 20_000.0)
}

/// Asking above MAO.
pub(super) fn pass_property(id: &str) -> PropertyRecord {
    property(id, 200_000.0, 300_000.0, 20_000.0)
}

pub(super) fn settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(super) fn build_service() -> (
    DealAnalysisService<MemoryStore, MemorySink>,
    Arc<MemoryStore>,
    Arc<MemorySink>,
) {
    let store = Arc::new(MemoryStore::default());
    let sink = Arc::new(MemorySink::default());
    let service = DealAnalysisService::new(store.clone(), sink.clone(), BTreeMap::new());
    (service, store, sink)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<PropertyId, PropertyRecord>>>,
}

impl PropertyStore for MemoryStore {
    fn insert(&self, record: PropertyRecord) -> Result<PropertyRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: PropertyRecord) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertyRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    published: Arc<Mutex<Vec<VerdictRecord>>>,
    alerts: Arc<Mutex<Vec<DealAlert>>>,
}

impl MemorySink {
    pub(super) fn published(&self) -> Vec<VerdictRecord> {
        self.published.lock().expect("sink mutex poisoned").clone()
    }

    pub(super) fn alerts(&self) -> Vec<DealAlert> {
        self.alerts.lock().expect("sink mutex poisoned").clone()
    }
}

impl VerdictSink for MemorySink {
    fn publish(&self, record: VerdictRecord) -> Result<(), SinkError> {
        self.published
            .lock()
            .expect("sink mutex poisoned")
            .push(record);
        Ok(())
    }

    fn alert(&self, alert: DealAlert) -> Result<(), SinkError> {
        self.alerts.lock().expect("sink mutex poisoned").push(alert);
        Ok(())
    }
}

pub(super) struct ConflictStore;

impl PropertyStore for ConflictStore {
    fn insert(&self, _record: PropertyRecord) -> Result<PropertyRecord, StoreError> {
        Err(StoreError::Conflict)
    }

    fn update(&self, _record: PropertyRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &PropertyId) -> Result<Option<PropertyRecord>, StoreError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableStore;

impl PropertyStore for UnavailableStore {
    fn insert(&self, _record: PropertyRecord) -> Result<PropertyRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: PropertyRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &PropertyId) -> Result<Option<PropertyRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<PropertyRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineSink;

impl VerdictSink for OfflineSink {
    fn publish(&self, _record: VerdictRecord) -> Result<(), SinkError> {
        Err(SinkError::Transport("crm webhook unreachable".to_string()))
    }

    fn alert(&self, _alert: DealAlert) -> Result<(), SinkError> {
        Err(SinkError::Transport("crm webhook unreachable".to_string()))
    }
}

/// Refuses verdict records but still accepts alerts.
#[derive(Default, Clone)]
pub(super) struct PublishRejectingSink {
    alerts: Arc<Mutex<Vec<DealAlert>>>,
}

impl PublishRejectingSink {
    pub(super) fn alerts(&self) -> Vec<DealAlert> {
        self.alerts.lock().expect("sink mutex poisoned").clone()
    }
}

impl VerdictSink for PublishRejectingSink {
    fn publish(&self, _record: VerdictRecord) -> Result<(), SinkError> {
        Err(SinkError::Transport("verdict table locked".to_string()))
    }

    fn alert(&self, alert: DealAlert) -> Result<(), SinkError> {
        self.alerts.lock().expect("sink mutex poisoned").push(alert);
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn deal_router_with_service(
    service: DealAnalysisService<MemoryStore, MemorySink>,
) -> axum::Router {
    deal_router(Arc::new(service))
}
