use deal_engine::analysis::{
    DealAlert, PropertyId, PropertyRecord, PropertyStore, SinkError, StoreError, VerdictRecord,
    VerdictSink,
};
use deal_engine::config::parse_setting_pair;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyStore {
    records: Arc<Mutex<HashMap<PropertyId, PropertyRecord>>>,
}

impl PropertyStore for InMemoryPropertyStore {
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
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
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

/// Keeps the latest verdict per property; a rerun replaces the earlier record.
#[derive(Default, Clone)]
pub(crate) struct InMemoryVerdictSink {
    verdicts: Arc<Mutex<BTreeMap<PropertyId, VerdictRecord>>>,
    alerts: Arc<Mutex<Vec<DealAlert>>>,
}

impl VerdictSink for InMemoryVerdictSink {
    fn publish(&self, record: VerdictRecord) -> Result<(), SinkError> {
        let mut guard = self.verdicts.lock().expect("sink mutex poisoned");
        guard.insert(record.verdict.property_id.clone(), record);
        Ok(())
    }

    fn alert(&self, alert: DealAlert) -> Result<(), SinkError> {
        let mut guard = self.alerts.lock().expect("sink mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryVerdictSink {
    pub(crate) fn verdicts(&self) -> Vec<VerdictRecord> {
        self.verdicts
            .lock()
            .expect("sink mutex poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub(crate) fn alerts(&self) -> Vec<DealAlert> {
        self.alerts.lock().expect("sink mutex poisoned").clone()
    }
}

/// clap value parser for `--set key=value`.
pub(crate) fn parse_setting(raw: &str) -> Result<(String, String), String> {
    parse_setting_pair(raw).map_err(|err| err.to_string())
}
