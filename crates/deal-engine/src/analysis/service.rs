use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{format_currency, DealClass, DealVerdict, PropertyId, PropertyRecord};
use super::error::ConfigurationError;
use super::orchestrator::{AnalysisOrchestrator, BatchOptions, BatchSummary};
use super::repository::{
    DealAlert, PropertyStore, SinkError, StoreError, VerdictRecord, VerdictSink,
};

/// Service composing the property store, verdict sink and per-run configuration.
///
/// Base settings are merged with per-call overrides and resolved into a fresh
/// [`AnalysisOrchestrator`] on every run, so nothing carries over between batches.
pub struct DealAnalysisService<S, K> {
    store: Arc<S>,
    sink: Arc<K>,
    base_settings: BTreeMap<String, String>,
}

impl<S, K> DealAnalysisService<S, K>
where
    S: PropertyStore + 'static,
    K: VerdictSink + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<K>, base_settings: BTreeMap<String, String>) -> Self {
        Self {
            store,
            sink,
            base_settings,
        }
    }

    fn orchestrator(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<AnalysisOrchestrator, ConfigurationError> {
        let mut settings = self.base_settings.clone();
        settings.extend(
            overrides
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        AnalysisOrchestrator::from_settings(&settings)
    }

    /// Analyse caller-supplied records without touching the store or sink.
    pub fn analyze_records(
        &self,
        records: &[PropertyRecord],
        overrides: &BTreeMap<String, String>,
    ) -> Result<BatchSummary, DealServiceError> {
        let orchestrator = self.orchestrator(overrides)?;
        Ok(orchestrator.analyze_batch(records))
    }

    /// Analyse every stored record and publish each verdict to the sink.
    ///
    /// Sink failures are collected per verdict. A HOT alert only goes out once its
    /// verdict has been published.
    pub fn run_stored_batch(
        &self,
        overrides: &BTreeMap<String, String>,
        options: &BatchOptions,
    ) -> Result<StoredBatchReport, DealServiceError> {
        let orchestrator = self.orchestrator(overrides)?;
        let records = self.store.list()?;
        let summary = orchestrator.analyze_batch_with(&records, options);

        let analyzed_at = Utc::now();
        let mut published = 0;
        let mut sink_failures = Vec::new();
        for verdict in &summary.verdicts {
            let record = VerdictRecord {
                verdict: verdict.clone(),
                analyzed_at,
            };
            if let Err(err) = self.sink.publish(record) {
                warn!(property_id = %verdict.property_id, error = %err, "verdict not published");
                sink_failures.push(SinkFailure::new(verdict, SinkDelivery::Publish, &err));
                continue;
            }
            published += 1;

            if verdict.classification == DealClass::Hot {
                if let Err(err) = self.sink.alert(hot_deal_alert(verdict)) {
                    warn!(
                        property_id = %verdict.property_id,
                        error = %err,
                        "hot deal alert not sent"
                    );
                    sink_failures.push(SinkFailure::new(verdict, SinkDelivery::Alert, &err));
                }
            }
        }

        info!(
            published,
            failed = summary.failed,
            sink_failures = sink_failures.len(),
            "stored batch published"
        );
        Ok(StoredBatchReport {
            summary,
            published,
            sink_failures,
        })
    }

    pub fn register(&self, record: PropertyRecord) -> Result<PropertyRecord, DealServiceError> {
        Ok(self.store.insert(record)?)
    }

    /// Replace a stored record. The record must already exist.
    pub fn update_property(&self, record: PropertyRecord) -> Result<PropertyRecord, DealServiceError> {
        if self.store.fetch(&record.id)?.is_none() {
            return Err(StoreError::NotFound.into());
        }
        self.store.update(record.clone())?;
        Ok(record)
    }

    pub fn get_property(&self, id: &PropertyId) -> Result<PropertyRecord, DealServiceError> {
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(record)
    }
}

fn hot_deal_alert(verdict: &DealVerdict) -> DealAlert {
    let mut details = BTreeMap::new();
    details.insert("classification".to_string(), verdict.classification.label().to_string());
    details.insert("deal_score".to_string(), verdict.deal_score.to_string());
    details.insert(
        "maximum_allowable_offer".to_string(),
        format_currency(verdict.valuation.maximum_allowable_offer),
    );
    details.insert("spread".to_string(), format_currency(verdict.valuation.spread));
    details.insert(
        "recommended_exit".to_string(),
        verdict.exit.primary.label().to_string(),
    );

    DealAlert {
        template: "hot_deal".to_string(),
        property_id: verdict.property_id.clone(),
        details,
    }
}

/// Outcome of a stored batch: the analysis summary plus what reached the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredBatchReport {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub published: usize,
    pub sink_failures: Vec<SinkFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkDelivery {
    Publish,
    Alert,
}

/// A verdict the sink refused. Publish failures suppress the HOT alert for that verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkFailure {
    pub property_id: PropertyId,
    pub delivery: SinkDelivery,
    pub message: String,
}

impl SinkFailure {
    fn new(verdict: &DealVerdict, delivery: SinkDelivery, err: &SinkError) -> Self {
        Self {
            property_id: verdict.property_id.clone(),
            delivery,
            message: err.to_string(),
        }
    }
}

/// Error raised by the deal analysis service.
#[derive(Debug, thiserror::Error)]
pub enum DealServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
