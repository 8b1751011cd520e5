use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{DealVerdict, PropertyId, PropertyRecord};

/// Storage abstraction for property records so the service can be exercised in isolation.
pub trait PropertyStore: Send + Sync {
    fn insert(&self, record: PropertyRecord) -> Result<PropertyRecord, StoreError>;
    fn update(&self, record: PropertyRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertyRecord>, StoreError>;
    fn list(&self) -> Result<Vec<PropertyRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A verdict as handed to the sink. A newer record for the same property replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub verdict: DealVerdict,
    pub analyzed_at: DateTime<Utc>,
}

/// Outbound notification for deals that warrant immediate attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealAlert {
    pub template: String,
    pub property_id: PropertyId,
    pub details: BTreeMap<String, String>,
}

/// Receives classified deals and persists or forwards them (CRM sync, sheets, e-mail).
pub trait VerdictSink: Send + Sync {
    fn publish(&self, record: VerdictRecord) -> Result<(), SinkError>;
    fn alert(&self, alert: DealAlert) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink transport unavailable: {0}")]
    Transport(String),
}
