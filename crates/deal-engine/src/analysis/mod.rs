//! Deal analysis pipeline: valuation, risk scoring, tier classification, deal scoring and
//! exit strategy selection, composed by [`AnalysisOrchestrator`] against one immutable
//! [`AnalysisConfig`] per batch.

mod actions;
pub mod classification;
pub mod config;
pub mod domain;
pub mod error;
pub mod exit;
pub mod orchestrator;
pub mod repository;
pub mod risk;
pub mod router;
pub mod scoring;
pub mod service;
pub mod valuation;

#[cfg(test)]
mod tests;

pub use config::{AnalysisConfig, ExitConfig, RiskConfig, TierRule, TierThresholds, ValuationConfig};
pub use domain::{
    format_currency, DealClass, DealVerdict, Priority, PropertyFinancials, PropertyId,
    PropertyLocation, PropertyRecord, RejectedCell, RiskAssessment, RiskFactor, TriggeredFactor,
    ValuationResult,
};
pub use error::{
    AnalysisError, AnalysisStage, ComputationError, ConfigurationError, FailureKind, InputError,
    RecordFailure,
};
pub use exit::{
    ExitPlan, ExitProfile, ExitRecommendation, ExitStrategy, ExitStrategyAdvisor,
    RentalEstimate, StrategyCandidate, TimelineCategory,
};
pub use orchestrator::{
    rank_verdicts, AnalysisOrchestrator, BatchOptions, BatchSummary, CancellationFlag,
};
pub use repository::{
    DealAlert, PropertyStore, SinkError, StoreError, VerdictRecord, VerdictSink,
};
pub use router::deal_router;
pub use service::{
    DealAnalysisService, DealServiceError, SinkDelivery, SinkFailure, StoredBatchReport,
};
