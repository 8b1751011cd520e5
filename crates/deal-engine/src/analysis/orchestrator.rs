use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::actions::action_items;
use super::classification::classify;
use super::config::AnalysisConfig;
use super::domain::{DealVerdict, Priority, PropertyRecord, ValuationResult};
use super::error::{
    ensure_finite, AnalysisError, AnalysisStage, ComputationError, ConfigurationError, InputError,
    RecordFailure,
};
use super::exit::{ExitProfile, ExitStrategyAdvisor, NEUTRAL_MARKET_SCORE};
use super::risk;
use super::scoring::{to_deal_score, weighted_score, ScoreInputs};
use super::valuation;

/// Shared flag a caller flips to stop a batch between records.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub cancellation: Option<CancellationFlag>,
    pub deadline: Option<Instant>,
}

impl BatchOptions {
    fn should_stop(&self) -> bool {
        let cancelled = self
            .cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled);
        let expired = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        cancelled || expired
    }
}

/// Outcome of a batch run. Partial failure is reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Sorted by tier priority, then deal score descending, then input order.
    pub verdicts: Vec<DealVerdict>,
    pub failures: Vec<RecordFailure>,
    pub cancelled: bool,
    /// Records never reached because the batch stopped early.
    pub unprocessed: usize,
}

/// Runs valuation, risk, classification, scoring and exit selection for each record
/// against one immutable configuration.
#[derive(Debug, Clone)]
pub struct AnalysisOrchestrator {
    config: AnalysisConfig,
}

impl AnalysisOrchestrator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn from_settings(
        settings: &std::collections::BTreeMap<String, String>,
    ) -> Result<Self, ConfigurationError> {
        AnalysisConfig::from_settings(settings).map(Self::new)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_one(&self, record: &PropertyRecord) -> Result<DealVerdict, AnalysisError> {
        let property_id = &record.id;
        if record.location.address.trim().is_empty() {
            return Err(InputError {
                property_id: property_id.clone(),
                field: "address",
                reason: "address is required".to_string(),
            }
            .into());
        }
        if let Some(cell) = record.rejected_cells.first() {
            return Err(InputError {
                property_id: property_id.clone(),
                field: cell.field,
                reason: format!("'{}' is not a valid number", cell.value),
            }
            .into());
        }

        let mut valuation = valuation::appraise(record, &self.config.valuation)?;
        if let Some(quantity) = valuation.first_non_finite() {
            return Err(ComputationError {
                property_id: property_id.clone(),
                stage: AnalysisStage::Valuation,
                quantity,
            }
            .into());
        }

        let risk = risk::assess(record, valuation.repair_estimate, &self.config.risk);

        let classification = classify(
            valuation.spread,
            valuation.profit_percent,
            risk.score,
            &self.config.tiers,
        );

        let weighted = ensure_finite(
            property_id,
            AnalysisStage::Scoring,
            "deal_score",
            weighted_score(&ScoreInputs {
                spread: valuation.spread,
                profit: valuation.profit_potential,
                asking_price: valuation.asking_price,
                risk_score: risk.score,
                arv: valuation.after_repair_value,
            }),
        )?;
        let deal_score = to_deal_score(weighted);

        let profile = exit_profile(record, &valuation);
        ensure_finite(
            property_id,
            AnalysisStage::ExitStrategy,
            "equity_percent",
            profile.equity_percent,
        )?;
        let exit = ExitStrategyAdvisor::new(&self.config.exit).recommend(&profile);
        if let Some(quantity) = exit.first_non_finite() {
            return Err(ComputationError {
                property_id: property_id.clone(),
                stage: AnalysisStage::ExitStrategy,
                quantity,
            }
            .into());
        }
        valuation.estimated_monthly_rent = Some(exit.rental.monthly_rent);
        valuation.estimated_cash_flow = Some(exit.rental.cash_flow);

        let action_items = action_items(
            classification,
            &valuation,
            &risk,
            &exit,
            &self.config.tiers,
        );

        Ok(DealVerdict {
            property_id: property_id.clone(),
            classification,
            deal_score,
            priority: Priority::derive(classification, deal_score),
            valuation,
            risk,
            exit,
            action_items,
        })
    }

    pub fn analyze_batch(&self, records: &[PropertyRecord]) -> BatchSummary {
        self.analyze_batch_with(records, &BatchOptions::default())
    }

    pub fn analyze_batch_with(
        &self,
        records: &[PropertyRecord],
        options: &BatchOptions,
    ) -> BatchSummary {
        self.analyze_batch_until(records, |_| options.should_stop())
    }

    /// `should_stop` is consulted before each record with the number already processed.
    fn analyze_batch_until<F>(
        &self,
        records: &[PropertyRecord],
        mut should_stop: F,
    ) -> BatchSummary
    where
        F: FnMut(usize) -> bool,
    {
        let mut verdicts = Vec::with_capacity(records.len());
        let mut failures = Vec::new();
        let mut processed = 0;
        let mut cancelled = false;

        for record in records {
            if should_stop(processed) {
                cancelled = true;
                warn!(
                    processed,
                    remaining = records.len() - processed,
                    "batch analysis stopped before completion"
                );
                break;
            }
            processed += 1;

            match self.analyze_one(record) {
                Ok(verdict) => {
                    debug!(
                        property_id = %verdict.property_id,
                        classification = verdict.classification.label(),
                        deal_score = verdict.deal_score,
                        "property analysed"
                    );
                    verdicts.push(verdict);
                }
                Err(err) => {
                    match &err {
                        AnalysisError::Input(_) => {
                            warn!(property_id = %record.id, error = %err, "skipping property")
                        }
                        AnalysisError::Computation(detail) => error!(
                            property_id = %record.id,
                            stage = detail.stage.label(),
                            error = %err,
                            "computation defect while analysing property"
                        ),
                    }
                    failures.push(RecordFailure::from(&err));
                }
            }
        }

        rank_verdicts(&mut verdicts);

        let summary = BatchSummary {
            succeeded: verdicts.len(),
            failed: failures.len(),
            verdicts,
            failures,
            cancelled,
            unprocessed: records.len() - processed,
        };
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "batch analysis complete"
        );
        summary
    }
}

/// Tier priority first, then deal score descending. The sort is stable, so ties keep
/// input order.
pub fn rank_verdicts(verdicts: &mut [DealVerdict]) {
    verdicts.sort_by(|a, b| {
        a.classification
            .cmp(&b.classification)
            .then_with(|| b.deal_score.cmp(&a.deal_score))
    });
}

fn exit_profile(record: &PropertyRecord, valuation: &ValuationResult) -> ExitProfile {
    let arv = valuation.after_repair_value;
    let equity_percent = if arv > 0.0 {
        (arv - valuation.asking_price) / arv * 100.0
    } else {
        0.0
    };

    ExitProfile {
        arv,
        repair_estimate: valuation.repair_estimate,
        equity_percent,
        market_volume_score: record.market_volume_score.unwrap_or(NEUTRAL_MARKET_SCORE),
        velocity_score: record.velocity_score.unwrap_or(NEUTRAL_MARKET_SCORE),
        profit_potential: valuation.profit_potential,
        asking_price: valuation.asking_price,
        square_footage: record.financials.square_footage.unwrap_or(0),
    }
}
