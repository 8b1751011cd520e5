//! Exit-strategy selection.
//!
//! Every catalogue entry carries its own eligibility predicate. Only eligible strategies are
//! scored and ranked; when none qualifies the advisor answers with
//! [`ExitPlan::NoViableStrategy`] instead of falling back to a catalogue entry.

mod catalogue;

pub use catalogue::{ExitStrategy, TimelineCategory};

use serde::{Deserialize, Serialize};

use super::config::ExitConfig;
use super::domain::format_currency;

/// Neutral market signal used when a record carries no market data.
pub const NEUTRAL_MARKET_SCORE: f64 = 50.0;

/// Financial profile the advisor evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitProfile {
    pub arv: f64,
    pub repair_estimate: f64,
    pub equity_percent: f64,
    pub market_volume_score: f64,
    pub velocity_score: f64,
    pub profit_potential: f64,
    pub asking_price: f64,
    pub square_footage: u32,
}

/// Monthly rental economics derived from ARV and asking price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentalEstimate {
    pub monthly_rent: f64,
    pub monthly_expenses: f64,
    pub monthly_payment: f64,
    pub cash_flow: f64,
}

impl RentalEstimate {
    pub fn from_profile(profile: &ExitProfile, config: &ExitConfig) -> Self {
        let monthly_rent = profile.arv * config.rent_multiplier;
        let monthly_expenses = monthly_rent * config.expense_ratio;
        // Approximates a 30-year amortized payment on the purchase price.
        let monthly_payment = profile.asking_price * config.payment_factor;

        Self {
            monthly_rent,
            monthly_expenses,
            monthly_payment,
            cash_flow: monthly_rent - monthly_payment - monthly_expenses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "strategy")]
pub enum ExitPlan {
    Strategy(ExitStrategy),
    NoViableStrategy,
}

impl ExitPlan {
    pub const fn label(self) -> &'static str {
        match self {
            ExitPlan::Strategy(strategy) => strategy.label(),
            ExitPlan::NoViableStrategy => "No viable strategy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyCandidate {
    pub strategy: ExitStrategy,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRecommendation {
    pub primary: ExitPlan,
    pub secondary: Option<ExitStrategy>,
    pub reason: String,
    pub timeline: Option<TimelineCategory>,
    pub expected_profit: f64,
    pub rental: RentalEstimate,
    /// Eligible candidates, best first.
    pub candidates: Vec<StrategyCandidate>,
}

impl ExitRecommendation {
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let quantities = [
            ("expected_profit", self.expected_profit),
            ("monthly_rent", self.rental.monthly_rent),
            ("monthly_expenses", self.rental.monthly_expenses),
            ("monthly_payment", self.rental.monthly_payment),
            ("cash_flow", self.rental.cash_flow),
        ];

        quantities
            .into_iter()
            .chain(
                self.candidates
                    .iter()
                    .map(|candidate| ("candidate_score", candidate.score)),
            )
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| name)
    }
}

pub struct ExitStrategyAdvisor<'a> {
    config: &'a ExitConfig,
}

impl<'a> ExitStrategyAdvisor<'a> {
    pub fn new(config: &'a ExitConfig) -> Self {
        Self { config }
    }

    pub fn recommend(&self, profile: &ExitProfile) -> ExitRecommendation {
        let rental = RentalEstimate::from_profile(profile, self.config);

        let mut candidates: Vec<StrategyCandidate> = ExitStrategy::catalogue()
            .into_iter()
            .filter(|strategy| strategy.is_eligible(profile, &rental))
            .map(|strategy| StrategyCandidate {
                strategy,
                score: strategy.score(profile, &rental),
            })
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let Some(top) = candidates.first().copied() else {
            return ExitRecommendation {
                primary: ExitPlan::NoViableStrategy,
                secondary: None,
                reason: format!(
                    "no exit strategy is eligible (equity {:.0}%, cash flow {}/mo, profit {})",
                    profile.equity_percent,
                    format_currency(rental.cash_flow),
                    format_currency(profile.profit_potential)
                ),
                timeline: None,
                expected_profit: 0.0,
                rental,
                candidates,
            };
        };

        let secondary = candidates.get(1).map(|candidate| candidate.strategy);
        let mut reason = format!(
            "{} scored {:.1} of {} eligible option{} (equity {:.0}%, cash flow {}/mo)",
            top.strategy.label(),
            top.score,
            candidates.len(),
            if candidates.len() == 1 { "" } else { "s" },
            profile.equity_percent,
            format_currency(rental.cash_flow)
        );
        if let Some(runner_up) = secondary {
            reason.push_str(&format!("; runner-up {}", runner_up.label()));
        }

        ExitRecommendation {
            primary: ExitPlan::Strategy(top.strategy),
            secondary,
            reason,
            timeline: Some(top.strategy.timeline()),
            expected_profit: top.strategy.expected_profit(profile, &rental),
            rental,
            candidates,
        }
    }
}
