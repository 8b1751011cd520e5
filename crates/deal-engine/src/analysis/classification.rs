use super::config::{TierRule, TierThresholds};
use super::domain::DealClass;

/// First tier whose rule is fully met wins; PASS when none is.
pub fn classify(
    spread: f64,
    profit_percent: f64,
    risk_score: u8,
    thresholds: &TierThresholds,
) -> DealClass {
    let cascade = [
        (DealClass::Hot, &thresholds.hot),
        (DealClass::Solid, &thresholds.solid),
        (DealClass::Marginal, &thresholds.marginal),
    ];

    cascade
        .into_iter()
        .find(|(_, rule)| qualifies(rule, spread, profit_percent, risk_score))
        .map(|(class, _)| class)
        .unwrap_or(DealClass::Pass)
}

fn qualifies(rule: &TierRule, spread: f64, profit_percent: f64, risk_score: u8) -> bool {
    spread >= rule.min_spread && profit_percent >= rule.min_profit_pct && risk_score <= rule.max_risk
}
