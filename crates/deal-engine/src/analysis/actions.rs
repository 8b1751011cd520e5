use super::config::TierThresholds;
use super::domain::{format_currency, DealClass, RiskAssessment, RiskFactor, ValuationResult};
use super::exit::{ExitPlan, ExitRecommendation};

/// Human-readable follow-ups for downstream notification. Order: tier action, risk
/// mitigations, exit preparation.
pub(crate) fn action_items(
    classification: DealClass,
    valuation: &ValuationResult,
    risk: &RiskAssessment,
    exit: &ExitRecommendation,
    thresholds: &TierThresholds,
) -> Vec<String> {
    let mao = format_currency(valuation.maximum_allowable_offer);
    let mut items = Vec::new();

    match classification {
        DealClass::Hot => {
            items.push(format!("Submit offer at or below {mao} within 24 hours"));
            items.push("Schedule walkthrough and lock up the contract".to_string());
        }
        DealClass::Solid => {
            items.push(format!("Make offer at or below {mao}"));
            if valuation.repairs_estimated {
                items.push("Verify repair estimate with a contractor walkthrough".to_string());
            }
        }
        DealClass::Marginal => {
            let gap = thresholds.solid.min_spread - valuation.spread;
            if gap > 0.0 {
                items.push(format!(
                    "Negotiate price down by {} to reach a workable spread",
                    format_currency(gap)
                ));
            } else {
                items.push(format!("Negotiate toward {mao} before committing"));
            }
        }
        DealClass::Pass => {
            items.push(format!(
                "Archive lead; re-evaluate if the price drops below {mao}"
            ));
        }
    }

    if classification != DealClass::Pass && valuation.arv_estimated {
        items.push("Pull comparable sales to confirm the estimated ARV".to_string());
    }

    for triggered in &risk.triggered_factors {
        let item = match triggered.factor {
            RiskFactor::HighRepairCost => "Get a second contractor bid on the repair scope",
            RiskFactor::Structural => "Order a structural inspection before closing",
            RiskFactor::LegalIssues => "Run a title search for liens, probate or foreclosure status",
            RiskFactor::LocationConcern => "Verify location risk (flood maps, crime data, traffic)",
            RiskFactor::Age => "Inspect electrical, plumbing and roof on the older structure",
        };
        items.push(item.to_string());
    }

    match exit.primary {
        ExitPlan::Strategy(strategy) if classification != DealClass::Pass => {
            items.push(format!(
                "Prepare {} exit plan ({})",
                strategy.label(),
                strategy.timeline().label()
            ));
        }
        ExitPlan::NoViableStrategy if classification != DealClass::Pass => {
            items.push("No exit strategy qualifies; revisit pricing before any offer".to_string());
        }
        _ => {}
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::TriggeredFactor;
    use crate::analysis::exit::{ExitStrategy, RentalEstimate, TimelineCategory};

    fn valuation(spread: f64) -> ValuationResult {
        ValuationResult {
            after_repair_value: 300_000.0,
            asking_price: 172_000.0 - spread,
            repair_estimate: 20_000.0,
            arv_estimated: false,
            repairs_estimated: false,
            holding_costs: 9_000.0,
            closing_costs: 9_000.0,
            maximum_allowable_offer: 172_000.0,
            spread,
            profit_potential: 50_000.0,
            profit_percent: 30.0,
            estimated_monthly_rent: Some(2_400.0),
            estimated_cash_flow: Some(690.0),
        }
    }

    fn exit(primary: ExitPlan) -> ExitRecommendation {
        ExitRecommendation {
            primary,
            secondary: None,
            reason: String::new(),
            timeline: Some(TimelineCategory::TwoToFourWeeks),
            expected_profit: 0.0,
            rental: RentalEstimate {
                monthly_rent: 2_400.0,
                monthly_expenses: 960.0,
                monthly_payment: 750.0,
                cash_flow: 690.0,
            },
            candidates: Vec::new(),
        }
    }

    #[test]
    fn hot_deal_leads_with_offer_and_exit_plan() {
        let items = action_items(
            DealClass::Hot,
            &valuation(30_000.0),
            &RiskAssessment {
                score: 0,
                triggered_factors: Vec::new(),
            },
            &exit(ExitPlan::Strategy(ExitStrategy::Wholesale)),
            &TierThresholds::default(),
        );

        assert_eq!(items[0], "Submit offer at or below $172,000 within 24 hours");
        assert_eq!(
            items.last().map(String::as_str),
            Some("Prepare Wholesale exit plan (2-4 weeks)")
        );
    }

    #[test]
    fn marginal_deal_names_the_negotiation_gap() {
        let items = action_items(
            DealClass::Marginal,
            &valuation(9_000.0),
            &RiskAssessment {
                score: 3,
                triggered_factors: vec![TriggeredFactor {
                    factor: RiskFactor::Structural,
                    points: 3,
                }],
            },
            &exit(ExitPlan::NoViableStrategy),
            &TierThresholds::default(),
        );

        assert_eq!(
            items,
            vec![
                "Negotiate price down by $6,000 to reach a workable spread".to_string(),
                "Order a structural inspection before closing".to_string(),
                "No exit strategy qualifies; revisit pricing before any offer".to_string(),
            ]
        );
    }

    #[test]
    fn passed_deal_is_archived_without_exit_item() {
        let items = action_items(
            DealClass::Pass,
            &valuation(-10_000.0),
            &RiskAssessment {
                score: 0,
                triggered_factors: Vec::new(),
            },
            &exit(ExitPlan::Strategy(ExitStrategy::LongTermRental)),
            &TierThresholds::default(),
        );

        assert_eq!(
            items,
            vec!["Archive lead; re-evaluate if the price drops below $172,000".to_string()]
        );
    }
}
