use super::config::ValuationConfig;
use super::domain::{PropertyId, PropertyRecord, ValuationResult};
use super::error::InputError;

/// `MAO = arv * arvMultiplier - repairs - holding - closing`, floored at zero.
pub fn compute_mao(arv: f64, repair_estimate: f64, config: &ValuationConfig) -> f64 {
    let closing_costs = arv * config.closing_cost_percent;
    let mao = arv * config.arv_multiplier - repair_estimate - config.holding_costs() - closing_costs;
    mao.max(0.0)
}

/// Signed profit after purchase, repairs, carrying, closing and selling costs.
pub fn compute_profit_potential(
    arv: f64,
    asking_price: f64,
    repair_estimate: f64,
    config: &ValuationConfig,
) -> f64 {
    let closing_costs = arv * config.closing_cost_percent;
    let selling_costs = arv * config.selling_cost_percent;
    arv - (asking_price + repair_estimate + config.holding_costs() + closing_costs + selling_costs)
}

pub fn estimate_arv(asking_price: f64, config: &ValuationConfig) -> f64 {
    asking_price * config.arv_estimate_multiplier
}

pub fn estimate_repairs(square_footage: u32, per_sqft_rate: f64) -> f64 {
    f64::from(square_footage) * per_sqft_rate
}

/// Profit as a percentage of the asking price; zero when there is no usable denominator.
pub fn profit_percent(profit: f64, asking_price: f64) -> f64 {
    if asking_price > 0.0 {
        profit / asking_price * 100.0
    } else {
        0.0
    }
}

/// Values a record, estimating ARV and repairs only where the record leaves them out.
pub fn appraise(
    record: &PropertyRecord,
    config: &ValuationConfig,
) -> Result<ValuationResult, InputError> {
    let financials = &record.financials;
    let asking_price = checked_amount(&record.id, "asking_price", financials.asking_price)?;
    let explicit_arv = checked_amount(&record.id, "after_repair_value", financials.after_repair_value)?;
    let explicit_repairs = checked_amount(&record.id, "repair_estimate", financials.repair_estimate)?;

    let (after_repair_value, arv_estimated) = match (explicit_arv, asking_price) {
        (Some(arv), _) => (arv, false),
        (None, Some(asking)) => (estimate_arv(asking, config), true),
        (None, None) => {
            return Err(InputError {
                property_id: record.id.clone(),
                field: "asking_price",
                reason: "neither asking price nor after-repair value provided".to_string(),
            })
        }
    };
    let asking_price = asking_price.unwrap_or(0.0);

    let (repair_estimate, repairs_estimated) = match explicit_repairs {
        Some(repairs) => (repairs, false),
        None => (
            estimate_repairs(
                financials.square_footage.unwrap_or(0),
                config.repair_cost_per_sqft,
            ),
            true,
        ),
    };

    let maximum_allowable_offer = compute_mao(after_repair_value, repair_estimate, config);
    let profit_potential =
        compute_profit_potential(after_repair_value, asking_price, repair_estimate, config);

    Ok(ValuationResult {
        after_repair_value,
        asking_price,
        repair_estimate,
        arv_estimated,
        repairs_estimated,
        holding_costs: config.holding_costs(),
        closing_costs: after_repair_value * config.closing_cost_percent,
        maximum_allowable_offer,
        spread: maximum_allowable_offer - asking_price,
        profit_potential,
        profit_percent: profit_percent(profit_potential, asking_price),
        estimated_monthly_rent: None,
        estimated_cash_flow: None,
    })
}

fn checked_amount(
    property_id: &PropertyId,
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, InputError> {
    match value {
        Some(amount) if !amount.is_finite() => Err(InputError {
            property_id: property_id.clone(),
            field,
            reason: "not a finite amount".to_string(),
        }),
        Some(amount) if amount < 0.0 => Err(InputError {
            property_id: property_id.clone(),
            field,
            reason: format!("negative amount {amount}"),
        }),
        other => Ok(other),
    }
}
