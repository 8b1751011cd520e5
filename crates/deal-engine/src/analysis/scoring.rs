//! Continuous 0-100 ranking used to order deals inside a tier.

use serde::{Deserialize, Serialize};

const SPREAD_SCALE: f64 = 50_000.0;
const PROFIT_SCALE: f64 = 50_000.0;
const RISK_PENALTY_PER_POINT: f64 = 5.0;
const MAX_RISK_PENALTY: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub spread: f64,
    pub profit: f64,
    pub asking_price: f64,
    pub risk_score: u8,
    pub arv: f64,
}

/// Unrounded weighted score. May fall outside 0..=100 and is NaN only for non-finite inputs.
pub fn weighted_score(inputs: &ScoreInputs) -> f64 {
    let spread_score = sub_score(inputs.spread / SPREAD_SCALE * 100.0);
    let profit_score = sub_score(inputs.profit / PROFIT_SCALE * 100.0);
    let roi_score = if inputs.asking_price > 0.0 {
        sub_score(inputs.profit / inputs.asking_price * 100.0 * 2.0)
    } else {
        0.0
    };
    let risk_penalty =
        (f64::from(inputs.risk_score) * RISK_PENALTY_PER_POINT).min(MAX_RISK_PENALTY);

    0.3 * spread_score + 0.3 * profit_score + 0.2 * roi_score + 0.2 * (100.0 - risk_penalty)
}

/// Clamps and rounds a weighted score into a deal score.
pub fn to_deal_score(weighted: f64) -> u8 {
    weighted.clamp(0.0, 100.0).round() as u8
}

pub fn compute_score(inputs: &ScoreInputs) -> u8 {
    to_deal_score(weighted_score(inputs))
}

fn sub_score(raw: f64) -> f64 {
    raw.clamp(0.0, 100.0)
}
