use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ConfigurationError;

/// Immutable configuration for one batch run. Built once, never re-read mid-batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub valuation: ValuationConfig,
    pub risk: RiskConfig,
    pub tiers: TierThresholds,
    pub exit: ExitConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    pub arv_multiplier: f64,
    pub monthly_holding_cost: f64,
    pub holding_months: f64,
    pub closing_cost_percent: f64,
    pub selling_cost_percent: f64,
    pub arv_estimate_multiplier: f64,
    pub repair_cost_per_sqft: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            arv_multiplier: 0.70,
            monthly_holding_cost: 1_500.0,
            holding_months: 6.0,
            closing_cost_percent: 0.03,
            selling_cost_percent: 0.06,
            arv_estimate_multiplier: 1.2,
            repair_cost_per_sqft: 25.0,
        }
    }
}

impl ValuationConfig {
    pub fn holding_costs(&self) -> f64 {
        self.monthly_holding_cost * self.holding_months
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub high_repair_threshold: f64,
    pub high_repair_points: u8,
    pub structural_points: u8,
    pub legal_points: u8,
    pub location_points: u8,
    pub age_points: u8,
    pub built_before_year: u16,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_repair_threshold: 50_000.0,
            high_repair_points: 2,
            structural_points: 3,
            legal_points: 2,
            location_points: 2,
            age_points: 1,
            built_before_year: 1950,
        }
    }
}

/// Minimums a deal must clear, all conjoined, to land in a tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub min_spread: f64,
    pub min_profit_pct: f64,
    pub max_risk: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub hot: TierRule,
    pub solid: TierRule,
    pub marginal: TierRule,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            hot: TierRule {
                min_spread: 25_000.0,
                min_profit_pct: 20.0,
                max_risk: 3,
            },
            solid: TierRule {
                min_spread: 15_000.0,
                min_profit_pct: 12.0,
                max_risk: 5,
            },
            marginal: TierRule {
                min_spread: 8_000.0,
                min_profit_pct: 8.0,
                max_risk: 7,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitConfig {
    pub rent_multiplier: f64,
    pub expense_ratio: f64,
    pub payment_factor: f64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            rent_multiplier: 0.008,
            expense_ratio: 0.40,
            payment_factor: 0.005,
        }
    }
}

impl AnalysisConfig {
    /// Resolves a flat key/value mapping. Missing keys fall back to defaults; unknown keys are
    /// ignored so deployments can share one settings source with other layers.
    pub fn from_settings(settings: &BTreeMap<String, String>) -> Result<Self, ConfigurationError> {
        let reader = SettingsReader { settings };
        let defaults = Self::default();

        let valuation = ValuationConfig {
            arv_multiplier: reader.number(
                "arvMultiplier",
                defaults.valuation.arv_multiplier,
                |v| v > 0.0 && v <= 1.0,
                "must be within (0, 1]",
            )?,
            monthly_holding_cost: reader.non_negative(
                "monthlyHoldingCost",
                defaults.valuation.monthly_holding_cost,
            )?,
            holding_months: reader
                .non_negative("holdingMonths", defaults.valuation.holding_months)?,
            closing_cost_percent: reader.fraction(
                "closingCostPercent",
                defaults.valuation.closing_cost_percent,
            )?,
            selling_cost_percent: reader.fraction(
                "sellingCostPercent",
                defaults.valuation.selling_cost_percent,
            )?,
            arv_estimate_multiplier: reader.number(
                "arvEstimateMultiplier",
                defaults.valuation.arv_estimate_multiplier,
                |v| v > 0.0,
                "must be greater than 0",
            )?,
            repair_cost_per_sqft: reader.non_negative(
                "repairCostPerSqft",
                defaults.valuation.repair_cost_per_sqft,
            )?,
        };

        let risk = RiskConfig {
            high_repair_threshold: reader.non_negative(
                "risk.highRepair.threshold",
                defaults.risk.high_repair_threshold,
            )?,
            high_repair_points: reader
                .points("risk.highRepair.points", defaults.risk.high_repair_points)?,
            structural_points: reader
                .points("risk.foundation.points", defaults.risk.structural_points)?,
            legal_points: reader.points("risk.legal.points", defaults.risk.legal_points)?,
            location_points: reader
                .points("risk.location.points", defaults.risk.location_points)?,
            age_points: reader.points("risk.age.points", defaults.risk.age_points)?,
            built_before_year: reader.year(
                "risk.age.yearBuiltBefore",
                defaults.risk.built_before_year,
            )?,
        };

        let tiers = TierThresholds {
            hot: reader.tier("hot", defaults.tiers.hot)?,
            solid: reader.tier("solid", defaults.tiers.solid)?,
            marginal: reader.tier("marginal", defaults.tiers.marginal)?,
        };

        let exit = ExitConfig {
            rent_multiplier: reader.number(
                "exit.rentEstimate.multiplier",
                defaults.exit.rent_multiplier,
                |v| v > 0.0 && v < 1.0,
                "must be within (0, 1)",
            )?,
            expense_ratio: reader.number(
                "exit.expenseRatio",
                defaults.exit.expense_ratio,
                |v| (0.0..=1.0).contains(&v),
                "must be within [0, 1]",
            )?,
            payment_factor: reader
                .non_negative("exit.paymentFactor", defaults.exit.payment_factor)?,
        };

        Ok(Self {
            valuation,
            risk,
            tiers,
            exit,
        })
    }
}

struct SettingsReader<'a> {
    settings: &'a BTreeMap<String, String>,
}

impl SettingsReader<'_> {
    fn number(
        &self,
        key: &str,
        default: f64,
        in_range: impl Fn(f64) -> bool,
        range: &'static str,
    ) -> Result<f64, ConfigurationError> {
        let Some(raw) = self.settings.get(key) else {
            return Ok(default);
        };

        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ConfigurationError {
                key: key.to_string(),
                value: raw.clone(),
                reason: "not a finite number",
            })?;

        if in_range(value) {
            Ok(value)
        } else {
            Err(ConfigurationError {
                key: key.to_string(),
                value: raw.clone(),
                reason: range,
            })
        }
    }

    fn non_negative(&self, key: &str, default: f64) -> Result<f64, ConfigurationError> {
        self.number(key, default, |v| v >= 0.0, "must not be negative")
    }

    fn fraction(&self, key: &str, default: f64) -> Result<f64, ConfigurationError> {
        self.number(key, default, |v| (0.0..1.0).contains(&v), "must be within [0, 1)")
    }

    fn integer(
        &self,
        key: &str,
        default: f64,
        max: f64,
        range: &'static str,
    ) -> Result<f64, ConfigurationError> {
        self.number(
            key,
            default,
            |v| v >= 0.0 && v <= max && v.fract() == 0.0,
            range,
        )
    }

    fn points(&self, key: &str, default: u8) -> Result<u8, ConfigurationError> {
        self.integer(key, f64::from(default), 10.0, "must be a whole number within [0, 10]")
            .map(|value| value as u8)
    }

    fn year(&self, key: &str, default: u16) -> Result<u16, ConfigurationError> {
        self.integer(
            key,
            f64::from(default),
            f64::from(u16::MAX),
            "must be a whole, non-negative year",
        )
        .map(|value| value as u16)
    }

    fn tier(&self, prefix: &str, default: TierRule) -> Result<TierRule, ConfigurationError> {
        Ok(TierRule {
            min_spread: self.number(
                &format!("{prefix}MinSpread"),
                default.min_spread,
                |_| true,
                "",
            )?,
            min_profit_pct: self.number(
                &format!("{prefix}MinProfitPct"),
                default.min_profit_pct,
                |_| true,
                "",
            )?,
            max_risk: self.points(&format!("{prefix}MaxRisk"), default.max_risk)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_settings_resolve_to_defaults() {
        let config = AnalysisConfig::from_settings(&BTreeMap::new()).expect("defaults resolve");
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.valuation.holding_costs(), 9_000.0);
    }

    #[test]
    fn overrides_apply_per_key() {
        let config = AnalysisConfig::from_settings(&settings(&[
            ("arvMultiplier", "0.65"),
            ("hotMinSpread", "30000"),
            ("solidMaxRisk", "4"),
            ("exit.rentEstimate.multiplier", " 0.009 "),
            ("someOtherLayer.key", "ignored"),
        ]))
        .expect("overrides resolve");

        assert_eq!(config.valuation.arv_multiplier, 0.65);
        assert_eq!(config.tiers.hot.min_spread, 30_000.0);
        assert_eq!(config.tiers.solid.max_risk, 4);
        assert_eq!(config.exit.rent_multiplier, 0.009);
        assert_eq!(config.tiers.marginal, TierThresholds::default().marginal);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let err = AnalysisConfig::from_settings(&settings(&[("hotMinSpread", "lots")]))
            .expect_err("non-numeric rejected");
        assert_eq!(err.key, "hotMinSpread");
        assert_eq!(err.value, "lots");
        assert_eq!(err.reason, "not a finite number");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = AnalysisConfig::from_settings(&settings(&[("arvMultiplier", "1.5")]))
            .expect_err("multiplier above one rejected");
        assert_eq!(err.key, "arvMultiplier");

        let err = AnalysisConfig::from_settings(&settings(&[("risk.legal.points", "2.5")]))
            .expect_err("fractional points rejected");
        assert_eq!(err.key, "risk.legal.points");

        let err = AnalysisConfig::from_settings(&settings(&[("marginalMaxRisk", "11")]))
            .expect_err("risk ceiling above ten rejected");
        assert_eq!(err.key, "marginalMaxRisk");

        assert!(AnalysisConfig::from_settings(&settings(&[("holdingMonths", "NaN")])).is_err());
    }
}
