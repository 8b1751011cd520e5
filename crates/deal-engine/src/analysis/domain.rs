use std::fmt;

use serde::{Deserialize, Serialize};

use super::exit::{ExitPlan, ExitRecommendation, ExitStrategy};

/// Identifier wrapper for property records owned by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyLocation {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Raw financial inputs. Absent ARV and repair figures are estimated during valuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFinancials {
    pub asking_price: Option<f64>,
    pub after_repair_value: Option<f64>,
    pub repair_estimate: Option<f64>,
    pub square_footage: Option<u32>,
    pub year_built: Option<u16>,
}

/// Typed listing record as handed over by the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: PropertyId,
    #[serde(default)]
    pub location: PropertyLocation,
    #[serde(default)]
    pub financials: PropertyFinancials,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub occupancy: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    /// Comparable sales activity around the property, 0-100.
    #[serde(default)]
    pub market_volume_score: Option<f64>,
    /// How quickly comparable listings go under contract, 0-100.
    #[serde(default)]
    pub velocity_score: Option<f64>,
    /// Cells the ingestion boundary could not read. Any entry fails validation.
    #[serde(skip)]
    pub rejected_cells: Vec<RejectedCell>,
}

/// A source cell that did not parse into its typed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCell {
    pub field: &'static str,
    pub value: String,
}

impl PropertyRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: PropertyId(id.into()),
            location: PropertyLocation::default(),
            financials: PropertyFinancials::default(),
            notes: None,
            occupancy: None,
            condition: None,
            market_volume_score: None,
            velocity_score: None,
            rejected_cells: Vec::new(),
        }
    }
}

/// Economic valuation derived once per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub after_repair_value: f64,
    pub asking_price: f64,
    pub repair_estimate: f64,
    pub arv_estimated: bool,
    pub repairs_estimated: bool,
    pub holding_costs: f64,
    pub closing_costs: f64,
    pub maximum_allowable_offer: f64,
    pub spread: f64,
    pub profit_potential: f64,
    pub profit_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_monthly_rent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cash_flow: Option<f64>,
}

impl ValuationResult {
    /// Name of the first quantity that is NaN or infinite, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let quantities = [
            ("after_repair_value", Some(self.after_repair_value)),
            ("asking_price", Some(self.asking_price)),
            ("repair_estimate", Some(self.repair_estimate)),
            ("holding_costs", Some(self.holding_costs)),
            ("closing_costs", Some(self.closing_costs)),
            ("maximum_allowable_offer", Some(self.maximum_allowable_offer)),
            ("spread", Some(self.spread)),
            ("profit_potential", Some(self.profit_potential)),
            ("profit_percent", Some(self.profit_percent)),
            ("estimated_monthly_rent", self.estimated_monthly_rent),
            ("estimated_cash_flow", self.estimated_cash_flow),
        ];

        quantities
            .into_iter()
            .find(|(_, value)| value.is_some_and(|value| !value.is_finite()))
            .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighRepairCost,
    Structural,
    LegalIssues,
    LocationConcern,
    Age,
}

impl RiskFactor {
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighRepairCost => "High repair cost",
            Self::Structural => "Foundation/structural",
            Self::LegalIssues => "Legal issues",
            Self::LocationConcern => "Location concern",
            Self::Age => "Age",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredFactor {
    pub factor: RiskFactor,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Clamped to 0..=10, 0 being the lowest risk.
    pub score: u8,
    pub triggered_factors: Vec<TriggeredFactor>,
}

impl RiskAssessment {
    pub fn has(&self, factor: RiskFactor) -> bool {
        self.triggered_factors
            .iter()
            .any(|triggered| triggered.factor == factor)
    }
}

/// Deal tier. Declaration order is priority order, so `Ord` sorts HOT first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealClass {
    Hot,
    Solid,
    Marginal,
    Pass,
}

impl DealClass {
    pub const fn ordered() -> [Self; 4] {
        [Self::Hot, Self::Solid, Self::Marginal, Self::Pass]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Hot => "HOT",
            Self::Solid => "SOLID",
            Self::Marginal => "MARGINAL",
            Self::Pass => "PASS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn derive(classification: DealClass, deal_score: u8) -> Self {
        match classification {
            DealClass::Hot => Self::High,
            DealClass::Solid if deal_score >= 70 => Self::High,
            DealClass::Solid => Self::Medium,
            DealClass::Marginal if deal_score >= 50 => Self::Medium,
            DealClass::Marginal | DealClass::Pass => Self::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Primary output of an analysis run. Built fresh on every run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealVerdict {
    pub property_id: PropertyId,
    pub classification: DealClass,
    pub deal_score: u8,
    pub priority: Priority,
    pub valuation: ValuationResult,
    pub risk: RiskAssessment,
    pub exit: ExitRecommendation,
    pub action_items: Vec<String>,
}

impl DealVerdict {
    pub fn recommended_exit_strategy(&self) -> Option<ExitStrategy> {
        match self.exit.primary {
            ExitPlan::Strategy(strategy) => Some(strategy),
            ExitPlan::NoViableStrategy => None,
        }
    }

    pub fn alternate_exit_strategy(&self) -> Option<ExitStrategy> {
        self.exit.secondary
    }
}

/// Renders whole-dollar amounts with thousands separators, e.g. `-$12,500`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
