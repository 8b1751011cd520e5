use serde::{Deserialize, Serialize};

use super::{ExitProfile, RentalEstimate};

/// Fixed catalogue of exit structures the advisor can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStrategy {
    Wholesale,
    Wholetail,
    SubjectTo,
    Wraparound,
    ShortTermRental,
    MidTermRental,
    LongTermRental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineCategory {
    TwoToFourWeeks,
    ThirtyToSixtyDays,
    OneToThreeMonths,
    ThreeToSixMonths,
    OneYearPlus,
}

impl TimelineCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoToFourWeeks => "2-4 weeks",
            Self::ThirtyToSixtyDays => "30-60 days",
            Self::OneToThreeMonths => "1-3 months",
            Self::ThreeToSixMonths => "3-6 months",
            Self::OneYearPlus => "1+ years",
        }
    }
}

impl ExitStrategy {
    pub const fn catalogue() -> [Self; 7] {
        [
            Self::Wholesale,
            Self::Wholetail,
            Self::SubjectTo,
            Self::Wraparound,
            Self::ShortTermRental,
            Self::MidTermRental,
            Self::LongTermRental,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Wholesale => "Wholesale",
            Self::Wholetail => "Wholetail",
            Self::SubjectTo => "Sub2",
            Self::Wraparound => "Wraparound",
            Self::ShortTermRental => "Short-Term Rental",
            Self::MidTermRental => "Mid-Term Rental",
            Self::LongTermRental => "Long-Term Rental",
        }
    }

    pub const fn timeline(self) -> TimelineCategory {
        match self {
            Self::Wholesale => TimelineCategory::TwoToFourWeeks,
            Self::SubjectTo => TimelineCategory::ThirtyToSixtyDays,
            Self::Wholetail => TimelineCategory::OneToThreeMonths,
            Self::Wraparound => TimelineCategory::ThreeToSixMonths,
            Self::ShortTermRental | Self::MidTermRental | Self::LongTermRental => {
                TimelineCategory::OneYearPlus
            }
        }
    }

    /// Multiplier applied to monthly cash flow for strategies that hold the property.
    const fn cash_flow_multiplier(self) -> Option<f64> {
        match self {
            Self::SubjectTo => Some(1.0),
            Self::Wraparound => Some(1.5),
            Self::ShortTermRental => Some(2.0),
            Self::MidTermRental => Some(1.4),
            Self::LongTermRental => Some(1.0),
            Self::Wholesale | Self::Wholetail => None,
        }
    }

    pub fn is_eligible(self, profile: &ExitProfile, rental: &RentalEstimate) -> bool {
        let cash_flow = rental.cash_flow;
        match self {
            Self::Wholesale => profile.equity_percent >= 20.0 && profile.profit_potential > 8_000.0,
            Self::Wholetail => {
                profile.repair_estimate <= profile.arv * 0.10
                    && profile.equity_percent >= 15.0
                    && profile.velocity_score >= 60.0
            }
            Self::SubjectTo => profile.equity_percent < 20.0 && cash_flow > 0.0,
            Self::Wraparound => {
                profile.equity_percent >= 10.0 && profile.velocity_score < 50.0 && cash_flow > 0.0
            }
            Self::ShortTermRental => {
                cash_flow > 300.0
                    && profile.market_volume_score >= 60.0
                    && profile.square_footage > 0
                    && profile.square_footage <= 2_500
            }
            Self::MidTermRental => cash_flow > 200.0 && profile.market_volume_score >= 40.0,
            Self::LongTermRental => cash_flow > 100.0,
        }
    }

    /// Attractiveness of an eligible candidate: a base score plus a linear bonus.
    pub fn score(self, profile: &ExitProfile, rental: &RentalEstimate) -> f64 {
        let cash_flow = rental.cash_flow;
        match self {
            Self::Wholesale => 70.0 + profile.profit_potential / 1_000.0,
            Self::Wholetail => {
                60.0 + profile.velocity_score / 10.0 + profile.profit_potential / 2_000.0
            }
            Self::SubjectTo => 55.0 + cash_flow / 20.0,
            Self::Wraparound => 50.0 + profile.equity_percent / 2.0 + cash_flow / 50.0,
            Self::ShortTermRental => 45.0 + cash_flow * 2.0 / 25.0,
            Self::MidTermRental => 48.0 + cash_flow * 1.4 / 25.0,
            Self::LongTermRental => 50.0 + cash_flow / 20.0,
        }
    }

    pub fn expected_profit(self, profile: &ExitProfile, rental: &RentalEstimate) -> f64 {
        match self.cash_flow_multiplier() {
            Some(multiplier) => rental.cash_flow * multiplier * 12.0,
            None => profile.profit_potential,
        }
    }
}
