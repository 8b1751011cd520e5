use super::config::RiskConfig;
use super::domain::{PropertyRecord, RiskAssessment, RiskFactor, TriggeredFactor};

pub const MAX_RISK_SCORE: u8 = 10;

/// Keyword categories scanned in the free-text notes. Each category contributes at most once.
struct KeywordCategory {
    factor: RiskFactor,
    keywords: &'static [&'static str],
}

const KEYWORD_CATEGORIES: [KeywordCategory; 3] = [
    KeywordCategory {
        factor: RiskFactor::Structural,
        keywords: &["foundation", "structural", "sinkhole", "settling", "load-bearing"],
    },
    KeywordCategory {
        factor: RiskFactor::LegalIssues,
        keywords: &["probate", "lien", "foreclosure"],
    },
    KeywordCategory {
        factor: RiskFactor::LocationConcern,
        keywords: &[
            "flood zone",
            "high crime",
            "busy road",
            "highway",
            "railroad",
            "industrial",
        ],
    },
];

/// Scores a record from its repair estimate, age and notes.
///
/// `repair_estimate` is the effective figure from valuation, so an estimated repair budget
/// counts the same as a quoted one.
pub fn assess(record: &PropertyRecord, repair_estimate: f64, config: &RiskConfig) -> RiskAssessment {
    let mut triggered_factors = Vec::new();

    if repair_estimate > config.high_repair_threshold {
        triggered_factors.push(TriggeredFactor {
            factor: RiskFactor::HighRepairCost,
            points: config.high_repair_points,
        });
    }

    let notes = record
        .notes
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !notes.trim().is_empty() {
        for category in &KEYWORD_CATEGORIES {
            if category.keywords.iter().any(|keyword| notes.contains(keyword)) {
                triggered_factors.push(TriggeredFactor {
                    factor: category.factor,
                    points: keyword_points(category.factor, config),
                });
            }
        }
    }

    if let Some(year_built) = record.financials.year_built {
        if year_built > 0 && year_built < config.built_before_year {
            triggered_factors.push(TriggeredFactor {
                factor: RiskFactor::Age,
                points: config.age_points,
            });
        }
    }

    let raw: u32 = triggered_factors
        .iter()
        .map(|factor| u32::from(factor.points))
        .sum();

    RiskAssessment {
        score: raw.min(u32::from(MAX_RISK_SCORE)) as u8,
        triggered_factors,
    }
}

fn keyword_points(factor: RiskFactor, config: &RiskConfig) -> u8 {
    match factor {
        RiskFactor::Structural => config.structural_points,
        RiskFactor::LegalIssues => config.legal_points,
        RiskFactor::LocationConcern => config.location_points,
        RiskFactor::HighRepairCost => config.high_repair_points,
        RiskFactor::Age => config.age_points,
    }
}
