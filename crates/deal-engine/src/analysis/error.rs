use serde::{Deserialize, Serialize};

use super::domain::PropertyId;

/// Pipeline stage names used to locate computation defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    Validation,
    Valuation,
    Scoring,
    ExitStrategy,
}

impl AnalysisStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Valuation => "valuation",
            Self::Scoring => "scoring",
            Self::ExitStrategy => "exit_strategy",
        }
    }
}

/// A record cannot be analysed because a required input is missing or malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("property {property_id}: invalid {field} ({reason})")]
pub struct InputError {
    pub property_id: PropertyId,
    pub field: &'static str,
    pub reason: String,
}

/// A configuration key resolved to a value the engine cannot use. Fatal to the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("setting '{key}' has unusable value '{value}': {reason}")]
pub struct ConfigurationError {
    pub key: String,
    pub value: String,
    pub reason: &'static str,
}

/// An arithmetic path produced NaN or infinity. Always a logic defect.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("property {property_id}: non-finite {quantity} during {}", .stage.label())]
pub struct ComputationError {
    pub property_id: PropertyId,
    pub stage: AnalysisStage,
    pub quantity: &'static str,
}

/// Failure of a single record's analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl AnalysisError {
    pub fn property_id(&self) -> &PropertyId {
        match self {
            AnalysisError::Input(err) => &err.property_id,
            AnalysisError::Computation(err) => &err.property_id,
        }
    }

    pub fn stage(&self) -> AnalysisStage {
        match self {
            AnalysisError::Input(_) => AnalysisStage::Validation,
            AnalysisError::Computation(err) => err.stage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Input,
    Computation,
}

/// Serializable account of a skipped record for batch summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub property_id: PropertyId,
    pub kind: FailureKind,
    pub stage: AnalysisStage,
    pub message: String,
}

impl From<&AnalysisError> for RecordFailure {
    fn from(error: &AnalysisError) -> Self {
        let kind = match error {
            AnalysisError::Input(_) => FailureKind::Input,
            AnalysisError::Computation(_) => FailureKind::Computation,
        };

        Self {
            property_id: error.property_id().clone(),
            kind,
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

pub(crate) fn ensure_finite(
    property_id: &PropertyId,
    stage: AnalysisStage,
    quantity: &'static str,
    value: f64,
) -> Result<f64, ComputationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationError {
            property_id: property_id.clone(),
            stage,
            quantity,
        })
    }
}
