mod model;
mod rules;

pub use model::{
    BloodPressureCategory, DerivedFeatures, FeatureVector, LogisticRegression, ModelArtifact,
    ModelError, ModelScorer, ProbabilityModel, ScalingParams, ScalingTable, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use rules::RuleBasedScorer;

use super::domain::{PatientRecord, RiskAssessment};
use serde::{Deserialize, Serialize};

/// Selects which scoring strategy answers predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Rules,
    Model,
}

impl ScorerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rules" | "rule" | "rule_based" => Some(Self::Rules),
            "model" | "classifier" => Some(Self::Model),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScorerKind::Rules => "rules",
            ScorerKind::Model => "model",
        }
    }
}

/// Scoring failures surfaced to callers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("model not loaded")]
    ModelUnavailable,
    #[error("record is missing the {0} required by the model scorer")]
    IncompleteRecord(&'static str),
    #[error("classifier failed: {0}")]
    Model(String),
}

/// Common seam for the rule-based and model-based strategies.
pub trait RiskScorer: Send + Sync {
    fn kind(&self) -> ScorerKind;
    fn score(&self, record: &PatientRecord) -> Result<RiskAssessment, ScoringError>;
}
