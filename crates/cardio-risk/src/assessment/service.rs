use std::io::Read;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::batch::{self, BatchError, BatchReport};
use super::domain::{PatientRecord, RecommendationSet, RiskAssessment};
use super::recommendations::RecommendationGenerator;
use super::scoring::{RiskScorer, RuleBasedScorer, ScorerKind, ScoringError};
use super::validation::{RawRecord, ValidationError, Validator};

/// Validated input, its assessment, and the advice derived from both.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub prediction: RiskAssessment,
    pub recommendations: RecommendationSet,
    pub input: PatientRecord,
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Facade composing the validator, the active scorer, and the recommendation table.
pub struct AssessmentService {
    validator: Validator,
    scorer: Arc<dyn RiskScorer>,
    recommendations: RecommendationGenerator,
}

impl AssessmentService {
    /// Validation requirements follow the scorer kind.
    pub fn new(scorer: Arc<dyn RiskScorer>) -> Self {
        let validator = Validator::for_scorer(scorer.kind());
        Self::with_validator(validator, scorer)
    }

    pub fn with_validator(validator: Validator, scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            validator,
            scorer,
            recommendations: RecommendationGenerator::new(),
        }
    }

    pub fn rule_based() -> Self {
        Self::new(Arc::new(RuleBasedScorer::new()))
    }

    pub fn scorer_kind(&self) -> ScorerKind {
        self.scorer.kind()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn assess(&self, raw: &RawRecord) -> Result<AssessmentReport, AssessmentError> {
        let input = self.validator.validate(raw).inspect_err(|err| {
            debug!(reason = %err, "patient record rejected");
        })?;
        let prediction = self.scorer.score(&input)?;
        let recommendations = self.recommendations.generate(&input, &prediction);

        debug!(
            scorer = prediction.scorer.label(),
            risk_level = prediction.risk_level.label(),
            probability = prediction.probability,
            "patient assessed"
        );

        Ok(AssessmentReport {
            prediction,
            recommendations,
            input,
        })
    }

    pub fn assess_csv<R: Read>(&self, reader: R) -> Result<BatchReport, BatchError> {
        batch::assess_rows(reader, &self.validator, self.scorer.as_ref())
    }
}
