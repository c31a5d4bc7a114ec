//! Cardiovascular risk assessment: validation, scoring, recommendations, and
//! the HTTP surface that strings them together.

pub mod batch;
pub mod domain;
pub mod recommendations;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchReport, BatchResult, RowError};
pub use domain::{
    fields, ClinicalPanel, Gender, MetricLevel, PatientRecord, RecommendationSet, RiskAssessment,
    RiskFactor, RiskLabel, ScoreComponent,
};
pub use recommendations::RecommendationGenerator;
pub use router::{assessment_router, UploadError};
pub use scoring::{
    LogisticRegression, ModelArtifact, ModelError, ModelScorer, ProbabilityModel, RiskScorer,
    RuleBasedScorer, ScorerKind, ScoringError,
};
pub use service::{AssessmentError, AssessmentReport, AssessmentService};
pub use validation::{RawRecord, ValidationError, Validator};
