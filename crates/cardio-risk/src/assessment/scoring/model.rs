use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{RiskScorer, ScorerKind, ScoringError};
use crate::assessment::domain::{ClinicalPanel, Gender, PatientRecord, RiskAssessment, RiskLabel};

pub const FEATURE_COUNT: usize = 16;

/// Column order the classifier was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gender_male",
    "bmi",
    "waist_to_height",
    "systolic",
    "diastolic",
    "bp_category",
    "total_cholesterol",
    "hdl",
    "ldl_estimate",
    "fasting_blood_sugar",
    "smoking",
    "alcohol",
    "physical_activity",
    "diabetes",
    "family_history",
];

/// Ordinal blood pressure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
}

impl BloodPressureCategory {
    pub fn classify(systolic: u16, diastolic: u16) -> Self {
        if systolic >= 140 || diastolic >= 90 {
            Self::Stage2
        } else if systolic >= 130 || diastolic >= 80 {
            Self::Stage1
        } else if systolic >= 120 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    pub fn ordinal(&self) -> f64 {
        match self {
            Self::Normal => 0.0,
            Self::Elevated => 1.0,
            Self::Stage1 => 2.0,
            Self::Stage2 => 3.0,
        }
    }
}

/// Values computed from raw measurements before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub bmi: f64,
    pub waist_to_height: f64,
    pub bp_category: BloodPressureCategory,
    pub ldl_estimate: f64,
}

impl DerivedFeatures {
    pub fn from_record(record: &PatientRecord, panel: &ClinicalPanel) -> Self {
        Self {
            bmi: record.bmi(),
            waist_to_height: panel.abdominal_circumference_cm / record.height_cm,
            bp_category: BloodPressureCategory::classify(record.systolic, record.diastolic),
            ldl_estimate: panel.ldl_estimate(),
        }
    }
}

/// Mean and standard deviation for one continuous feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub mean: f64,
    pub std: f64,
}

impl ScalingParams {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    pub fn standardize(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Read-only standardization table for the continuous features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingTable {
    pub age: ScalingParams,
    pub bmi: ScalingParams,
    pub waist_to_height: ScalingParams,
    pub systolic: ScalingParams,
    pub diastolic: ScalingParams,
    pub total_cholesterol: ScalingParams,
    pub hdl: ScalingParams,
    pub ldl_estimate: ScalingParams,
    pub fasting_blood_sugar: ScalingParams,
}

impl Default for ScalingTable {
    fn default() -> Self {
        Self {
            age: ScalingParams::new(53.3, 6.8),
            bmi: ScalingParams::new(27.5, 5.0),
            waist_to_height: ScalingParams::new(0.55, 0.08),
            systolic: ScalingParams::new(128.0, 17.0),
            diastolic: ScalingParams::new(81.0, 9.6),
            total_cholesterol: ScalingParams::new(200.0, 40.0),
            hdl: ScalingParams::new(50.0, 15.0),
            ldl_estimate: ScalingParams::new(150.0, 38.0),
            fasting_blood_sugar: ScalingParams::new(100.0, 25.0),
        }
    }
}

impl ScalingTable {
    fn entries(&self) -> [(&'static str, ScalingParams); 9] {
        [
            ("age", self.age),
            ("bmi", self.bmi),
            ("waist_to_height", self.waist_to_height),
            ("systolic", self.systolic),
            ("diastolic", self.diastolic),
            ("total_cholesterol", self.total_cholesterol),
            ("hdl", self.hdl),
            ("ldl_estimate", self.ldl_estimate),
            ("fasting_blood_sugar", self.fasting_blood_sugar),
        ]
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (feature, params) in self.entries() {
            if !params.mean.is_finite() || !params.std.is_finite() || params.std <= 0.0 {
                return Err(ModelError::Scaling { feature });
            }
        }
        Ok(())
    }
}

/// Standardized inputs in `FEATURE_NAMES` order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn assemble(record: &PatientRecord, panel: &ClinicalPanel, scaling: &ScalingTable) -> Self {
        let derived = DerivedFeatures::from_record(record, panel);
        let flag = |value: bool| if value { 1.0 } else { 0.0 };

        let values = [
            scaling.age.standardize(f64::from(record.age)),
            flag(record.gender == Gender::Male),
            scaling.bmi.standardize(derived.bmi),
            scaling.waist_to_height.standardize(derived.waist_to_height),
            scaling.systolic.standardize(f64::from(record.systolic)),
            scaling.diastolic.standardize(f64::from(record.diastolic)),
            derived.bp_category.ordinal(),
            scaling.total_cholesterol.standardize(panel.total_cholesterol),
            scaling.hdl.standardize(panel.hdl),
            scaling.ldl_estimate.standardize(derived.ldl_estimate),
            scaling
                .fasting_blood_sugar
                .standardize(panel.fasting_blood_sugar),
            flag(record.smoking),
            flag(record.alcohol),
            flag(record.physical_activity),
            flag(panel.diabetes),
            flag(panel.family_history),
        ];

        Self { values }
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| self.values[index])
    }
}

/// Narrow seam for externally trained classifiers.
pub trait ProbabilityModel: Send + Sync {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model expects {expected} coefficients, artifact has {found}")]
    Shape { expected: usize, found: usize },
    #[error("scaling parameters for {feature} must have a finite mean and positive std")]
    Scaling { feature: &'static str },
    #[error("model produced a non-finite output")]
    NonFinite,
}

/// Linear classifier with a logistic link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Result<Self, ModelError> {
        if coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::Shape {
                expected: FEATURE_COUNT,
                found: coefficients.len(),
            });
        }
        if !intercept.is_finite() || coefficients.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (weight, value)| acc + weight * value)
    }
}

impl ProbabilityModel for LogisticRegression {
    fn predict_probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let logit = self.decision_function(features);
        let probability = 1.0 / (1.0 + (-logit).exp());
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

/// On-disk JSON form of a trained logistic model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub scaling: Option<ScalingTable>,
}

impl ModelArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn into_parts(self) -> Result<(LogisticRegression, ScalingTable), ModelError> {
        let model = LogisticRegression::new(self.intercept, self.coefficients)?;
        let scaling = self.scaling.unwrap_or_default();
        scaling.validate()?;
        Ok((model, scaling))
    }
}

/// Scores records by scaling derived features and delegating to a classifier.
pub struct ModelScorer {
    model: Option<Arc<dyn ProbabilityModel>>,
    scaling: ScalingTable,
}

impl ModelScorer {
    pub fn new(model: Arc<dyn ProbabilityModel>, scaling: ScalingTable) -> Self {
        Self {
            model: Some(model),
            scaling,
        }
    }

    /// A scorer whose classifier failed to load; every call reports it.
    pub fn unloaded() -> Self {
        Self {
            model: None,
            scaling: ScalingTable::default(),
        }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let (model, scaling) = artifact.into_parts()?;
        Ok(Self::new(Arc::new(model), scaling))
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn scaling(&self) -> &ScalingTable {
        &self.scaling
    }

    pub fn features(&self, record: &PatientRecord) -> Result<FeatureVector, ScoringError> {
        let panel = record
            .clinical
            .as_ref()
            .ok_or(ScoringError::IncompleteRecord("clinical panel"))?;
        Ok(FeatureVector::assemble(record, panel, &self.scaling))
    }
}

impl fmt::Debug for ModelScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelScorer")
            .field("loaded", &self.is_loaded())
            .field("scaling", &self.scaling)
            .finish()
    }
}

impl RiskScorer for ModelScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Model
    }

    fn score(&self, record: &PatientRecord) -> Result<RiskAssessment, ScoringError> {
        let model = self.model.as_ref().ok_or(ScoringError::ModelUnavailable)?;
        let features = self.features(record)?;

        let probability = model
            .predict_probability(&features)
            .map_err(|err| ScoringError::Model(err.to_string()))?;
        if !probability.is_finite() {
            return Err(ScoringError::Model(ModelError::NonFinite.to_string()));
        }
        let probability = probability.clamp(0.0, 1.0);

        Ok(RiskAssessment {
            risk_level: RiskLabel::from_probability(probability),
            probability,
            risk_score: (probability * 100.0).round() as u32,
            scorer: ScorerKind::Model,
            components: Vec::new(),
        })
    }
}
