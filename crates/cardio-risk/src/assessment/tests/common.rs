use std::sync::Arc;

use serde_json::{json, Value};

use crate::assessment::scoring::{FeatureVector, ModelError, ModelScorer, ProbabilityModel, ScalingTable};
use crate::assessment::{AssessmentService, PatientRecord, RawRecord, Validator};

pub(super) const CORE_HEADER: &str = "age,gender,height,weight,systolic,diastolic,cholesterol,glucose,smoking,alcohol,physical_activity";

pub(super) fn raw_from(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

/// 55-year-old male smoker with borderline hypertension.
pub(super) fn example_raw() -> RawRecord {
    raw_from(json!({
        "age": 55,
        "gender": "male",
        "height": 175,
        "weight": 82,
        "systolic": 140,
        "diastolic": 90,
        "cholesterol": "above_normal",
        "glucose": "normal",
        "smoking": "yes",
        "alcohol": "no",
        "physical_activity": "no"
    }))
}

/// Healthy 30-year-old woman.
pub(super) fn low_risk_raw() -> RawRecord {
    raw_from(json!({
        "age": 30,
        "gender": "female",
        "height": 165,
        "weight": 58,
        "systolic": 112,
        "diastolic": 72,
        "cholesterol": "normal",
        "glucose": "normal",
        "smoking": "no",
        "alcohol": "no",
        "physical_activity": "yes"
    }))
}

pub(super) fn clinical_raw() -> RawRecord {
    let mut raw = example_raw();
    raw.insert("total_cholesterol".to_string(), json!(240));
    raw.insert("hdl".to_string(), json!(35));
    raw.insert("fasting_blood_sugar".to_string(), json!(110));
    raw.insert("abdominal_circumference".to_string(), json!(104));
    raw.insert("diabetes".to_string(), json!("no"));
    raw.insert("family_history".to_string(), json!("yes"));
    raw
}

pub(super) fn example_record() -> PatientRecord {
    Validator::core()
        .validate(&example_raw())
        .expect("example record is valid")
}

pub(super) fn clinical_record() -> PatientRecord {
    Validator::with_clinical_panel()
        .validate(&clinical_raw())
        .expect("clinical record is valid")
}

/// Classifier stub returning a constant probability.
pub(super) struct FixedProbability(pub f64);

impl ProbabilityModel for FixedProbability {
    fn predict_probability(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
        Ok(self.0)
    }
}

pub(super) fn model_service(probability: f64) -> AssessmentService {
    let scorer = ModelScorer::new(Arc::new(FixedProbability(probability)), ScalingTable::default());
    AssessmentService::new(Arc::new(scorer))
}

pub(super) fn unloaded_model_service() -> AssessmentService {
    AssessmentService::new(Arc::new(ModelScorer::unloaded()))
}
