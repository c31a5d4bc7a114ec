use serde::{Deserialize, Serialize, Serializer};

/// Field names shared by JSON payloads, CSV headers, and echoed records.
pub mod fields {
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const HEIGHT: &str = "height";
    pub const WEIGHT: &str = "weight";
    pub const SYSTOLIC: &str = "systolic";
    pub const DIASTOLIC: &str = "diastolic";
    pub const CHOLESTEROL: &str = "cholesterol";
    pub const GLUCOSE: &str = "glucose";
    pub const SMOKING: &str = "smoking";
    pub const ALCOHOL: &str = "alcohol";
    pub const PHYSICAL_ACTIVITY: &str = "physical_activity";
    pub const TOTAL_CHOLESTEROL: &str = "total_cholesterol";
    pub const HDL: &str = "hdl";
    pub const FASTING_BLOOD_SUGAR: &str = "fasting_blood_sugar";
    pub const ABDOMINAL_CIRCUMFERENCE: &str = "abdominal_circumference";
    pub const DIABETES: &str = "diabetes";
    pub const FAMILY_HISTORY: &str = "family_history";

    /// Fields every scorer needs, in validation order.
    pub const CORE: [&str; 11] = [
        AGE,
        GENDER,
        HEIGHT,
        WEIGHT,
        SYSTOLIC,
        DIASTOLIC,
        CHOLESTEROL,
        GLUCOSE,
        SMOKING,
        ALCOHOL,
        PHYSICAL_ACTIVITY,
    ];

    /// Laboratory and history fields consumed by the model scorer.
    pub const CLINICAL: [&str; 6] = [
        TOTAL_CHOLESTEROL,
        HDL,
        FASTING_BLOOD_SUGAR,
        ABDOMINAL_CIRCUMFERENCE,
        DIABETES,
        FAMILY_HISTORY,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Three-step laboratory grading used for cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricLevel {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl MetricLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(Self::Normal),
            "above_normal" => Some(Self::AboveNormal),
            "well_above_normal" => Some(Self::WellAboveNormal),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricLevel::Normal => "normal",
            MetricLevel::AboveNormal => "above_normal",
            MetricLevel::WellAboveNormal => "well_above_normal",
        }
    }

    pub fn is_elevated(&self) -> bool {
        !matches!(self, MetricLevel::Normal)
    }
}

/// Validated patient metrics for a single assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub age: u8,
    pub gender: Gender,
    #[serde(rename = "height")]
    pub height_cm: f64,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    pub systolic: u16,
    pub diastolic: u16,
    pub cholesterol: MetricLevel,
    pub glucose: MetricLevel,
    #[serde(serialize_with = "yes_no")]
    pub smoking: bool,
    #[serde(serialize_with = "yes_no")]
    pub alcohol: bool,
    #[serde(serialize_with = "yes_no")]
    pub physical_activity: bool,
    #[serde(flatten)]
    pub clinical: Option<ClinicalPanel>,
}

impl PatientRecord {
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }
}

/// Lab values and history answers required by the model scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalPanel {
    pub total_cholesterol: f64,
    pub hdl: f64,
    pub fasting_blood_sugar: f64,
    #[serde(rename = "abdominal_circumference")]
    pub abdominal_circumference_cm: f64,
    #[serde(serialize_with = "yes_no")]
    pub diabetes: bool,
    #[serde(serialize_with = "yes_no")]
    pub family_history: bool,
}

impl ClinicalPanel {
    /// Total minus HDL. This is non-HDL cholesterol, reported as the LDL estimate.
    pub fn ldl_estimate(&self) -> f64 {
        self.total_cholesterol - self.hdl
    }
}

fn yes_no<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "yes" } else { "no" })
}

/// Coarse bucket derived from a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub const HIGH_THRESHOLD: f64 = 0.6;
    pub const MEDIUM_THRESHOLD: f64 = 0.3;

    pub fn from_probability(probability: f64) -> Self {
        if probability >= Self::HIGH_THRESHOLD {
            RiskLabel::High
        } else if probability >= Self::MEDIUM_THRESHOLD {
            RiskLabel::Medium
        } else {
            RiskLabel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::Medium => "medium",
            RiskLabel::High => "high",
        }
    }
}

/// Risk factor credited by the rule-based scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    BodyMassIndex,
    BloodPressure,
    Cholesterol,
    Glucose,
    Smoking,
    Alcohol,
    PhysicalInactivity,
    Sex,
}

/// Discrete contribution to a rule-based score, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u32,
    pub notes: String,
}

/// Outcome of a scorer run against a validated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLabel,
    pub probability: f64,
    pub risk_score: u32,
    pub scorer: super::ScorerKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ScoreComponent>,
}

/// Categorized advice returned alongside an assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationSet {
    pub diet: Vec<String>,
    pub lifestyle: Vec<String>,
    pub medical: Vec<String>,
}
