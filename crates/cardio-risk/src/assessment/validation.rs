use serde_json::{Map, Value};

use super::domain::{fields, ClinicalPanel, Gender, MetricLevel, PatientRecord};
use super::scoring::ScorerKind;

/// Untyped field map as received from a JSON body or a CSV row.
pub type RawRecord = Map<String, Value>;

/// Reasons a raw record is rejected. `Display` is the client-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No data provided")]
    EmptyRecord,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid numeric value for {field}")]
    InvalidNumeric { field: &'static str },
    #[error("{message}")]
    OutOfRange {
        field: &'static str,
        message: &'static str,
    },
    #[error("{message}")]
    InvalidCategory {
        field: &'static str,
        message: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::EmptyRecord => None,
            ValidationError::MissingField(field)
            | ValidationError::InvalidNumeric { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidCategory { field, .. } => Some(field),
        }
    }
}

struct NumericRule {
    field: &'static str,
    min: f64,
    max: f64,
    whole: bool,
    message: &'static str,
}

impl NumericRule {
    fn check(&self, raw: &RawRecord) -> Result<f64, ValidationError> {
        let value = raw
            .get(self.field)
            .and_then(numeric)
            .filter(|value| !self.whole || value.fract() == 0.0)
            .ok_or(ValidationError::InvalidNumeric { field: self.field })?;

        if value < self.min || value > self.max {
            return Err(ValidationError::OutOfRange {
                field: self.field,
                message: self.message,
            });
        }

        Ok(value)
    }
}

const AGE: NumericRule = NumericRule {
    field: fields::AGE,
    min: 1.0,
    max: 120.0,
    whole: true,
    message: "Age must be between 1 and 120",
};

const HEIGHT: NumericRule = NumericRule {
    field: fields::HEIGHT,
    min: 50.0,
    max: 250.0,
    whole: false,
    message: "Height must be between 50 and 250 cm",
};

const WEIGHT: NumericRule = NumericRule {
    field: fields::WEIGHT,
    min: 20.0,
    max: 300.0,
    whole: false,
    message: "Weight must be between 20 and 300 kg",
};

const SYSTOLIC: NumericRule = NumericRule {
    field: fields::SYSTOLIC,
    min: 70.0,
    max: 250.0,
    whole: true,
    message: "Systolic BP must be between 70 and 250 mmHg",
};

const DIASTOLIC: NumericRule = NumericRule {
    field: fields::DIASTOLIC,
    min: 40.0,
    max: 150.0,
    whole: true,
    message: "Diastolic BP must be between 40 and 150 mmHg",
};

const TOTAL_CHOLESTEROL: NumericRule = NumericRule {
    field: fields::TOTAL_CHOLESTEROL,
    min: 100.0,
    max: 400.0,
    whole: false,
    message: "Total cholesterol must be between 100 and 400 mg/dL",
};

const HDL: NumericRule = NumericRule {
    field: fields::HDL,
    min: 20.0,
    max: 100.0,
    whole: false,
    message: "HDL must be between 20 and 100 mg/dL",
};

const FASTING_BLOOD_SUGAR: NumericRule = NumericRule {
    field: fields::FASTING_BLOOD_SUGAR,
    min: 50.0,
    max: 400.0,
    whole: false,
    message: "Fasting blood sugar must be between 50 and 400 mg/dL",
};

const ABDOMINAL_CIRCUMFERENCE: NumericRule = NumericRule {
    field: fields::ABDOMINAL_CIRCUMFERENCE,
    min: 40.0,
    max: 200.0,
    whole: false,
    message: "Abdominal circumference must be between 40 and 200 cm",
};

/// Checks presence, numeric ranges, and categorical membership, stopping at
/// the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    clinical_panel: bool,
}

impl Validator {
    /// Validates the eleven core fields only.
    pub fn core() -> Self {
        Self {
            clinical_panel: false,
        }
    }

    /// Also requires the laboratory and history fields.
    pub fn with_clinical_panel() -> Self {
        Self {
            clinical_panel: true,
        }
    }

    pub fn for_scorer(kind: ScorerKind) -> Self {
        match kind {
            ScorerKind::Rules => Self::core(),
            ScorerKind::Model => Self::with_clinical_panel(),
        }
    }

    pub fn requires_clinical_panel(&self) -> bool {
        self.clinical_panel
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        let mut required = fields::CORE.to_vec();
        if self.clinical_panel {
            required.extend_from_slice(&fields::CLINICAL);
        }
        required
    }

    pub fn validate(&self, raw: &RawRecord) -> Result<PatientRecord, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyRecord);
        }

        if let Some(missing) = self
            .required_fields()
            .into_iter()
            .find(|field| !is_present(raw.get(*field)))
        {
            return Err(ValidationError::MissingField(missing));
        }

        let age = AGE.check(raw)?;
        let height_cm = HEIGHT.check(raw)?;
        let weight_kg = WEIGHT.check(raw)?;
        let systolic = SYSTOLIC.check(raw)?;
        let diastolic = DIASTOLIC.check(raw)?;

        let lab_values = if self.clinical_panel {
            Some((
                TOTAL_CHOLESTEROL.check(raw)?,
                HDL.check(raw)?,
                FASTING_BLOOD_SUGAR.check(raw)?,
                ABDOMINAL_CIRCUMFERENCE.check(raw)?,
            ))
        } else {
            None
        };

        let gender = category(
            raw,
            fields::GENDER,
            Gender::parse,
            "Gender must be 'male' or 'female'",
        )?;
        let cholesterol = category(
            raw,
            fields::CHOLESTEROL,
            MetricLevel::parse,
            "Invalid cholesterol level",
        )?;
        let glucose = category(
            raw,
            fields::GLUCOSE,
            MetricLevel::parse,
            "Invalid glucose level",
        )?;
        let smoking = category(
            raw,
            fields::SMOKING,
            parse_yes_no,
            "Smoking must be 'yes' or 'no'",
        )?;
        let alcohol = category(
            raw,
            fields::ALCOHOL,
            parse_yes_no,
            "Alcohol must be 'yes' or 'no'",
        )?;
        let physical_activity = category(
            raw,
            fields::PHYSICAL_ACTIVITY,
            parse_yes_no,
            "Physical activity must be 'yes' or 'no'",
        )?;

        let clinical = match lab_values {
            Some((total_cholesterol, hdl, fasting_blood_sugar, abdominal_circumference_cm)) => {
                let diabetes = category(
                    raw,
                    fields::DIABETES,
                    parse_yes_no,
                    "Diabetes must be 'yes' or 'no'",
                )?;
                let family_history = category(
                    raw,
                    fields::FAMILY_HISTORY,
                    parse_yes_no,
                    "Family history must be 'yes' or 'no'",
                )?;
                Some(ClinicalPanel {
                    total_cholesterol,
                    hdl,
                    fasting_blood_sugar,
                    abdominal_circumference_cm,
                    diabetes,
                    family_history,
                })
            }
            None => None,
        };

        Ok(PatientRecord {
            age: age as u8,
            gender,
            height_cm,
            weight_kg,
            systolic: systolic as u16,
            diastolic: diastolic as u16,
            cholesterol,
            glucose,
            smoking,
            alcohol,
            physical_activity,
            clinical,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::core()
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite())
}

fn normalized_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_ascii_lowercase()),
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn category<T>(
    raw: &RawRecord,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    message: &'static str,
) -> Result<T, ValidationError> {
    raw.get(field)
        .and_then(normalized_text)
        .and_then(|text| parse(&text))
        .ok_or(ValidationError::InvalidCategory { field, message })
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}
