use std::io::Read;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::domain::{Gender, RiskLabel};
use super::scoring::{RiskScorer, ScoringError};
use super::validation::{RawRecord, Validator};

/// Scored row of a CSV upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub patient_id: String,
    pub age: u8,
    pub gender: Gender,
    pub risk_level: RiskLabel,
    pub probability: f64,
}

/// Row that failed validation; `row` is the 1-based data row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub total_patients: usize,
    pub processed: usize,
    pub errors: usize,
    pub results: Vec<BatchResult>,
    pub validation_errors: Vec<RowError>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
    #[error("{source}")]
    Scoring {
        row: usize,
        #[source]
        source: ScoringError,
    },
}

impl BatchError {
    /// Whether the upload itself is at fault, as opposed to the scorer.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BatchError::Csv(_) | BatchError::MissingColumns(_))
    }
}

pub(crate) fn patient_id(row: usize) -> String {
    format!("P{row:03}")
}

pub(crate) fn assess_rows<R: Read>(
    reader: R,
    validator: &Validator,
    scorer: &dyn RiskScorer,
) -> Result<BatchReport, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.to_ascii_lowercase())
        .collect();

    let missing: Vec<&'static str> = validator
        .required_fields()
        .into_iter()
        .filter(|field| !headers.iter().any(|header| header == field))
        .collect();
    if !missing.is_empty() {
        return Err(BatchError::MissingColumns(missing));
    }

    let mut report = BatchReport::default();

    for (index, record) in csv_reader.records().enumerate() {
        let row = index + 1;
        report.total_patients += 1;

        let record = match record {
            Ok(record) => record,
            Err(err) => {
                report.validation_errors.push(RowError {
                    row,
                    error: format!("Malformed CSV row: {err}"),
                });
                continue;
            }
        };

        let raw: RawRecord = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
            .collect();

        let patient = match validator.validate(&raw) {
            Ok(patient) => patient,
            Err(err) => {
                debug!(row, reason = %err, "batch row rejected");
                report.validation_errors.push(RowError {
                    row,
                    error: err.to_string(),
                });
                continue;
            }
        };

        let assessment = scorer
            .score(&patient)
            .map_err(|source| BatchError::Scoring { row, source })?;

        report.results.push(BatchResult {
            patient_id: patient_id(row),
            age: patient.age,
            gender: patient.gender,
            risk_level: assessment.risk_level,
            probability: assessment.probability,
        });
    }

    report.processed = report.results.len();
    report.errors = report.validation_errors.len();

    info!(
        total = report.total_patients,
        processed = report.processed,
        errors = report.errors,
        scorer = scorer.kind().label(),
        "csv batch assessed"
    );

    Ok(report)
}
