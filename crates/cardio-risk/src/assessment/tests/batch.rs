use super::common::*;

use crate::assessment::{AssessmentService, BatchError, Gender, RiskLabel, ScoringError};

fn csv_with_rows(rows: &[&str]) -> String {
    let mut body = String::from(CORE_HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    body
}

#[test]
fn counts_processed_and_errored_rows() {
    let csv = csv_with_rows(&[
        "55,male,175,82,140,90,above_normal,normal,yes,no,no",
        "0,female,160,60,120,80,normal,normal,no,no,yes",
        "30,female,165,58,112,72,normal,normal,no,no,yes",
        "45,other,170,70,120,80,normal,normal,no,no,yes",
        "62,female,158,75,135,85,well_above_normal,above_normal,no,yes,no",
    ]);

    let report = AssessmentService::rule_based()
        .assess_csv(csv.as_bytes())
        .expect("batch runs");

    assert_eq!(report.total_patients, 5);
    assert_eq!(report.processed, 3);
    assert_eq!(report.errors, 2);
    assert_eq!(report.results.len(), report.processed);
    assert_eq!(report.validation_errors.len(), report.errors);

    let ids: Vec<&str> = report
        .results
        .iter()
        .map(|result| result.patient_id.as_str())
        .collect();
    assert_eq!(ids, vec!["P001", "P003", "P005"]);

    assert_eq!(report.validation_errors[0].row, 2);
    assert_eq!(
        report.validation_errors[0].error,
        "Age must be between 1 and 120"
    );
    assert_eq!(report.validation_errors[1].row, 4);
    assert_eq!(
        report.validation_errors[1].error,
        "Gender must be 'male' or 'female'"
    );

    let first = &report.results[0];
    assert_eq!(first.age, 55);
    assert_eq!(first.gender, Gender::Male);
    assert_eq!(first.risk_level, RiskLabel::High);
    assert!((first.probability - 0.95).abs() < f64::EPSILON);
}

#[test]
fn empty_cells_are_reported_as_missing_fields() {
    let csv = csv_with_rows(&["55,male,175,,140,90,above_normal,normal,yes,no,no"]);

    let report = AssessmentService::rule_based()
        .assess_csv(csv.as_bytes())
        .expect("batch runs");

    assert_eq!(report.processed, 0);
    assert_eq!(
        report.validation_errors[0].error,
        "Missing required field: weight"
    );
}

#[test]
fn short_rows_do_not_abort_the_batch() {
    let csv = csv_with_rows(&[
        "55,male,175,82",
        "30,female,165,58,112,72,normal,normal,no,no,yes",
    ]);

    let report = AssessmentService::rule_based()
        .assess_csv(csv.as_bytes())
        .expect("batch runs");

    assert_eq!(report.total_patients, 2);
    assert_eq!(report.processed, 1);
    assert_eq!(
        report.validation_errors[0].error,
        "Missing required field: systolic"
    );
}

#[test]
fn headers_are_trimmed_and_reordered_columns_work() {
    let csv = "gender , age,height,weight,systolic,diastolic,cholesterol,glucose,smoking,alcohol,physical_activity,notes\n\
               female,30,165,58,112,72,normal,normal,no,no,yes,follow-up\n";

    let report = AssessmentService::rule_based()
        .assess_csv(csv.as_bytes())
        .expect("batch runs");

    assert_eq!(report.processed, 1);
    assert_eq!(report.results[0].risk_level, RiskLabel::Low);
}

#[test]
fn missing_columns_are_listed_in_required_order() {
    let csv = "age,gender,height,weight,systolic,cholesterol,glucose,smoking,alcohol\n";

    let err = AssessmentService::rule_based()
        .assess_csv(csv.as_bytes())
        .expect_err("columns missing");

    assert!(err.is_client_error());
    assert_eq!(
        err.to_string(),
        "Missing columns: diastolic, physical_activity"
    );
}

#[test]
fn empty_upload_reports_every_column() {
    let err = AssessmentService::rule_based()
        .assess_csv("".as_bytes())
        .expect_err("no header");

    match err {
        BatchError::MissingColumns(columns) => assert_eq!(columns.len(), 11),
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn model_batch_requires_clinical_columns() {
    let err = model_service(0.5)
        .assess_csv(csv_with_rows(&[]).as_bytes())
        .expect_err("clinical columns required");

    assert!(err.to_string().contains("total_cholesterol"));
}

#[test]
fn unloaded_model_aborts_batch() {
    let header = format!(
        "{CORE_HEADER},total_cholesterol,hdl,fasting_blood_sugar,abdominal_circumference,diabetes,family_history"
    );
    let csv = format!(
        "{header}\n55,male,175,82,140,90,above_normal,normal,yes,no,no,240,35,110,104,no,yes\n"
    );

    let err = unloaded_model_service()
        .assess_csv(csv.as_bytes())
        .expect_err("model missing");

    assert!(!err.is_client_error());
    match err {
        BatchError::Scoring { row, source } => {
            assert_eq!(row, 1);
            assert_eq!(source, ScoringError::ModelUnavailable);
        }
        other => panic!("expected scoring error, got {other:?}"),
    }
}

#[test]
fn model_batch_scores_rows_with_panel() {
    let header = format!(
        "{CORE_HEADER},total_cholesterol,hdl,fasting_blood_sugar,abdominal_circumference,diabetes,family_history"
    );
    let csv = format!(
        "{header}\n55,male,175,82,140,90,above_normal,normal,yes,no,no,240,35,110,104,no,yes\n\
         48,female,162,70,128,82,normal,normal,no,no,yes,190,,95,84,no,no\n"
    );

    let report = model_service(0.35)
        .assess_csv(csv.as_bytes())
        .expect("batch runs");

    assert_eq!(report.processed, 1);
    assert_eq!(report.results[0].risk_level, RiskLabel::Medium);
    assert_eq!(
        report.validation_errors[0].error,
        "Missing required field: hdl"
    );
}
