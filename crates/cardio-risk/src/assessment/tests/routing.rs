use super::common::*;
use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::assessment::router::{is_csv_file, predict_handler};
use crate::assessment::{assessment_router, AssessmentService};

const BOUNDARY: &str = "cardio-boundary";

fn multipart_body(field: &str, file_name: &str, contents: &str) -> Body {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {contents}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Body::from(body)
}

fn upload_request(field: &str, file_name: &str, contents: &str) -> Request<Body> {
    Request::post("/predict-csv")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(multipart_body(field, file_name, contents))
        .expect("request")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json payload")
}

#[tokio::test]
async fn predict_handler_returns_prediction_and_recommendations() {
    let service = Arc::new(AssessmentService::rule_based());

    let response = predict_handler(
        State(service),
        Ok(axum::Json(Value::Object(example_raw()))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["prediction"]["risk_level"], json!("high"));
    assert_eq!(payload["prediction"]["risk_score"], json!(110));
    assert_eq!(payload["prediction"]["probability"], json!(0.95));
    assert_eq!(payload["input"]["smoking"], json!("yes"));
    assert_eq!(payload["input"]["cholesterol"], json!("above_normal"));
    assert!(payload["recommendations"]["diet"].is_array());
    assert!(payload.get("assessed_at").is_some());
}

#[tokio::test]
async fn predict_handler_rejects_non_object_payloads() {
    let service = Arc::new(AssessmentService::rule_based());

    let response = predict_handler(State(service), Ok(axum::Json(json!([1, 2, 3])))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("No data provided"));
}

#[tokio::test]
async fn predict_route_returns_bad_request_for_missing_field() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));
    let mut raw = example_raw();
    raw.remove("diastolic");

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&raw).expect("serialize")))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("Missing required field: diastolic"));
}

#[tokio::test]
async fn predict_route_rejects_malformed_json() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"age\": "))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_route_surfaces_unloaded_model_as_internal_error() {
    let router = assessment_router(Arc::new(unloaded_model_service()));

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&clinical_raw()).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("model not loaded"));
}

#[tokio::test]
async fn predict_csv_route_reports_batch_counts() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));
    let contents = format!(
        "{CORE_HEADER}\n55,male,175,82,140,90,above_normal,normal,yes,no,no\n121,male,175,82,140,90,normal,normal,no,no,yes"
    );

    let response = router
        .oneshot(upload_request("file", "patients.csv", &contents))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["total_patients"], json!(2));
    assert_eq!(payload["processed"], json!(1));
    assert_eq!(payload["errors"], json!(1));
    assert_eq!(payload["results"][0]["patient_id"], json!("P001"));
    assert_eq!(payload["results"][0]["gender"], json!("male"));
    assert_eq!(payload["validation_errors"][0]["row"], json!(2));
}

#[tokio::test]
async fn predict_csv_route_requires_csv_extension() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(upload_request("file", "patients.xlsx", "age\n1"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("File must be a CSV"));
}

#[tokio::test]
async fn predict_csv_route_requires_file_field() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(upload_request("attachment", "patients.csv", CORE_HEADER))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("No file provided"));
}

#[tokio::test]
async fn predict_csv_route_rejects_blank_file_name() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(upload_request("file", "", CORE_HEADER))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("No file selected"));
}

#[tokio::test]
async fn predict_csv_route_reports_missing_columns() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(upload_request("file", "patients.csv", "age,gender\n55,male"))
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    let error = payload["error"].as_str().unwrap_or_default();
    assert!(error.starts_with("Missing columns: height, weight"));
}

#[tokio::test]
async fn predict_csv_route_without_multipart_reports_no_file() {
    let router = assessment_router(Arc::new(AssessmentService::rule_based()));

    let response = router
        .oneshot(
            Request::post("/predict-csv")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    assert_eq!(payload["error"], json!("No file provided"));
}

#[test]
fn csv_detection_uses_file_extension() {
    assert!(is_csv_file("patients.csv"));
    assert!(is_csv_file("PATIENTS.CSV"));
    assert!(!is_csv_file("patients.txt"));
    assert!(!is_csv_file("patients"));
}
