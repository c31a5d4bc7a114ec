use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::batch::{BatchError, BatchReport};
use super::domain::{PatientRecord, RecommendationSet, RiskAssessment};
use super::service::{AssessmentError, AssessmentService};
use super::validation::RawRecord;

/// Multipart form field carrying the CSV upload.
pub const UPLOAD_FIELD: &str = "file";

/// Problems with the uploaded file itself.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,
    #[error("No file selected")]
    NoFileSelected,
    #[error("File must be a CSV")]
    NotCsv,
    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub prediction: RiskAssessment,
    pub recommendations: RecommendationSet,
    pub input: PatientRecord,
    pub assessed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: BatchReport,
    pub assessed_at: DateTime<Utc>,
}

/// Router builder exposing single-record and CSV batch prediction.
pub fn assessment_router(service: Arc<AssessmentService>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/predict-csv", post(predict_csv_handler))
        .with_state(service)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<AssessmentService>>,
    payload: Result<axum::Json<Value>, JsonRejection>,
) -> Response {
    let raw: RawRecord = match payload {
        Ok(axum::Json(Value::Object(map))) => map,
        Ok(_) => RawRecord::new(),
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match service.assess(&raw) {
        Ok(report) => {
            let body = PredictionResponse {
                success: true,
                prediction: report.prediction,
                recommendations: report.recommendations,
                input: report.input,
                assessed_at: Utc::now(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(AssessmentError::Validation(error)) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(AssessmentError::Scoring(error)) => {
            tracing::error!(error = %error, "prediction failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

pub(crate) async fn predict_csv_handler(
    State(service): State<Arc<AssessmentService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(_) => Err(UploadError::NoFile),
    };
    let bytes = match upload {
        Ok(bytes) => bytes,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match service.assess_csv(bytes.as_slice()) {
        Ok(report) => {
            let body = BatchResponse {
                success: true,
                report,
                assessed_at: Utc::now(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) if error.is_client_error() => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(error) => {
            if let BatchError::Scoring { row, source } = &error {
                tracing::error!(row, error = %source, "batch prediction failed");
            }
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| UploadError::Multipart(err.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        if file_name.is_empty() {
            return Err(UploadError::NoFileSelected);
        }
        if !is_csv_file(&file_name) {
            return Err(UploadError::NotCsv);
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|err| UploadError::Multipart(err.to_string()))?;
        return Ok(bytes.to_vec());
    }

    Err(UploadError::NoFile)
}

pub(crate) fn is_csv_file(file_name: &str) -> bool {
    mime_guess::from_path(file_name)
        .iter()
        .any(|guess| guess == mime::TEXT_CSV)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
