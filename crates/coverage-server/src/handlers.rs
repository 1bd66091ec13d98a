//! HTTP request handlers for the extraction service.
//!
//! Implements the extraction and health check endpoints using axum.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use coverage_domain::{FieldRecord, ModelClient, ProcedureRecord};
use coverage_extractor::{ExtractionResult, Extractor, ExtractorError};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state
pub struct AppState<L: ModelClient> {
    /// Extractor shared by all requests
    pub extractor: Arc<Extractor<L>>,
}

impl<L: ModelClient> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Extraction request
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Free-form plan text; a missing field counts as empty
    #[serde(default)]
    pub text: String,
}

/// Extraction response
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    /// Field values in schema order
    pub insurance_data: InsuranceData,
    /// Procedure records in model order
    pub procedures: Vec<ProcedureResponse>,
    /// How each response was decoded
    pub decode: DecodeSummary,
}

/// Field record serialized as a JSON object that keeps schema order
#[derive(Debug)]
pub struct InsuranceData(pub FieldRecord);

impl Serialize for InsuranceData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

/// One procedure code with its frequency limits
#[derive(Debug, Serialize)]
pub struct ProcedureResponse {
    /// Procedure code, e.g. D0120
    pub code: String,
    /// Full frequency phrase
    pub frequency: String,
    /// Total allowed usage
    pub limited_to: String,
    /// Usage per period
    pub every: String,
    /// Period named in the frequency
    pub duration: String,
}

impl From<ProcedureRecord> for ProcedureResponse {
    fn from(record: ProcedureRecord) -> Self {
        Self {
            code: record.code,
            frequency: record.frequency,
            limited_to: record.limited_to,
            every: record.every,
            duration: record.duration,
        }
    }
}

/// Decode quality per pipeline
#[derive(Debug, Serialize)]
pub struct DecodeSummary {
    /// Field response quality
    pub fields: &'static str,
    /// Procedure response quality
    pub procedures: &'static str,
}

impl From<ExtractionResult> for ExtractResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            decode: DecodeSummary {
                fields: result.field_quality.as_str(),
                procedures: result.procedure_quality.as_str(),
            },
            insurance_data: InsuranceData(result.fields),
            procedures: result.procedures.into_iter().map(Into::into).collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Model serving extractions
    pub model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request carried nothing to extract
    BadRequest(String),
    /// The model backend could not be reached
    Unavailable(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        if e.is_unavailable() {
            AppError::Unavailable(format!("Ollama service is not available: {}", e))
        } else {
            AppError::InternalError(format!("Failed to process the text: {}", e))
        }
    }
}

/// POST /extract - Extract plan fields and procedures from text
async fn extract<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError>
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    if request.text.trim().is_empty() {
        warn!("Rejected extraction request without text");
        return Err(AppError::BadRequest(
            "No text provided for extraction".to_string(),
        ));
    }

    let result = state.extractor.run(&request.text).await.map_err(|e| {
        error!("Extraction failed: {}", e);
        AppError::from(e)
    })?;

    info!(
        "Extracted {} fields and {} procedures in {} ms",
        result.fields.populated(),
        result.procedures.len(),
        result.metadata.processing_time_ms
    );

    Ok(Json(result.into()))
}

/// GET /health - Liveness check
async fn health_check<L>(State(state): State<AppState<L>>) -> Json<HealthCheckResponse>
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        model: state.extractor.model_name().to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> AxumRouter
where
    L: ModelClient + Send + Sync + 'static,
    L::Error: Into<ExtractorError>,
{
    AxumRouter::new()
        .route("/extract", post(extract::<L>))
        .route("/health", get(health_check::<L>))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use coverage_extractor::ExtractorConfig;
    use coverage_llm::MockProvider;
    use tower::ServiceExt; // for oneshot

    fn create_test_state(llm: MockProvider) -> AppState<MockProvider> {
        let extractor = Extractor::new(llm, ExtractorConfig::default()).unwrap();
        AppState {
            extractor: Arc::new(extractor),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(MockProvider::default()));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extract_ok() {
        let app = create_router(create_test_state(MockProvider::new("[]")));

        let request = Request::builder()
            .method("POST")
            .uri("/extract")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "Member ID: 12345"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_error_mapping() {
        let unavailable = AppError::from(ExtractorError::Connection("refused".to_string()));
        assert!(matches!(unavailable, AppError::Unavailable(msg) if msg.starts_with("Ollama service is not available: ")));

        let internal = AppError::from(ExtractorError::TextTooLong(10, 5));
        assert!(matches!(internal, AppError::InternalError(msg) if msg.starts_with("Failed to process the text: ")));
    }
}
