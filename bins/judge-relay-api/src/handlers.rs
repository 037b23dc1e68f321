// HTTP route handlers for the relay API

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use judge_relay_common::types::SubmissionResult;
use judge_relay_engine::{LanguageDescriptor, StatusDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics;
use crate::validation::{parse_tokens, BatchSubmissionRequest, SingleSubmissionRequest};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T, M = ()> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<M>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            metadata: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RetrievalMetadata {
    pub token: String,
    pub retrieved_at: DateTime<Utc>,
    pub include_source: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchMetadata {
    pub tokens: Vec<String>,
    pub count: usize,
    pub retrieved_at: DateTime<Utc>,
    pub include_source: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceQuery {
    pub include_source: Option<String>,
}

impl SourceQuery {
    fn include_source(&self) -> bool {
        self.include_source.as_deref() != Some("false")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    pub tokens: Option<String>,
    pub include_source: Option<String>,
}

/// GET /health - Liveness plus the configured backend
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339(),
        "judge0_url": state.config.judge0_url,
    }))
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::render() {
        Ok((content_type, body)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /api/submissions/single - Run a submission and return the normalized result
pub async fn submit_single(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SingleSubmissionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SubmissionResult>>, ApiError> {
    metrics::track_request("submit_single");
    let Json(request) = payload?;
    let (submission, options) = request.validate()?;

    let request_id = Uuid::new_v4();
    info!(
        request_id = %request_id,
        language_id = submission.language_id,
        harvest = options.use_actual_as_expected,
        source_size = submission.source_code.len(),
        "Single submission received"
    );

    let timer = metrics::BACKEND_LATENCY_SECONDS
        .with_label_values(&["submit_single"])
        .start_timer();
    let result = state
        .orchestrator
        .run(&submission, options)
        .await
        .map_err(|e| ApiError::relay("Failed to create submission", e))?;
    timer.observe_duration();

    info!(
        request_id = %request_id,
        token = ?result.token,
        category = %result.execution_summary.status_category,
        "Single submission finished"
    );
    Ok(ApiResponse::ok(result))
}

/// GET /api/submissions/single/:token - Fetch and normalize one result
pub async fn get_single(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<ApiResponse<SubmissionResult, RetrievalMetadata>>, ApiError> {
    metrics::track_request("get_single");
    let include_source = query.include_source();

    let timer = metrics::BACKEND_LATENCY_SECONDS
        .with_label_values(&["get_single"])
        .start_timer();
    let mut result = state
        .orchestrator
        .get(&token)
        .await
        .map_err(|e| ApiError::relay("Failed to get submission result", e))?;
    timer.observe_duration();

    if !include_source {
        result = result.without_source();
    }

    Ok(Json(ApiResponse {
        success: true,
        data: result,
        metadata: Some(RetrievalMetadata {
            token,
            retrieved_at: Utc::now(),
            include_source,
        }),
    }))
}

/// POST /api/submissions/batch - Create up to the configured number of submissions
pub async fn submit_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchSubmissionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    metrics::track_request("submit_batch");
    let Json(request) = payload?;
    let submissions = request.validate(state.config.max_batch_size)?;

    info!(count = submissions.len(), "Batch submission received");

    let timer = metrics::BACKEND_LATENCY_SECONDS
        .with_label_values(&["submit_batch"])
        .start_timer();
    let response = state
        .orchestrator
        .batch_submit(&submissions)
        .await
        .map_err(|e| ApiError::relay("Failed to create batch submissions", e))?;
    timer.observe_duration();

    Ok(ApiResponse::ok(response))
}

/// GET /api/submissions/batch?tokens=a,b - Fetch and normalize several results
pub async fn get_batch(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BatchQuery>,
) -> Result<Json<ApiResponse<Vec<SubmissionResult>, BatchMetadata>>, ApiError> {
    metrics::track_request("get_batch");
    let tokens = parse_tokens(query.tokens.as_deref())?;
    let include_source = query.include_source.as_deref() != Some("false");

    let timer = metrics::BACKEND_LATENCY_SECONDS
        .with_label_values(&["get_batch"])
        .start_timer();
    let mut results = state
        .orchestrator
        .batch_get(&tokens)
        .await
        .map_err(|e| ApiError::relay("Failed to get batch submission results", e))?;
    timer.observe_duration();

    if !include_source {
        results = results.into_iter().map(SubmissionResult::without_source).collect();
    }

    let count = results.len();
    Ok(Json(ApiResponse {
        success: true,
        data: results,
        metadata: Some(BatchMetadata {
            tokens,
            count,
            retrieved_at: Utc::now(),
            include_source,
        }),
    }))
}

/// GET /api/submissions/languages
pub async fn list_languages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LanguageDescriptor>>>, ApiError> {
    metrics::track_request("list_languages");
    let languages = state
        .orchestrator
        .languages()
        .await
        .map_err(|e| ApiError::relay("Failed to get supported languages", e))?;
    Ok(ApiResponse::ok(languages))
}

/// GET /api/submissions/statuses
pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<StatusDescriptor>>>, ApiError> {
    metrics::track_request("list_statuses");
    let statuses = state
        .orchestrator
        .statuses()
        .await
        .map_err(|e| ApiError::relay("Failed to get statuses", e))?;
    Ok(ApiResponse::ok(statuses))
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
