// src/web/api.rs
// HTTP handlers for the analysis endpoints

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use tracing::{error, info, instrument};

use crate::types::{AnalysisContext, ChangeInput};
use crate::web::state::AppState;

/// Body of `POST /api/ai-comments/analyze`
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub changes: Vec<ChangeInput>,
    pub context: Option<AnalysisContext>,
    pub parallel: Option<bool>,
    pub concurrency: Option<usize>,
}

/// Body of `POST /api/ai-comments/analyze-single`
#[derive(Debug, Deserialize)]
pub struct AnalyzeSingleRequest {
    pub change: Option<ChangeInput>,
    pub context: Option<AnalysisContext>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn require_page_context(context: Option<AnalysisContext>) -> Result<AnalysisContext, Response> {
    match context {
        Some(ctx) if !ctx.page_url.trim().is_empty() => Ok(ctx),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Context with pageUrl is required",
        )),
    }
}

fn not_configured(state: &AppState) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!(
            "LLM API key not configured. Please set {} environment variable.",
            state.provider.api_key_env_var()
        ),
    )
}

/// Analyze a batch and stream events as SSE
#[instrument(skip(state, req), fields(changes = req.changes.len()))]
pub async fn analyze(State(state): State<AppState>, Json(req): Json<AnalyzeRequest>) -> Response {
    if req.changes.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Changes array is required");
    }
    let context = match require_page_context(req.context) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let Some(analyzer) = state.analyzer.clone() else {
        return not_configured(&state);
    };

    let mut options = state.batch.clone();
    if let Some(parallel) = req.parallel {
        options.parallel = parallel;
    }
    if let Some(concurrency) = req.concurrency {
        options = options.concurrency(concurrency);
    }

    info!(page_url = %context.page_url, parallel = options.parallel, "Streaming analysis");

    let stream = analyzer
        .analyze_stream(req.changes, context, options)
        .map(|event| {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Ok::<_, Infallible>(Event::default().data(data))
        });

    (
        [("x-accel-buffering", "no")],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

/// Analyze one change and return the full result
#[instrument(skip(state, req))]
pub async fn analyze_single(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeSingleRequest>,
) -> Response {
    let Some(change) = req.change.filter(|c| !c.id.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Change object is required");
    };
    let context = match require_page_context(req.context) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let Some(analyzer) = state.analyzer.clone() else {
        return not_configured(&state);
    };

    match analyzer.analyze(&change, &context).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(change_id = %change.id, error = %e, "Single change analysis failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to analyze change",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Whether analysis is available, and with which backend
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.is_configured() {
        "configured"
    } else {
        "not_configured"
    };
    Json(json!({
        "status": status,
        "provider": state.provider.to_string(),
        "model": state.model,
    }))
}

pub async fn server_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
