//! Request handlers for the analysis endpoint.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use super::error::ApiError;
use crate::analyzer::{Analyzer, MIN_NOTES};
use crate::models::AnalysisResult;

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    analyzer: Arc<dyn Analyzer>,
}

impl ServerState {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Noema API is running",
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    })
}

/// Analyze a list of notes into themes and insights.
///
/// The body must be `{"notes": [string, ...]}` with at least `MIN_NOTES`
/// entries. The provider call is blocking and runs off the async workers.
pub async fn analyze(
    State(state): State<ServerState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected analyze body");
        ApiError::BadRequest
    })?;

    if request.notes.len() < MIN_NOTES {
        return Err(ApiError::BadRequest);
    }

    info!(notes = request.notes.len(), "analyze request");
    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&request.notes))
        .await
        .map_err(|e| ApiError::Analysis(format!("analysis task failed: {e}")))??;

    Ok(Json(result))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
