//! Voice origin detection endpoint
//!
//! Order of checks: bearer token, JSON body, language, base64, then
//! decoding and analysis on a blocking thread.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::models::{DetectRequest, DetectResponse, Language};
use crate::{ApiError, ApiResult, AppState};

/// POST /detect
pub async fn detect(
    State(state): State<AppState>,
    _auth: BearerAuth,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> ApiResult<Json<DetectResponse>> {
    let request_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let language = Language::from_request(request.language.as_deref())?;

    let audio = STANDARD
        .decode(request.audio_base64.trim())
        .map_err(|_| ApiError::BadRequest("Invalid base64 encoding".to_string()))?;

    info!(%request_id, %language, bytes = audio.len(), "Detection request");

    let analyzer = state.analyzer.clone();
    let analysis = tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&audio))
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {}", e)))?
        .map_err(|e| {
            warn!(%request_id, error = %e, "Detection failed");
            ApiError::from(e)
        })?;

    info!(
        %request_id,
        classification = %analysis.verdict.classification,
        confidence = analysis.verdict.confidence,
        score = analysis.assessment.score,
        "Detection complete"
    );

    Ok(Json(DetectResponse {
        classification: analysis.verdict.classification,
        confidence: analysis.verdict.confidence,
        language,
        explanation: analysis.verdict.explanation,
    }))
}

pub fn detect_routes() -> Router<AppState> {
    Router::new().route("/detect", post(detect))
}
