//! Service description at `/`

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::models::Language;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub supported_languages: Vec<String>,
    pub endpoint: String,
    pub rule_set: String,
}

/// GET /
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Voice Detection API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        supported_languages: Language::names().into_iter().map(String::from).collect(),
        endpoint: "/detect".to_string(),
        rule_set: state.analyzer.rules().name.clone(),
    })
}

pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}
