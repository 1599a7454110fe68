//! voicecheck-api library interface
//!
//! Exposes the router and configuration for the server binary and for
//! integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use voicecheck_core::Analyzer;

use crate::auth::ApiKey;

/// Default cap on request bodies; clips arrive base64-encoded inside JSON
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Detection pipeline, shared by every request
    pub analyzer: Arc<Analyzer>,
    pub api_key: Arc<ApiKey>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(analyzer: Analyzer, api_key: &str) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            api_key: Arc::new(ApiKey::new(api_key)),
            startup_time: Utc::now(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .merge(api::root_routes())
        .merge(api::health_routes())
        .merge(api::detect_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
