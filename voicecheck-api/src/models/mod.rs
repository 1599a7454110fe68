//! Request and response bodies

pub mod language;

pub use language::Language;

use serde::{Deserialize, Serialize};
use voicecheck_core::Classification;

/// POST /detect body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Encoded audio clip (any container the decoder can probe)
    pub audio_base64: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// POST /detect success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub classification: Classification,
    pub confidence: f64,
    pub language: Language,
    pub explanation: String,
}
