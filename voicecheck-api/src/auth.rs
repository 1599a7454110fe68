//! Bearer-token authentication
//!
//! The configured key is stored only as the SHA-256 digest of the full
//! expected header value (`Bearer <key>`). Presented headers are hashed the
//! same way and the two digests compared with an XOR fold, so timing does
//! not depend on where the strings differ or on their lengths.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::{ApiError, AppState};

/// Expected `Authorization` header, kept as a digest
#[derive(Clone)]
pub struct ApiKey {
    digest: [u8; 32],
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

fn sha256(value: &[u8]) -> [u8; 32] {
    Sha256::digest(value).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

impl ApiKey {
    pub fn new(key: &str) -> Self {
        Self {
            digest: sha256(format!("Bearer {}", key).as_bytes()),
        }
    }

    /// Case-sensitive exact match of the whole header value
    pub fn matches_header(&self, header_value: &[u8]) -> bool {
        constant_time_eq(&self.digest, &sha256(header_value))
    }
}

/// Extractor that succeeds only for a valid bearer token
///
/// Runs on request parts, before any body is read.
#[derive(Debug, Clone, Copy)]
pub struct BearerAuth;

#[async_trait]
impl FromRequestParts<AppState> for BearerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            warn!(path = %parts.uri.path(), "Request without Authorization header");
            return Err(ApiError::Unauthorized("Invalid or missing API key".to_string()));
        };

        if state.api_key.matches_header(value.as_bytes()) {
            Ok(BearerAuth)
        } else {
            warn!(path = %parts.uri.path(), "Request with invalid API key");
            Err(ApiError::Unauthorized("Invalid or missing API key".to_string()))
        }
    }
}
