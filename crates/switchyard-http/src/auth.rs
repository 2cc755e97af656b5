//! API-key authentication for the gateway's caller-facing surface.
//!
//! Keys are stored as SHA-256 digests so raw key material never sits in
//! memory longer than construction, and verification compares fixed-width
//! digests rather than variable-length strings.

use crate::routes::AppState;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::warn;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Configured API keys, held as digests.
pub struct AuthState {
    key_digests: Vec<[u8; 32]>,
}

impl AuthState {
    pub fn new(keys: &[String]) -> Self {
        Self {
            key_digests: keys.iter().map(|key| digest(key)).collect(),
        }
    }

    /// Anonymous access is allowed only when no keys are configured.
    pub fn allows_anonymous(&self) -> bool {
        self.key_digests.is_empty()
    }

    pub fn verify(&self, presented: &str) -> bool {
        let presented = digest(presented);
        self.key_digests.iter().any(|known| known == &presented)
    }
}

fn digest(key: &str) -> [u8; 32] {
    Sha256::digest(key.as_bytes()).into()
}

/// Middleware guarding the API routes.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.auth.allows_anonymous() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(key) if state.auth.verify(key) => next.run(request).await,
        Some(_) => {
            warn!("rejected request with invalid API key");
            unauthorized("invalid API key")
        }
        None => unauthorized("missing API key"),
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}
