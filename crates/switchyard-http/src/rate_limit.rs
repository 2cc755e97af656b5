//! Request rate limiting: a global ceiling plus a per-client ceiling keyed by
//! API key (or "anonymous" for unauthenticated callers).

use crate::config::RateLimitConfig;
use crate::routes::AppState;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed, keyed::DefaultKeyedStateStore},
};
use serde::Serialize;
use std::num::NonZeroU32;

pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;
pub type ClientRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rejection body returned with a 429.
#[derive(Debug, Serialize)]
pub struct RateLimitRejection {
    pub error: String,
    pub message: String,
    /// Seconds until the next request is allowed.
    pub retry_after: u64,
}

/// Shared limiter state.
pub struct RateLimitState {
    global: GlobalRateLimiter,
    per_client: ClientRateLimiter,
}

impl RateLimitState {
    /// Returns `None` when either limit is zero; config validation rejects
    /// that earlier, so this only guards direct construction.
    pub fn try_new(config: &RateLimitConfig) -> Option<Self> {
        let global_quota = Quota::per_minute(NonZeroU32::new(config.global_rpm)?);
        let client_quota = Quota::per_minute(NonZeroU32::new(config.per_client_rpm)?);
        Some(Self {
            global: RateLimiter::direct(global_quota),
            per_client: RateLimiter::keyed(client_quota),
        })
    }

    /// Check both ceilings for one request.
    pub fn check(&self, client: &str) -> Result<(), RateLimitRejection> {
        if let Err(not_until) = self.global.check() {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs();
            return Err(RateLimitRejection {
                error: "global_rate_limit_exceeded".to_string(),
                message: "Global rate limit exceeded. Please try again later.".to_string(),
                retry_after,
            });
        }

        if let Err(not_until) = self.per_client.check_key(&client.to_string()) {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs();
            return Err(RateLimitRejection {
                error: "client_rate_limit_exceeded".to_string(),
                message: "Rate limit exceeded for this client. Please try again later.".to_string(),
                retry_after,
            });
        }

        Ok(())
    }
}

/// Middleware enforcing the limits on the API routes.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .headers()
        .get(crate::auth::API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    match state.rate.check(&client) {
        Ok(()) => next.run(request).await,
        Err(rejection) => (StatusCode::TOO_MANY_REQUESTS, Json(rejection)).into_response(),
    }
}
