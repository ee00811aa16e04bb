//! Per-client rate limiting middleware
//!
//! Two keyed limiters: a general one for every `/api/*` route except health,
//! and a stricter one stacked on the rating routes. A rejected request gets
//! 429 before the handler runs.

use std::net::SocketAddr;
use std::num::NonZeroU32;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use topper_common::config::RateLimitConfig;
use tracing::{debug, warn};

use crate::{ApiError, AppState};

/// Key used when neither a forwarded address nor the peer address is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Keyed token-bucket limiters for the API
pub struct RateLimiters {
    api: DefaultKeyedRateLimiter<String>,
    ratings: DefaultKeyedRateLimiter<String>,
}

impl RateLimiters {
    pub fn new(config: &RateLimitConfig) -> topper_common::Result<Self> {
        Ok(Self {
            api: RateLimiter::keyed(per_minute(config.api_per_minute, "api_per_minute")?),
            ratings: RateLimiter::keyed(per_minute(
                config.ratings_per_minute,
                "ratings_per_minute",
            )?),
        })
    }

    pub fn check_api(&self, client: &str) -> Result<(), ApiError> {
        check(&self.api, client, "api")
    }

    pub fn check_ratings(&self, client: &str) -> Result<(), ApiError> {
        check(&self.ratings, client, "ratings")
    }

    /// Drop state for clients whose buckets have fully refilled
    pub fn retain_recent(&self) {
        self.api.retain_recent();
        self.ratings.retain_recent();
        debug!(
            api_clients = self.api.len(),
            rating_clients = self.ratings.len(),
            "Pruned rate limiter state"
        );
    }
}

fn per_minute(limit: u32, name: &str) -> topper_common::Result<Quota> {
    NonZeroU32::new(limit)
        .map(Quota::per_minute)
        .ok_or_else(|| topper_common::Error::Config(format!("{} must be greater than 0", name)))
}

fn check(
    limiter: &DefaultKeyedRateLimiter<String>,
    client: &str,
    scope: &str,
) -> Result<(), ApiError> {
    limiter.check_key(&client.to_string()).map_err(|not_until| {
        let wait = not_until.wait_time_from(DefaultClock::default().now());
        // Round up so clients never retry early
        let retry_after_secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
        warn!(client, scope, retry_after_secs, "Rate limit exceeded");
        ApiError::RateLimited {
            retry_after_secs: retry_after_secs.max(1),
        }
    })
}

/// Identify the caller: first `X-Forwarded-For` entry, else the peer address
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(addr) = forwarded {
        return addr.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// General API limiter
pub async fn api_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.limiters.check_api(&client_key(&request))?;
    Ok(next.run(request).await)
}

/// Rating submission limiter
pub async fn ratings_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.limiters.check_ratings(&client_key(&request))?;
    Ok(next.run(request).await)
}
