//! topper-api library interface
//!
//! Exposes the router and shared state so integration tests can drive the
//! service without binding a socket.

pub mod api;
pub mod error;
pub mod logging;

pub use crate::error::{ApiError, ApiResult};

use std::path::PathBuf;
use std::sync::Arc;

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use topper_common::config::RateLimitConfig;
use topper_common::store::ContentStore;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::rate_limit::RateLimiters;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Item store and rating ledger
    pub store: Arc<dyn ContentStore>,
    /// Held for the whole read-modify-write cycle of a rating submission
    pub write_lock: Arc<Mutex<()>>,
    pub limiters: Arc<RateLimiters>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Static frontend directory, if any
    pub public_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ContentStore>,
        limits: &RateLimitConfig,
    ) -> topper_common::Result<Self> {
        Ok(Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            limiters: Arc::new(RateLimiters::new(limits)?),
            startup_time: Utc::now(),
            public_dir: None,
        })
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(public_dir.into());
        self
    }
}

/// Build application router
///
/// Health is exempt from rate limiting. Rating routes pass through both the
/// general and the rating limiter.
pub fn build_router(state: AppState) -> Router {
    let ratings = api::rating_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        api::rate_limit::ratings_rate_limit,
    ));

    // Rate-limited routes
    let limited = Router::new()
        .merge(api::item_routes())
        .merge(api::leaderboard_routes())
        .merge(api::stats_routes())
        .merge(api::info_routes())
        .merge(ratings)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit::api_rate_limit,
        ));

    let mut router = Router::new().merge(limited).merge(api::health_routes());

    if let Some(public_dir) = &state.public_dir {
        router = router.fallback_service(ServeDir::new(public_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
