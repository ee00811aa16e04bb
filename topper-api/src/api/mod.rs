//! HTTP API handlers for topper-api

pub mod health;
pub mod items;
pub mod leaderboard;
pub mod rate_limit;
pub mod ratings;
pub mod stats;

pub use health::{health_routes, info_routes};
pub use items::item_routes;
pub use leaderboard::leaderboard_routes;
pub use ratings::rating_routes;
pub use stats::stats_routes;

use serde::{Deserialize, Serialize};
use topper_common::{Item, Locale, RatingEvent};

use crate::{ApiError, ApiResult, AppState};

/// `?lang=` query parameter shared by several routes
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Parse an optional locale code; empty means "not given"
pub(crate) fn parse_lang(raw: Option<&str>) -> ApiResult<Option<Locale>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => Ok(Some(code.parse::<Locale>()?)),
        None => Ok(None),
    }
}

/// Serialize before returning so borrowed views never outlive the handler
pub(crate) fn to_value<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Run a store read on the blocking pool
async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn topper_common::store::ContentStore) -> topper_common::Result<T>
        + Send
        + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("Store task failed: {}", e)))?
        .map_err(ApiError::from)
}

pub(crate) async fn load_items(state: &AppState) -> ApiResult<Vec<Item>> {
    blocking(state, |store| store.read_items()).await
}

pub(crate) async fn load_ratings(state: &AppState) -> ApiResult<Vec<RatingEvent>> {
    blocking(state, |store| store.read_ratings()).await
}
