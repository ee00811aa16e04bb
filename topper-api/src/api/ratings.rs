//! Rating submission endpoint
//!
//! `POST /api/ratings` (and the older `/api/rankings` path) accepts
//! `{ itemId, value, userId? }`, records the vote and answers with the
//! updated score and a suggested next item.

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use topper_common::localize::LocalizedItem;
use topper_common::rating::{submit_rating, RatingOutcome, RatingRequest};
use topper_common::validation::ValidationError;
use topper_common::RatingEvent;
use tracing::debug;

use super::{parse_lang, to_value, LangQuery};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct RatedItem<'a> {
    pub id: &'a str,
    pub score: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse<'a> {
    pub rating: &'a RatingEvent,
    pub item: RatedItem<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_item: Option<LocalizedItem<'a>>,
}

/// Decode the body: not JSON -> `invalid_json`, wrong shape -> `invalid_payload`
pub fn parse_rating_request(body: &[u8]) -> ApiResult<RatingRequest> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidInput(ValidationError::Payload(e.to_string())))
}

/// POST /api/ratings
///
/// Submissions are serialized through the state's write lock, so two votes
/// in this process never interleave their read-modify-write cycles.
pub async fn post_rating(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let lang = parse_lang(query.lang.as_deref())?;
    let request = parse_rating_request(&body)?;

    // Reject bad input without waiting for the writer
    request.validate()?;

    let outcome = {
        let _guard = state.write_lock.lock().await;
        let store = state.store.clone();
        tokio::task::spawn_blocking(move || {
            submit_rating(store.as_ref(), &request, &mut rand::thread_rng())
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Rating task failed: {}", e)))?
        .map_err(ApiError::from)?
    };

    debug!(
        item_id = %outcome.item_id,
        next_item = outcome.next_item.as_ref().map(|i| i.id.as_str()),
        "Rating response ready"
    );

    Ok(Json(to_value(&response(&outcome, lang))?))
}

fn response(outcome: &RatingOutcome, lang: Option<topper_common::Locale>) -> RatingResponse<'_> {
    RatingResponse {
        rating: &outcome.rating,
        item: RatedItem {
            id: &outcome.item_id,
            score: outcome.score,
        },
        next_item: outcome
            .next_item
            .as_ref()
            .map(|item| LocalizedItem::new(item, lang)),
    }
}

pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ratings", post(post_rating))
        .route("/api/rankings", post(post_rating))
}
