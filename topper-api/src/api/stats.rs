//! Aggregate statistics over the item store and the rating ledger

use std::collections::HashMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use topper_common::ledger::RatingLedger;
use topper_common::stats::UserStats;
use topper_common::Item;

use super::{load_items, load_ratings};
use crate::{ApiResult, AppState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_items: usize,
    pub total_ratings: u64,
    pub positive_ratings: u64,
    pub negative_ratings: u64,
    /// Most rated category across all users
    pub top_category: Option<String>,
}

/// Counts come from the ledger; the top category treats the whole ledger as
/// one user's history
pub fn aggregate(items: &[Item], ledger: &RatingLedger) -> StatsResponse {
    let categories: HashMap<&str, &str> = items
        .iter()
        .map(|item| (item.id.as_str(), item.category.as_str()))
        .collect();

    let mut stats = UserStats::default();
    for event in ledger.events() {
        stats.record(event.value, categories.get(event.item_id.as_str()).copied());
    }
    let (positive, negative) = ledger.tally();

    StatsResponse {
        total_items: items.len(),
        total_ratings: ledger.len() as u64,
        positive_ratings: positive as u64,
        negative_ratings: negative as u64,
        top_category: stats.favorite_category().map(str::to_string),
    }
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let items = load_items(&state).await?;
    let ledger = RatingLedger::from_events(load_ratings(&state).await?);
    Ok(Json(aggregate(&items, &ledger)))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/api/stats", get(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use topper_common::{RatingEvent, RatingValue};

    #[test]
    fn test_aggregate() {
        let items = vec![
            Item::new("a").with_category("tech"),
            Item::new("b").with_category("ads"),
        ];
        let ledger = RatingLedger::from_events(vec![
            RatingEvent::new("a", RatingValue::Up, None),
            RatingEvent::new("a", RatingValue::Down, None),
            RatingEvent::new("b", RatingValue::Up, None),
            RatingEvent::new("gone", RatingValue::Up, None),
        ]);

        let stats = aggregate(&items, &ledger);
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.total_ratings, 4);
        assert_eq!(stats.positive_ratings, 3);
        assert_eq!(stats.negative_ratings, 1);
        assert_eq!(stats.top_category.as_deref(), Some("tech"));
    }

    #[test]
    fn test_empty_store() {
        let stats = aggregate(&[], &RatingLedger::new());
        assert_eq!(stats.total_ratings, 0);
        assert!(stats.top_category.is_none());
    }
}
