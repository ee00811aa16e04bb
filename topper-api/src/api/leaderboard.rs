//! Leaderboard: top items by score

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use topper_common::localize::LocalizedItem;
use topper_common::{Item, Locale};

use super::{load_items, parse_lang, to_value};
use crate::{ApiResult, AppState};

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<String>,
    pub lang: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse<'a> {
    pub items: Vec<LocalizedItem<'a>>,
}

/// Requested size, default 10, capped at 100
pub fn leaderboard_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT)
}

/// Highest scores first; ties keep store order
pub fn top_items<'a>(
    items: &'a [Item],
    lang: Option<Locale>,
    category: Option<&str>,
    limit: usize,
) -> Vec<&'a Item> {
    let mut ranked: Vec<&Item> = items
        .iter()
        .filter(|item| lang.map_or(true, |l| item.matches_language(l)))
        .filter(|item| category.map_or(true, |c| item.category.eq_ignore_ascii_case(c)))
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let lang = parse_lang(query.lang.as_deref())?;
    let limit = leaderboard_limit(query.limit.as_deref());
    let category = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let items = load_items(&state).await?;
    let top = top_items(&items, lang, category, limit);

    Ok(Json(to_value(&LeaderboardResponse {
        items: top
            .into_iter()
            .map(|item| LocalizedItem::new(item, lang))
            .collect(),
    })?))
}

pub fn leaderboard_routes() -> Router<AppState> {
    Router::new().route("/api/leaderboard", get(leaderboard))
}
