//! Item browsing: paginated list, single item, random item

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use topper_common::localize::LocalizedItem;
use topper_common::validation::validate_item_id;
use topper_common::Item;

use super::{load_items, parse_lang, to_value, LangQuery};
use crate::{ApiError, ApiResult, AppState};

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Query parameters for the item list
///
/// Numbers arrive as strings so that garbage falls back to defaults instead
/// of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub lang: Option<String>,
    /// `top` for score order; anything else means newest first
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Top,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("top") => SortOrder::Top,
            _ => SortOrder::Newest,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemListResponse<'a> {
    /// Items matching the language filter, before pagination
    pub total: usize,
    pub items: Vec<LocalizedItem<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse<'a> {
    pub item: LocalizedItem<'a>,
}

/// Clamp the requested page size to 1..=100, defaulting to 20
pub fn page_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| (1..=MAX_PAGE_LIMIT).contains(n))
        .unwrap_or(DEFAULT_PAGE_LIMIT)
}

pub fn page_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(0)
}

/// Sort in place; undated items go last in newest-first order
pub fn sort_items(items: &mut [Item], order: SortOrder) {
    match order {
        SortOrder::Top => items.sort_by(|a, b| b.score.cmp(&a.score)),
        SortOrder::Newest => items.sort_by(|a, b| b.published_at().cmp(&a.published_at())),
    }
}

/// GET /api/items
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let lang = parse_lang(query.lang.as_deref())?;
    let limit = page_limit(query.limit.as_deref());
    let offset = page_offset(query.offset.as_deref());

    let mut items = load_items(&state).await?;
    if let Some(lang) = lang {
        items.retain(|item| item.matches_language(lang));
    }
    sort_items(&mut items, SortOrder::parse(query.sort.as_deref()));

    let page = items
        .iter()
        .skip(offset)
        .take(limit)
        .map(|item| LocalizedItem::new(item, lang))
        .collect();

    let body = ItemListResponse {
        total: items.len(),
        items: page,
    };
    Ok(Json(to_value(&body)?))
}

/// GET /api/items/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    validate_item_id(&id)?;
    let lang = parse_lang(query.lang.as_deref())?;

    let items = load_items(&state).await?;
    let item = items
        .iter()
        .find(|item| item.id == id)
        .ok_or_else(|| ApiError::not_found("not_found", format!("Item not found: {}", id)))?;

    Ok(Json(to_value(&ItemResponse {
        item: LocalizedItem::new(item, lang),
    })?))
}

/// GET /api/random
pub async fn random_item(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let lang = parse_lang(query.lang.as_deref())?;
    let items = load_items(&state).await?;

    let candidates: Vec<&Item> = items
        .iter()
        .filter(|item| lang.map_or(true, |l| item.matches_language(l)))
        .collect();
    let item = pick_random(&candidates)
        .ok_or_else(|| ApiError::not_found("no_items", "No items available"))?;

    Ok(Json(to_value(&ItemResponse {
        item: LocalizedItem::new(item, lang),
    })?))
}

fn pick_random<'a>(candidates: &[&'a Item]) -> Option<&'a Item> {
    candidates.choose(&mut rand::thread_rng()).copied()
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items))
        .route("/api/items/:id", get(get_item))
        .route("/api/random", get(random_item))
}
