//! Per-user rating statistics

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{Item, RatingEvent, RatingValue};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_ratings: u64,
    pub positive_ratings: u64,
    pub negative_ratings: u64,
    /// Lower-cased category -> number of ratings
    pub rated_categories: BTreeMap<String, u64>,
}

impl UserStats {
    /// Count one rating, attributing it to `category` when non-empty
    pub fn record(&mut self, value: RatingValue, category: Option<&str>) {
        self.total_ratings += 1;
        match value {
            RatingValue::Up => self.positive_ratings += 1,
            RatingValue::Down => self.negative_ratings += 1,
        }

        if let Some(category) = category.filter(|c| !c.is_empty()) {
            *self
                .rated_categories
                .entry(category.to_lowercase())
                .or_insert(0) += 1;
        }
    }

    /// Most-rated category; ties go to the alphabetically first
    pub fn favorite_category(&self) -> Option<&str> {
        let mut best: Option<(&str, u64)> = None;
        for (category, &count) in &self.rated_categories {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((category.as_str(), count));
            }
        }
        best.map(|(category, _)| category)
    }
}

/// Most-rated content type across `history`, resolving items by id
///
/// Ties go to the alphabetically first type.
pub fn favorite_type(history: &[RatingEvent], items: &[Item]) -> Option<String> {
    let by_id: HashMap<&str, &Item> = items.iter().map(|i| (i.id.as_str(), i)).collect();

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for event in history {
        if let Some(item) = by_id.get(event.item_id.as_str()) {
            if !item.item_type.is_empty() {
                *counts.entry(item.item_type.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut best: Option<(&str, u64)> = None;
    for (item_type, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((item_type, count));
        }
    }
    best.map(|(item_type, _)| item_type.to_string())
}

/// Ratings per known item, as a percentage; 0 with no items
pub fn engagement_rate(ratings: usize, item_count: usize) -> f64 {
    if item_count == 0 {
        return 0.0;
    }
    ratings as f64 / item_count as f64 * 100.0
}
