//! Preference model derived from a user's rating history
//!
//! Each historical rating contributes its signed value (+1 / -1) to the
//! weight of the rated item's category, its type, and every one of its tags.
//! The model is rebuilt for every recommendation and never persisted.

use std::collections::HashMap;

use crate::models::{Item, RatingEvent};

/// Multiplier for category affinity in [`PreferenceWeights::score`]
pub const CATEGORY_FACTOR: f64 = 2.0;
/// Multiplier for type affinity in [`PreferenceWeights::score`]
pub const TYPE_FACTOR: f64 = 1.5;
/// Multiplier for each tag affinity in [`PreferenceWeights::score`]
pub const TAG_FACTOR: f64 = 1.0;

/// Accumulated signed weights per category, type and tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceWeights {
    pub categories: HashMap<String, i64>,
    pub types: HashMap<String, i64>,
    pub tags: HashMap<String, i64>,
}

impl PreferenceWeights {
    /// Build weights from `history`, resolving rated items in `items`
    ///
    /// Events whose item is no longer present are skipped. Empty category or
    /// type strings carry no signal and are not counted.
    pub fn from_history(items: &[Item], history: &[RatingEvent]) -> Self {
        let mut by_id: HashMap<&str, &Item> = HashMap::with_capacity(items.len());
        for item in items {
            by_id.entry(item.id.as_str()).or_insert(item);
        }

        let mut weights = Self::default();
        for event in history {
            let Some(item) = by_id.get(event.item_id.as_str()) else {
                continue;
            };
            let delta = event.value.as_i64();

            if !item.category.is_empty() {
                *weights.categories.entry(item.category.clone()).or_insert(0) += delta;
            }
            if !item.item_type.is_empty() {
                *weights.types.entry(item.item_type.clone()).or_insert(0) += delta;
            }
            for tag in &item.tags {
                *weights.tags.entry(tag.clone()).or_insert(0) += delta;
            }
        }
        weights
    }

    pub fn category_weight(&self, category: &str) -> i64 {
        self.categories.get(category).copied().unwrap_or(0)
    }

    pub fn type_weight(&self, item_type: &str) -> i64 {
        self.types.get(item_type).copied().unwrap_or(0)
    }

    pub fn tag_weight(&self, tag: &str) -> i64 {
        self.tags.get(tag).copied().unwrap_or(0)
    }

    /// Base affinity score of a candidate (no jitter, no direction)
    ///
    /// `2 * category + 1.5 * type + sum(tag)`; absent dimensions weigh 0.
    pub fn score(&self, candidate: &Item) -> f64 {
        let tags: i64 = candidate.tags.iter().map(|t| self.tag_weight(t)).sum();

        CATEGORY_FACTOR * self.category_weight(&candidate.category) as f64
            + TYPE_FACTOR * self.type_weight(&candidate.item_type) as f64
            + TAG_FACTOR * tags as f64
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.types.is_empty() && self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingValue;

    fn vote(item_id: &str, value: RatingValue) -> RatingEvent {
        RatingEvent::new(item_id, value, None)
    }

    #[test]
    fn test_weights_are_signed_sums() {
        let items = vec![
            Item::new("a").with_category("tech").with_type("news").with_tags(["ai", "chips"]),
            Item::new("b").with_category("tech").with_type("facts").with_tags(["ai"]),
            Item::new("c").with_category("ads").with_type("news").with_tags(["promo"]),
        ];
        let history = vec![
            vote("a", RatingValue::Up),
            vote("b", RatingValue::Up),
            vote("c", RatingValue::Down),
            vote("a", RatingValue::Down),
        ];

        let w = PreferenceWeights::from_history(&items, &history);
        assert_eq!(w.category_weight("tech"), 1);
        assert_eq!(w.category_weight("ads"), -1);
        assert_eq!(w.type_weight("news"), -1);
        assert_eq!(w.type_weight("facts"), 1);
        assert_eq!(w.tag_weight("ai"), 1);
        assert_eq!(w.tag_weight("chips"), 0);
        assert_eq!(w.tag_weight("promo"), -1);
        assert_eq!(w.tag_weight("unseen"), 0);
    }

    #[test]
    fn test_unknown_items_and_empty_dimensions_are_ignored() {
        let items = vec![Item::new("a")];
        let history = vec![vote("a", RatingValue::Up), vote("gone", RatingValue::Up)];

        let w = PreferenceWeights::from_history(&items, &history);
        assert!(w.is_empty());
    }

    #[test]
    fn test_score_formula() {
        let mut w = PreferenceWeights::default();
        w.categories.insert("tech".into(), 2);
        w.types.insert("news".into(), -2);
        w.tags.insert("ai".into(), 3);
        w.tags.insert("chips".into(), -1);

        let candidate = Item::new("z")
            .with_category("tech")
            .with_type("news")
            .with_tags(["ai", "chips", "other"]);
        // 2*2 + 1.5*(-2) + (3 - 1 + 0)
        assert_eq!(w.score(&candidate), 3.0);
        assert_eq!(w.score(&Item::new("empty")), 0.0);
    }
}
