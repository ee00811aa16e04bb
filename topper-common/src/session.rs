//! Client session view-model
//!
//! Holds everything a browsing client tracks between votes: the item list
//! and current position, the display language, the rating and view
//! histories, and per-user statistics. All state lives in one value passed
//! to whoever needs it.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::filters::ItemFilter;
use crate::localize::{localize, LocalizedView};
use crate::models::{Item, Locale, RatingEvent, RatingValue};
use crate::selector::select_weighted;
use crate::stats::{engagement_rate, favorite_type, UserStats};

/// One shown item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub item_id: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
}

/// What the server answered to a vote
#[derive(Debug, Clone, PartialEq)]
pub struct VoteFeedback {
    /// Authoritative score after the vote
    pub score: i64,
    pub next_item: Option<Item>,
}

/// Derived statistics for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_ratings: u64,
    pub positive_ratings: u64,
    pub negative_ratings: u64,
    pub favorite_category: Option<String>,
    pub favorite_type: Option<String>,
    /// Percentage of loaded items that were rated
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    items: Vec<Item>,
    current_index: Option<usize>,
    language: Locale,
    rating_history: Vec<RatingEvent>,
    view_history: Vec<ViewRecord>,
    stats: UserStats,
}

impl Session {
    pub fn new(language: Locale) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Replace the item list and show the first item
    pub fn load_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.current_index = if self.items.is_empty() { None } else { Some(0) };
        self.record_view();
    }

    /// Replace the item list with its filtered version
    pub fn apply_filter(&mut self, filter: &ItemFilter, items: Vec<Item>) {
        let filtered = filter.apply(items);
        debug!(count = filtered.len(), "Filters applied");
        self.load_items(filtered);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<&Item> {
        self.current_index.and_then(|idx| self.items.get(idx))
    }

    pub fn current_view(&self) -> Option<LocalizedView> {
        self.current().map(|item| localize(item, Some(self.language)))
    }

    pub fn language(&self) -> Locale {
        self.language
    }

    pub fn set_language(&mut self, language: Locale) {
        self.language = language;
    }

    pub fn rating_history(&self) -> &[RatingEvent] {
        &self.rating_history
    }

    pub fn view_history(&self) -> &[ViewRecord] {
        &self.view_history
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Step back one item; false when already at the start
    pub fn previous(&mut self) -> bool {
        match self.current_index {
            Some(idx) if idx > 0 => {
                self.current_index = Some(idx - 1);
                self.record_view();
                true
            }
            _ => false,
        }
    }

    /// Step forward one item; false when already at the end
    pub fn advance(&mut self) -> bool {
        match self.current_index {
            Some(idx) if idx + 1 < self.items.len() => {
                self.current_index = Some(idx + 1);
                self.record_view();
                true
            }
            _ => false,
        }
    }

    /// Append a rating to the history and update statistics
    pub fn record_rating(&mut self, item_id: &str, value: RatingValue) -> &RatingEvent {
        let category = self
            .items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.category.clone());
        self.stats.record(value, category.as_deref());

        self.rating_history.push(RatingEvent::new(item_id, value, None));
        &self.rating_history[self.rating_history.len() - 1]
    }

    /// Apply a vote on the current item and move to the next one
    ///
    /// The history is updated before the next item is chosen, so selection
    /// sees this vote. The server's suggestion wins; otherwise the weighted
    /// selector runs over the session items. The chosen item is inserted right
    /// after the current position. Returns the item now shown.
    pub fn apply_vote<R: Rng + ?Sized>(
        &mut self,
        value: RatingValue,
        feedback: VoteFeedback,
        rng: &mut R,
    ) -> Option<&Item> {
        let idx = self.current_index?;

        self.items[idx].score = feedback.score;
        let item_id = self.items[idx].id.clone();
        self.record_rating(&item_id, value);

        let next = feedback.next_item.or_else(|| {
            select_weighted(
                &self.items,
                &self.rating_history,
                self.language,
                value.into(),
                rng,
            )
            .cloned()
        });

        match next {
            Some(item) => {
                debug!(item_id = %item.id, "Moving to selected item");
                self.items.insert(idx + 1, item);
                self.current_index = Some(idx + 1);
                self.record_view();
            }
            None => {
                self.advance();
            }
        }

        self.current()
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_ratings: self.stats.total_ratings,
            positive_ratings: self.stats.positive_ratings,
            negative_ratings: self.stats.negative_ratings,
            favorite_category: self.stats.favorite_category().map(str::to_string),
            favorite_type: favorite_type(&self.rating_history, &self.items),
            engagement_rate: engagement_rate(self.rating_history.len(), self.items.len()),
        }
    }

    fn record_view(&mut self) {
        let Some(item) = self.current() else {
            return;
        };
        let view = localize(item, Some(self.language));
        let title = if view.content_text.is_empty() {
            "Untitled".to_string()
        } else {
            view.content_text
        };
        let record = ViewRecord {
            item_id: item.id.clone(),
            title,
            timestamp: Utc::now(),
        };
        self.view_history.push(record);
    }
}
