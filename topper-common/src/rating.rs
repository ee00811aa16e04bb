//! Rating submission
//!
//! One submission is a single read-modify-write cycle:
//! validate -> read items and ledger -> apply score -> append event ->
//! commit both files -> select the next item by tag overlap.
//!
//! Validation happens before any store access, and nothing is persisted
//! unless both files are committed together.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ledger::RatingLedger;
use crate::models::{Item, Locale, RatingEvent, RatingValue};
use crate::scoring::apply_rating;
use crate::selector::{NextItemQuery, NextItemStrategy};
use crate::store::ContentStore;
use crate::validation::{validate_item_id, validate_user_id, ValidationError};

/// Raw rating request as received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub item_id: String,
    pub value: i64,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Rating request after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRating {
    pub item_id: String,
    pub value: RatingValue,
    pub user_id: Option<Uuid>,
}

impl RatingRequest {
    pub fn new(item_id: impl Into<String>, value: i64) -> Self {
        Self {
            item_id: item_id.into(),
            value,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Check item id pattern, value range and user id shape
    pub fn validate(&self) -> Result<ValidatedRating, ValidationError> {
        validate_item_id(&self.item_id)?;
        let value = RatingValue::try_from(self.value)?;
        let user_id = self.user_id.as_deref().map(validate_user_id).transpose()?;

        Ok(ValidatedRating {
            item_id: self.item_id.clone(),
            value,
            user_id,
        })
    }
}

/// Successful submission
#[derive(Debug, Clone)]
pub struct RatingOutcome {
    pub rating: RatingEvent,
    pub item_id: String,
    /// Score after applying this rating
    pub score: i64,
    pub votes: u64,
    /// Suggested next item; `None` when the store holds nothing else
    pub next_item: Option<Item>,
}

/// Submission failure
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Store could not be read; nothing was mutated
    #[error("Failed to read store: {0}")]
    StoreRead(#[source] crate::Error),

    /// Mutation computed but not durably written; the vote may not be recorded
    #[error("Failed to persist rating: {0}")]
    PersistFailed(#[source] crate::Error),
}

/// Run one rating submission against `store`
///
/// Next-item selection uses the tag-overlap strategy over the post-update
/// item list.
pub fn submit_rating<S, R>(
    store: &S,
    request: &RatingRequest,
    rng: &mut R,
) -> Result<RatingOutcome, RatingError>
where
    S: ContentStore + ?Sized,
    R: Rng + ?Sized,
{
    let rating = request.validate().map_err(|e| {
        debug!(item_id = %request.item_id, error = %e, "Rejected rating request");
        e
    })?;

    let mut items = store.read_items().map_err(RatingError::StoreRead)?;
    let mut ledger = RatingLedger::from_events(store.read_ratings().map_err(RatingError::StoreRead)?);

    let idx = items
        .iter()
        .position(|item| item.id == rating.item_id)
        .ok_or_else(|| RatingError::ItemNotFound(rating.item_id.clone()))?;

    let score = apply_rating(&mut items[idx], rating.value);
    let votes = items[idx].votes;

    let event = RatingEvent::new(rating.item_id.clone(), rating.value, rating.user_id);
    ledger.append(event.clone());

    if let Err(e) = store.commit(&items, ledger.events()) {
        warn!(item_id = %rating.item_id, error = %e, "Failed to persist rating");
        return Err(RatingError::PersistFailed(e));
    }

    info!(
        item_id = %rating.item_id,
        rating_id = %event.id,
        value = rating.value.as_i64(),
        score,
        "Rating recorded"
    );

    let current = &items[idx];
    let query = NextItemQuery {
        current,
        items: &items,
        history: ledger.events(),
        language: current.lang.unwrap_or(Locale::En),
        direction: rating.value.into(),
    };
    let next_item = NextItemStrategy::TagOverlap.select(&query, rng).cloned();

    Ok(RatingOutcome {
        rating: event,
        item_id: rating.item_id,
        score,
        votes,
        next_item,
    })
}
