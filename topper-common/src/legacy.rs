//! Legacy flat item shape and its translation into [`Item`]
//!
//! Older imports produced `{ id, title, source, url, tags, categories, ... }`
//! records. They are accepted only at import time and converted into the
//! multilingual shape before reaching the store.

use serde::{Deserialize, Serialize};

use crate::models::{lenient_locale, Item, Locale};
use crate::validation::{validate_item_id, ValidationError};

/// Category given to legacy items that carry none
pub const DEFAULT_LEGACY_CATEGORY: &str = "awesome-list";
/// Type given to every converted legacy item
pub const LEGACY_ITEM_TYPE: &str = "link";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient_locale")]
    pub lang: Option<Locale>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub score: i64,
}

impl LegacyItem {
    /// Convert into the canonical item shape
    ///
    /// The title becomes the English and canonical text; the source name is
    /// used for every locale. Votes start at zero.
    pub fn into_item(self) -> Result<Item, ValidationError> {
        validate_item_id(&self.id)?;

        let mut item = Item::new(self.id);
        item.canonical_text_en = self.title.clone();
        item.text_en = self.title;
        item.source_name_en = self.source.clone();
        item.source_name_ro = self.source.clone();
        item.source_name_uk = self.source.clone();
        item.source_name_ru = self.source;
        item.source_link = self.url;
        item.created_by = self.author_id;
        item.created = self.created_at.clone().unwrap_or_default();
        item.published = self.published_at.or(self.created_at).unwrap_or_default();
        item.item_type = LEGACY_ITEM_TYPE.to_string();
        item.category = self
            .categories
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_LEGACY_CATEGORY.to_string());
        if !self.categories.is_empty() {
            item.categories = Some(self.categories);
        }
        item.tags = self.tags;
        item.score = self.score;
        item.lang = self.lang;
        Ok(item)
    }
}

/// Merge converted items into `existing`, skipping ids already present
///
/// Returns the number of items added.
pub fn merge_new_items(existing: &mut Vec<Item>, incoming: Vec<Item>) -> usize {
    let mut added = 0;
    for item in incoming {
        if existing.iter().any(|e| e.id == item.id) {
            continue;
        }
        existing.push(item);
        added += 1;
    }
    added
}
