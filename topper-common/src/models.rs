//! Core data model: content items and rating events
//!
//! The on-disk shape of [`Item`] is the multilingual `content_*` record used by
//! the live API. Fields not modelled here are carried through `extra` so a
//! rewrite of `items.json` never drops data.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Supported content locales
///
/// Stored field suffixes and older clients use `ua` for Ukrainian; it is
/// accepted as an alias of `uk`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ro,
    #[serde(alias = "ua")]
    Uk,
    Ru,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ro => "ro",
            Locale::Uk => "uk",
            Locale::Ru => "ru",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ro" => Ok(Locale::Ro),
            "uk" | "ua" => Ok(Locale::Uk),
            "ru" => Ok(Locale::Ru),
            _ => Err(ValidationError::Locale(s.to_string())),
        }
    }
}

/// Read an optional locale, mapping `""`, unknown codes and non-strings to `None`
pub(crate) fn lenient_locale<'de, D>(deserializer: D) -> Result<Option<Locale>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|code| code.parse().ok()))
}

/// A ratable content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "content_id")]
    pub id: String,

    #[serde(rename = "content_canonical_text_en", default)]
    pub canonical_text_en: String,
    #[serde(rename = "content_text_en", default)]
    pub text_en: String,
    #[serde(rename = "content_text_ro", default)]
    pub text_ro: String,
    #[serde(rename = "content_text_ua", default)]
    pub text_uk: String,
    #[serde(rename = "content_text_ru", default)]
    pub text_ru: String,

    #[serde(rename = "content_source_name_en", default)]
    pub source_name_en: String,
    #[serde(rename = "content_source_name_ro", default)]
    pub source_name_ro: String,
    #[serde(rename = "content_source_name_ua", default)]
    pub source_name_uk: String,
    #[serde(rename = "content_source_name_ru", default)]
    pub source_name_ru: String,
    #[serde(rename = "content_source_link", default)]
    pub source_link: String,

    #[serde(rename = "content_country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "content_created_by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(rename = "content_created", default)]
    pub created: String,
    #[serde(rename = "content_published", default)]
    pub published: String,
    #[serde(rename = "content_edited", default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<String>,

    /// Free-form kind, e.g. "news" or "facts"
    #[serde(rename = "content_type", default)]
    pub item_type: String,
    #[serde(rename = "content_category", default)]
    pub category: String,
    #[serde(rename = "content_subcategory", default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(rename = "content_tags", default)]
    pub tags: Vec<String>,

    /// Number of ratings applied through the rating handler
    #[serde(rename = "content_votes", default)]
    pub votes: u64,
    /// Signed sum of applied rating values
    #[serde(rename = "content_score", default)]
    pub score: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Locale the item was authored in; unset items match every language
    ///
    /// Empty or unsupported codes read as unset.
    #[serde(default, deserialize_with = "lenient_locale", skip_serializing_if = "Option::is_none")]
    pub lang: Option<Locale>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create an empty item with the given id and zero score
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            canonical_text_en: String::new(),
            text_en: String::new(),
            text_ro: String::new(),
            text_uk: String::new(),
            text_ru: String::new(),
            source_name_en: String::new(),
            source_name_ro: String::new(),
            source_name_uk: String::new(),
            source_name_ru: String::new(),
            source_link: String::new(),
            country: None,
            created_by: None,
            created: String::new(),
            published: String::new(),
            edited: None,
            item_type: String::new(),
            category: String::new(),
            subcategory: None,
            tags: Vec::new(),
            votes: 0,
            score: 0,
            categories: None,
            lang: None,
            extra: Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_lang(mut self, lang: Locale) -> Self {
        self.lang = Some(lang);
        self
    }

    /// Stored text for a locale (may be empty)
    pub fn text(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.text_en,
            Locale::Ro => &self.text_ro,
            Locale::Uk => &self.text_uk,
            Locale::Ru => &self.text_ru,
        }
    }

    /// Stored source attribution for a locale (may be empty)
    pub fn source_name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.source_name_en,
            Locale::Ro => &self.source_name_ro,
            Locale::Uk => &self.source_name_uk,
            Locale::Ru => &self.source_name_ru,
        }
    }

    /// True if the two items have at least one tag in common
    pub fn shares_tag_with(&self, other: &Item) -> bool {
        self.tags.iter().any(|t| other.tags.contains(t))
    }

    /// True if the item is visible under the given language filter
    pub fn matches_language(&self, language: Locale) -> bool {
        self.lang.map_or(true, |lang| lang == language)
    }

    /// Publication time, if `published` holds an RFC 3339 timestamp
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.published)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A single vote: exactly +1 or -1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RatingValue {
    Up,
    Down,
}

impl RatingValue {
    pub fn as_i64(self) -> i64 {
        match self {
            RatingValue::Up => 1,
            RatingValue::Down => -1,
        }
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RatingValue::Up),
            -1 => Ok(RatingValue::Down),
            other => Err(ValidationError::Value(other)),
        }
    }
}

impl From<RatingValue> for i64 {
    fn from(value: RatingValue) -> Self {
        value.as_i64()
    }
}

/// Immutable record of one vote on one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEvent {
    pub id: String,
    /// Anonymous ratings carry `null`
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub item_id: String,
    pub value: RatingValue,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl RatingEvent {
    /// Create a new event with a fresh unique id, stamped now
    pub fn new(item_id: impl Into<String>, value: RatingValue, user_id: Option<Uuid>) -> Self {
        Self {
            id: format!("rating_{}", Uuid::new_v4().simple()),
            user_id,
            item_id: item_id.into(),
            value,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_deserializes_multilingual_shape() {
        let raw = json!({
            "content_id": "x",
            "content_text_en": "hello",
            "content_text_ua": "привіт",
            "content_type": "facts",
            "content_category": "tech",
            "content_tags": ["news", "ai"],
            "content_votes": 3,
            "content_score": -2,
            "lang": "ua",
            "content_rank_hint": 7
        });

        let item: Item = serde_json::from_value(raw).unwrap();
        assert_eq!(item.id, "x");
        assert_eq!(item.text(Locale::Uk), "привіт");
        assert_eq!(item.lang, Some(Locale::Uk));
        assert_eq!(item.score, -2);
        assert_eq!(item.votes, 3);
        assert_eq!(item.extra.get("content_rank_hint"), Some(&json!(7)));

        // Unknown fields survive a rewrite
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["content_rank_hint"], json!(7));
        assert_eq!(back["lang"], json!("uk"));
    }

    #[test]
    fn test_empty_or_unsupported_lang_reads_as_unset() {
        for raw in [json!(""), json!("de"), json!(null), json!(7)] {
            let item: Item =
                serde_json::from_value(json!({ "content_id": "y", "lang": raw })).unwrap();
            assert!(item.lang.is_none(), "lang {raw} should read as unset");
            assert!(item.matches_language(Locale::Ro));
        }
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let item: Item = serde_json::from_value(json!({ "content_id": "y" })).unwrap();
        assert_eq!(item.score, 0);
        assert_eq!(item.votes, 0);
        assert!(item.tags.is_empty());
        assert!(item.lang.is_none());
    }

    #[test]
    fn test_rating_value_wire_format() {
        assert_eq!(serde_json::to_value(RatingValue::Up).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(RatingValue::Down).unwrap(), json!(-1));
        assert!(serde_json::from_value::<RatingValue>(json!(2)).is_err());
        assert!(serde_json::from_value::<RatingValue>(json!(0)).is_err());
        assert_eq!(RatingValue::try_from(-1), Ok(RatingValue::Down));
    }

    #[test]
    fn test_rating_event_accepts_client_timestamp_field() {
        let event: RatingEvent = serde_json::from_value(json!({
            "id": "rating_1",
            "userId": null,
            "itemId": "x",
            "value": 1,
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(event.value, RatingValue::Up);
        assert!(event.user_id.is_none());

        let back = serde_json::to_value(&event).unwrap();
        assert!(back.get("createdAt").is_some());
        assert_eq!(back["userId"], Value::Null);
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("ua".parse::<Locale>(), Ok(Locale::Uk));
        assert_eq!("RU".parse::<Locale>(), Ok(Locale::Ru));
        assert!("de".parse::<Locale>().is_err());
    }

    #[test]
    fn test_shares_tag_with() {
        let a = Item::new("a").with_tags(["x", "y"]);
        let b = Item::new("b").with_tags(["y"]);
        let c = Item::new("c").with_tags(["z"]);
        assert!(a.shares_tag_with(&b));
        assert!(!a.shares_tag_with(&c));
        assert!(!Item::new("d").shares_tag_with(&a));
    }

    #[test]
    fn test_rating_event_ids_are_unique() {
        let a = RatingEvent::new("x", RatingValue::Up, None);
        let b = RatingEvent::new("x", RatingValue::Up, None);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("rating_"));
    }
}
