//! Per-language projection of an item
//!
//! The stored [`Item`] keeps one text/source field per locale. Responses need
//! a single `contentText`/`sourceName` pair; [`localize`] computes it without
//! touching the stored record.

use serde::Serialize;

use crate::models::{Item, Locale};

/// Fixed-shape localized view of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedView {
    /// Locale the text was resolved for
    pub locale: Locale,
    pub content_text: String,
    pub source_name: String,
}

/// Resolve text and source attribution for an item
///
/// Locale priority: `requested`, then the item's own `lang`, then English.
/// Empty localized fields fall back to English (text falls back once more to
/// the canonical English text).
pub fn localize(item: &Item, requested: Option<Locale>) -> LocalizedView {
    let locale = requested.or(item.lang).unwrap_or_default();

    let content_text = first_non_empty(&[
        item.text(locale),
        item.text(Locale::En),
        &item.canonical_text_en,
    ]);
    let source_name = first_non_empty(&[item.source_name(locale), item.source_name(Locale::En)]);

    LocalizedView {
        locale,
        content_text,
        source_name,
    }
}

/// Item record plus its localized projection, as sent over the wire
#[derive(Debug, Clone, Serialize)]
pub struct LocalizedItem<'a> {
    #[serde(flatten)]
    pub item: &'a Item,
    #[serde(flatten)]
    pub view: LocalizedView,
}

impl<'a> LocalizedItem<'a> {
    pub fn new(item: &'a Item, requested: Option<Locale>) -> Self {
        Self {
            item,
            view: localize(item, requested),
        }
    }
}

fn first_non_empty(candidates: &[&str]) -> String {
    candidates
        .iter()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        let mut item = Item::new("x").with_lang(Locale::Ro);
        item.canonical_text_en = "canonical".to_string();
        item.text_en = "hello".to_string();
        item.text_ro = "salut".to_string();
        item.source_name_en = "Daily".to_string();
        item.source_name_ro = "Zilnic".to_string();
        item
    }

    #[test]
    fn test_requested_locale_wins() {
        let view = localize(&sample(), Some(Locale::En));
        assert_eq!(view.locale, Locale::En);
        assert_eq!(view.content_text, "hello");
        assert_eq!(view.source_name, "Daily");
    }

    #[test]
    fn test_item_lang_used_when_not_requested() {
        let view = localize(&sample(), None);
        assert_eq!(view.locale, Locale::Ro);
        assert_eq!(view.content_text, "salut");
        assert_eq!(view.source_name, "Zilnic");
    }

    #[test]
    fn test_empty_translation_falls_back_to_english() {
        let view = localize(&sample(), Some(Locale::Ru));
        assert_eq!(view.locale, Locale::Ru);
        assert_eq!(view.content_text, "hello");
        assert_eq!(view.source_name, "Daily");

        let mut bare = Item::new("y");
        bare.canonical_text_en = "canonical".to_string();
        assert_eq!(localize(&bare, Some(Locale::Uk)).content_text, "canonical");
    }

    #[test]
    fn test_localized_item_keeps_record_shape() {
        let item = sample();
        let json = serde_json::to_value(LocalizedItem::new(&item, Some(Locale::Ro))).unwrap();
        assert_eq!(json["content_id"], "x");
        assert_eq!(json["contentText"], "salut");
        assert_eq!(json["sourceName"], "Zilnic");
        assert_eq!(json["locale"], "ro");
        // Stored record is untouched
        assert_eq!(item.text_ro, "salut");
    }
}
