//! Client-side item filters (type, category, country)

use std::collections::HashSet;

use crate::models::Item;

/// Country value that matches every item
pub const GLOBAL_COUNTRY: &str = "global";

/// Selected filter values; an empty set places no constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub types: HashSet<String>,
    pub categories: HashSet<String>,
    pub countries: HashSet<String>,
}

impl ItemFilter {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.categories.is_empty() && self.countries.is_empty()
    }

    pub fn matches(&self, item: &Item) -> bool {
        if !self.types.is_empty() && !self.types.contains(&item.item_type) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&item.category) {
            return false;
        }
        if !self.countries.is_empty() && !self.countries.contains(GLOBAL_COUNTRY) {
            return item
                .country
                .as_ref()
                .is_some_and(|country| self.countries.contains(country));
        }
        true
    }

    /// Keep matching items, preserving order
    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}
