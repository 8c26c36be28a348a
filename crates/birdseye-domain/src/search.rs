//! Free-text board filter.

use crate::Item;

/// Case-insensitive substring match over a card's name and description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        item.name.to_lowercase().contains(&self.needle)
            || item.description.to_lowercase().contains(&self.needle)
    }
}
