//! Name input for the "new ingredient" form.
//!
//! The same keystrokes that filter the ingredient list also decide whether the
//! typed name can be submitted: it must be long enough to search, short enough
//! to store, and must not match an existing ingredient.

use serde::Serialize;

use super::ListItem;
use crate::defaults::ListConfig;

/// What the caller should do with the list after an input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAction {
    /// Nothing to search yet (too short or too long).
    None,
    /// Input is empty: leave search mode.
    Clear,
    /// Search for this trimmed term (debounced upstream of the list).
    Search(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameField {
    value: String,
    error_message: String,
    enable_submit: bool,
    #[serde(skip)]
    min_length: usize,
    #[serde(skip)]
    max_length: usize,
}

impl NameField {
    pub fn new(config: &ListConfig) -> Self {
        Self {
            value: String::new(),
            error_message: String::new(),
            enable_submit: false,
            min_length: config.min_query_length,
            max_length: config.max_name_length,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn enable_submit(&self) -> bool {
        self.enable_submit
    }

    /// Submission stays disabled until results for the current value arrive.
    pub fn on_input(&mut self, raw: &str) -> FieldAction {
        self.value = raw.to_string();
        self.enable_submit = false;
        self.error_message.clear();

        let term = raw.trim();
        let len = term.chars().count();

        if len == 0 {
            return FieldAction::Clear;
        }
        if len < self.min_length {
            return FieldAction::None;
        }
        if len > self.max_length {
            self.error_message = format!("Name must be at most {} characters", self.max_length);
            return FieldAction::None;
        }

        FieldAction::Search(term.to_string())
    }

    /// Apply search results for `term`. Results for an outdated term are ignored.
    pub fn on_results<T: ListItem>(&mut self, term: &str, items: &[T]) -> bool {
        let current = self.value.trim();
        if term != current {
            return false;
        }

        if items.iter().any(|item| item.key().eq_ignore_ascii_case(current)) {
            self.error_message = format!("'{}' already exists", current);
            self.enable_submit = false;
        } else {
            self.error_message.clear();
            self.enable_submit = true;
        }
        true
    }

    /// The availability check itself failed; keep submission blocked.
    pub fn on_search_failed(&mut self, term: &str) {
        if term == self.value.trim() {
            self.enable_submit = false;
            self.error_message = "Could not check whether this name is taken".to_string();
        }
    }
}
