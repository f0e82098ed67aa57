//! Extraction and link rendering for inline recipe references. A reference is
//! the text between a pair of marker characters, e.g. `*Stock*` references
//! the recipe titled `Stock`.

use crate::recipe::page_file_name;
use regex::{Captures, Regex};

/// The marker used when none is configured.
pub const DEFAULT_MARKER: char = '*';

/// Finds marker-delimited references in instruction text.
#[derive(Clone, Debug)]
pub struct ReferenceExtractor {
    marker: char,
    pattern: Regex,
}

impl ReferenceExtractor {
    /// Creates an extractor for references wrapped in `marker`. Whitespace
    /// markers are rejected by the configuration layer.
    pub fn new(marker: char) -> ReferenceExtractor {
        let marker_str = regex::escape(&marker.to_string());
        let pattern = Regex::new(&format!("{m}(.*?){m}", m = marker_str))
            // an escaped literal around a lazy group is always a valid regex
            .unwrap();
        ReferenceExtractor { marker, pattern }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// Returns the referenced titles in `text`, left to right. Empty marker
    /// pairs are skipped.
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|title| !title.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Replaces every reference in `text` with a hyperlink to the referenced
    /// recipe's page.
    pub fn link(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| match caps.get(1) {
                Some(title) if !title.as_str().is_empty() => link_markup(title.as_str()),
                _ => caps[0].to_owned(),
            })
            .into_owned()
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        ReferenceExtractor::new(DEFAULT_MARKER)
    }
}

/// The hyperlink markup for a reference to the recipe titled `title`.
pub fn link_markup(title: &str) -> String {
    format!(r#"<a href="./{}">{}</a>"#, page_file_name(title), title)
}
