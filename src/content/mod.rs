//! Static content index.
//!
//! The index is a read-only table of [`ContentEntry`] records consumed by the
//! search and listing stores and by the SEO generators. The built-in index is
//! embedded from `content/index.toml`; a site may load its own file instead.

use crate::domain::error::{ChapelError, Result};
use crate::domain::{ContentEntry, ContentKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_INDEX: &str = include_str!("../../content/index.toml");

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    entries: Vec<ContentEntry>,
}

/// Immutable, ordered collection of content entries.
///
/// Entry order is significant: it breaks score ties in search results and
/// orders autocomplete suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentIndex {
    entries: Vec<ContentEntry>,
}

impl ContentIndex {
    /// Builds an index, validating every entry and rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Content`] for the first invalid or duplicate entry.
    pub fn new(entries: Vec<ContentEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.id.as_str()) {
                return Err(ChapelError::Content(format!("duplicate entry id {}", entry.id)));
            }
        }
        Ok(Self { entries })
    }

    /// Loads the embedded index.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded TOML is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_INDEX)
    }

    /// Parses an index from TOML with `[[entries]]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Content`] for malformed TOML or invalid entries.
    pub fn from_toml(source: &str) -> Result<Self> {
        let file: IndexFile = toml::from_str(source)
            .map_err(|e| ChapelError::Content(format!("content index: {e}")))?;
        let index = Self::new(file.entries)?;
        tracing::debug!(entries = index.len(), "content index loaded");
        Ok(index)
    }

    /// Reads and parses an index file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    #[must_use]
    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ContentEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn of_kind(&self, kind: ContentKind) -> impl Iterator<Item = &ContentEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Words and tags suggestions are drawn from, in index order: every
    /// whitespace-separated title word (both languages, ASCII punctuation
    /// trimmed) and every tag. Duplicates are kept; callers de-duplicate.
    pub fn suggestion_terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|entry| {
            entry
                .title
                .variants()
                .flat_map(str::split_whitespace)
                .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\''))
                .chain(entry.tags.iter().map(String::as_str))
                .filter(|term| !term.is_empty())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_index_is_valid() {
        let index = ContentIndex::builtin().unwrap();
        assert!(index.len() >= 10);
        for kind in ContentKind::ALL {
            assert!(index.of_kind(kind).count() > 0, "no {kind} entries");
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let source = r#"
            [[entries]]
            id = "a"
            kind = "news"
            title = { en = "One" }
            url = "/news/one"

            [[entries]]
            id = "a"
            kind = "news"
            title = { en = "Two" }
            url = "/news/two"
        "#;
        let err = ContentIndex::from_toml(source).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn suggestion_terms_include_titles_and_tags() {
        let index = ContentIndex::builtin().unwrap();
        let terms: Vec<&str> = index.suggestion_terms().collect();
        assert!(terms.contains(&"Grace"));
        assert!(terms.contains(&"salvation"));
        assert!(terms.contains(&"కృప"));
        assert!(!terms.contains(&"Report:"));
    }
}
