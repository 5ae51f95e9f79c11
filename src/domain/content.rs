//! Content index entry model.
//!
//! A [`ContentEntry`] is one hand-authored, searchable record: an event, a
//! sermon, a news item or a ministry. Entries are loaded once and never
//! mutated at runtime.

use super::error::{ChapelError, Result};
use super::preference::Language;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text available in English and, optionally, Telugu.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub te: Option<String>,
}

impl Localized {
    pub fn new(en: impl Into<String>, te: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            te: Some(te.into()),
        }
    }

    pub fn english(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            te: None,
        }
    }

    /// Returns the variant for `language`, falling back to English when the
    /// Telugu variant is missing or blank.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Te => self
                .te
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(&self.en),
        }
    }

    /// The variant written in `language` itself, without falling back.
    #[must_use]
    pub fn own(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => Some(self.en.as_str()),
            Language::Te => self.te.as_deref(),
        }
        .filter(|t| !t.trim().is_empty())
    }

    /// Iterates over every non-empty variant.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.en.as_str())
            .chain(self.te.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// The single type category an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Event,
    Sermon,
    News,
    Ministry,
}

impl ContentKind {
    pub const ALL: [Self; 4] = [Self::Event, Self::Sermon, Self::News, Self::Ministry];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Sermon => "sermon",
            Self::News => "news",
            Self::Ministry => "ministry",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ChapelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ChapelError::InvalidPreference {
                kind: "content kind",
                value: s.to_string(),
            })
    }
}

/// One searchable record of the static content index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Stable identifier, unique within an index.
    pub id: String,
    pub kind: ContentKind,
    pub title: Localized,
    #[serde(default)]
    pub description: Localized,
    /// Free-text tags, matched case-insensitively.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Canonical site-relative URL (`/sermons/grace-that-saves`).
    pub url: String,
    /// Publication or event date, if the entry has one.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl ContentEntry {
    /// Checks the entry invariants: non-empty id, URL and English title.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Content`] naming the offending entry.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ChapelError::Content("entry with empty id".to_string()));
        }
        if self.title.en.trim().is_empty() {
            return Err(ChapelError::Content(format!(
                "entry {} has no English title",
                self.id
            )));
        }
        if !self.url.starts_with('/') {
            return Err(ChapelError::Content(format!(
                "entry {} url must be site-relative, got {:?}",
                self.id, self.url
            )));
        }
        Ok(())
    }
}
