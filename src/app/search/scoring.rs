//! Relevance scoring over the content index.
//!
//! All comparisons are plain substring containment on lowercased text, which
//! works the same for Latin and Telugu script.
//!
//! | Match | Points |
//! |-------|--------|
//! | query inside a title variant | 100 |
//! | query inside a description variant | 50 |
//! | query inside a tag | 25 per tag |
//! | query word overlapping a title word | 10 per query word |
//! | query word overlapping a description word | 5 per query word |
//!
//! A query word overlaps a text word when the text word contains it. Words
//! of two characters or fewer take no part in word overlap.
//!
//! With a language filter only text written in that language is scored; an
//! entry without a Telugu description has no description under `te`.

use crate::domain::{ContentEntry, Language, Localized};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

pub const TITLE_MATCH: u32 = 100;
pub const DESCRIPTION_MATCH: u32 = 50;
pub const TAG_MATCH: u32 = 25;
pub const TITLE_WORD_OVERLAP: u32 = 10;
pub const DESCRIPTION_WORD_OVERLAP: u32 = 5;

const MIN_WORD_CHARS: usize = 3;

/// A query prepared once per search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    /// Trimmed, lowercased query text.
    pub text: String,
    /// Query words long enough to take part in word overlap.
    pub words: Vec<String>,
}

impl PreparedQuery {
    /// Returns `None` for an empty or whitespace-only query.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let text = query.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let words = significant_words(&text).map(str::to_string).collect();
        Some(Self { text, words })
    }
}

/// Scores `entry` against `query`. `language` restricts matching to the
/// variants written in that language; `None` matches against both.
#[must_use]
pub fn score(entry: &ContentEntry, query: &PreparedQuery, language: Option<Language>) -> u32 {
    let titles = lowered_variants(&entry.title, language);
    let descriptions = lowered_variants(&entry.description, language);

    let mut total = 0;
    if titles.iter().any(|t| t.contains(&query.text)) {
        total += TITLE_MATCH;
    }
    if descriptions.iter().any(|d| d.contains(&query.text)) {
        total += DESCRIPTION_MATCH;
    }

    total += entry
        .tags
        .iter()
        .filter(|tag| tag.to_lowercase().contains(&query.text))
        .map(|_| TAG_MATCH)
        .sum::<u32>();

    total += TITLE_WORD_OVERLAP * overlapping_words(&query.words, &titles);
    total += DESCRIPTION_WORD_OVERLAP * overlapping_words(&query.words, &descriptions);
    total
}

/// Character ranges `(start, end)`, end exclusive, of `query` inside `text`.
///
/// Every case-insensitive occurrence of the query is marked. Only when the
/// query does not occur verbatim are fuzzy match positions used, with
/// adjacent characters coalesced into one range.
#[must_use]
pub fn highlight_ranges(text: &str, query: &str, matcher: &SkimMatcherV2) -> Vec<(usize, usize)> {
    let exact = substring_ranges(text, query.trim());
    if !exact.is_empty() {
        return exact;
    }

    let Some((_score, indices)) = matcher.fuzzy_indices(text, query.trim()) else {
        return Vec::new();
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

/// Non-overlapping occurrences of `needle` in `haystack`, compared char by
/// char in lowercase so indices stay in `haystack` characters.
fn substring_ranges(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let fold = |c: char| c.to_lowercase().next().unwrap_or(c);
    let hay: Vec<char> = haystack.chars().map(fold).collect();
    let pattern: Vec<char> = needle.chars().map(fold).collect();
    if pattern.is_empty() || pattern.len() > hay.len() {
        return Vec::new();
    }

    let mut ranges = Vec::new();
    let mut start = 0;
    while start + pattern.len() <= hay.len() {
        if hay[start..start + pattern.len()] == pattern[..] {
            ranges.push((start, start + pattern.len()));
            start += pattern.len();
        } else {
            start += 1;
        }
    }
    ranges
}

fn lowered_variants(text: &Localized, language: Option<Language>) -> Vec<String> {
    match language {
        Some(language) => text.own(language).map(str::to_lowercase).into_iter().collect(),
        None => text.variants().map(str::to_lowercase).collect(),
    }
}

fn significant_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || (c.is_ascii_punctuation() && c != '\''))
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
}

/// Number of query words that overlap at least one word of `texts`.
fn overlapping_words(query_words: &[String], texts: &[String]) -> u32 {
    query_words
        .iter()
        .filter(|qw| {
            texts
                .iter()
                .flat_map(|t| significant_words(t))
                .any(|w| w.contains(qw.as_str()))
        })
        .map(|_| 1)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentKind;

    fn entry() -> ContentEntry {
        ContentEntry {
            id: "grace".to_string(),
            kind: ContentKind::Sermon,
            title: Localized::new("Grace That Saves", "రక్షించే కృప"),
            description: Localized::english("The free gift of God's grace"),
            tags: vec!["grace".to_string(), "salvation".to_string()],
            url: "/sermons/grace".to_string(),
            date: None,
        }
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(PreparedQuery::new("   ").is_none());
        assert!(PreparedQuery::new("").is_none());
    }

    #[test]
    fn all_components_add_up() {
        let q = PreparedQuery::new("Grace").unwrap();
        // title + description + one tag + title word + description word
        assert_eq!(score(&entry(), &q, None), 100 + 50 + 25 + 10 + 5);
    }

    #[test]
    fn word_overlap_without_substring_match() {
        let q = PreparedQuery::new("saving grac").unwrap();
        // "grace" contains "grac"; "saving" overlaps nothing
        assert_eq!(score(&entry(), &q, None), 10 + 5);
    }

    #[test]
    fn longer_query_words_do_not_overlap_short_text_words() {
        // "graces" and "together" contain "grace" and "the" but not the reverse
        let q = PreparedQuery::new("graces").unwrap();
        assert_eq!(score(&entry(), &q, None), 0);
        let q = PreparedQuery::new("together").unwrap();
        assert_eq!(score(&entry(), &q, None), 0);
    }

    #[test]
    fn language_filter_ignores_english_fallback() {
        // the description has no Telugu variant
        let q = PreparedQuery::new("gift").unwrap();
        assert_eq!(score(&entry(), &q, None), 50 + 5);
        assert_eq!(score(&entry(), &q, Some(Language::En)), 50 + 5);
        assert_eq!(score(&entry(), &q, Some(Language::Te)), 0);

        let q = PreparedQuery::new("grace").unwrap();
        assert_eq!(score(&entry(), &q, Some(Language::Te)), 25);
    }

    #[test]
    fn telugu_matches_by_containment() {
        let q = PreparedQuery::new("కృప").unwrap();
        assert_eq!(score(&entry(), &q, None), 100 + 10);
        assert_eq!(score(&entry(), &q, Some(Language::En)), 0);
    }

    #[test]
    fn short_words_do_not_overlap() {
        let q = PreparedQuery::new("of").unwrap();
        assert_eq!(score(&entry(), &q, None), 50);
    }

    #[test]
    fn highlights_coalesce_adjacent_characters() {
        let matcher = SkimMatcherV2::default();
        assert_eq!(highlight_ranges("Grace That Saves", "grace", &matcher), vec![(0, 5)]);
        assert!(highlight_ranges("Grace", "xyz", &matcher).is_empty());
    }

    #[test]
    fn highlights_prefer_exact_occurrences() {
        let matcher = SkimMatcherV2::default();
        // fuzzy matching alone could pick scattered letters for "sa"
        assert_eq!(highlight_ranges("Grace That Saves", "sa", &matcher), vec![(11, 13)]);
        assert_eq!(highlight_ranges("Faith to faith", "FAITH", &matcher), vec![(0, 5), (9, 14)]);
        assert_eq!(highlight_ranges("రక్షించే కృప", "కృప", &matcher), vec![(9, 12)]);
        assert_eq!(highlight_ranges("Grace That Saves", "gts", &matcher).len(), 3);
    }
}
