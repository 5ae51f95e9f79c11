//! Content search store.
//!
//! Two paths with different costs:
//!
//! - [`SearchStore::set_query`] runs on every keystroke and only recomputes
//!   autocomplete suggestions.
//! - [`SearchStore::perform_search`] runs on explicit submit: it scores the
//!   whole content index, applies filters, sorts, and records the query in
//!   the recent-searches list.
//!
//! Recent searches and filters survive across sessions under
//! [`keys::SEARCH`](crate::storage::keys::SEARCH). Everything else is
//! transient.
//!
//! Every completed run bumps [`SearchState::generation`]. Actions take
//! `&mut self`, so two runs on one store can never interleave; the counter
//! lets observers and bus subscribers discard results they have already
//! superseded.

pub mod scoring;

use crate::content::ContentIndex;
use crate::domain::{ContentEntry, ContentKind, Language};
use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::storage::{keys, KeyValueStore, PersistedSlot};
use chrono::NaiveDate;
use fuzzy_matcher::skim::SkimMatcherV2;
use scoring::PreparedQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Maximum number of remembered queries.
pub const RECENT_SEARCHES_CAP: usize = 10;
/// Maximum number of autocomplete suggestions.
pub const MAX_SUGGESTIONS: usize = 5;

const MIN_SUGGEST_CHARS: usize = 2;
const MIN_RECORDED_CHARS: usize = 3;

/// Inclusive date bounds. Either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Filters applied around scoring.
///
/// `category` narrows the entries that get scored. `date_range` and `tags`
/// drop scored entries afterwards; undated entries pass any date range.
/// `language` restricts matching to one language and picks the title that
/// highlights refer to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub category: Option<ContentKind>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub language: Option<Language>,
}

impl SearchFilters {
    #[must_use]
    pub fn category(kind: ContentKind) -> Self {
        Self {
            category: Some(kind),
            ..Self::default()
        }
    }

    fn admits_kind(&self, kind: ContentKind) -> bool {
        self.category.map_or(true, |c| c == kind)
    }

    fn admits_scored(&self, entry: &ContentEntry) -> bool {
        let in_range = match (self.date_range, entry.date) {
            (Some(range), Some(date)) => range.contains(date),
            _ => true,
        };
        in_range && self.shares_tag(entry)
    }

    fn shares_tag(&self, entry: &ContentEntry) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        entry.tags.iter().any(|tag| {
            let tag = tag.to_lowercase();
            self.tags.iter().any(|wanted| {
                let wanted = wanted.to_lowercase();
                tag.contains(&wanted) || wanted.contains(&tag)
            })
        })
    }
}

/// One scored hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub entry: ContentEntry,
    pub score: u32,
    /// Character ranges of the query inside the displayed title.
    pub highlights: Vec<(usize, usize)>,
}

impl SearchResult {
    /// The title the highlights refer to.
    #[must_use]
    pub fn display_title(&self, language: Language) -> &str {
        self.entry.title.get(language)
    }
}

/// Observable state of the search store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    pub query: String,
    pub filters: SearchFilters,
    pub results: Vec<SearchResult>,
    pub suggestions: Vec<String>,
    pub recent_searches: Vec<String>,
    pub is_searching: bool,
    pub has_searched: bool,
    pub generation: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Persisted {
    #[serde(default)]
    recent_searches: Vec<String>,
    #[serde(default)]
    filters: SearchFilters,
}

pub struct SearchStore {
    state: SearchState,
    index: Arc<ContentIndex>,
    slot: PersistedSlot<Persisted>,
    matcher: SkimMatcherV2,
    observers: EventBus<SearchState>,
    broadcast: Arc<Broadcast>,
}

impl SearchStore {
    /// Creates the store over `index`, restoring recent searches and filters.
    pub fn new(index: Arc<ContentIndex>, backend: Arc<dyn KeyValueStore>, broadcast: Arc<Broadcast>) -> Self {
        let slot = PersistedSlot::new(backend, keys::SEARCH);
        let persisted: Persisted = slot.load().unwrap_or_default();

        let mut recent_searches = persisted.recent_searches;
        dedupe_recent(&mut recent_searches);

        tracing::debug!(
            entries = index.len(),
            recent = recent_searches.len(),
            "search store initialized"
        );

        Self {
            state: SearchState {
                filters: persisted.filters,
                recent_searches,
                ..SearchState::default()
            },
            index,
            slot,
            matcher: SkimMatcherV2::default(),
            observers: EventBus::new(),
            broadcast,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &SearchState {
        &self.state
    }

    #[must_use]
    pub fn results(&self) -> &[SearchResult] {
        &self.state.results
    }

    #[must_use]
    pub fn recent_searches(&self) -> &[String] {
        &self.state.recent_searches
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.state.suggestions
    }

    /// Live query update. Recomputes suggestions once the trimmed query is
    /// longer than one character, and clears them otherwise.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.state.suggestions = if text.trim().chars().count() >= MIN_SUGGEST_CHARS {
            self.suggest(&text)
        } else {
            Vec::new()
        };
        self.state.query = text;
        self.notify();
    }

    /// Scores the whole index for `query`.
    ///
    /// `filters`, when given, replace the active filters first. A blank
    /// query clears the results without counting as a search.
    pub fn perform_search(&mut self, query: &str, filters: Option<SearchFilters>) {
        let _span = tracing::debug_span!("perform_search", query = %query, generation = self.state.generation + 1)
            .entered();

        if let Some(filters) = filters {
            self.state.filters = filters;
            self.persist();
        }
        self.run(query);
    }

    /// Replaces the filters and, if a query is active, re-runs it so the
    /// results never disagree with the filters.
    pub fn set_filters(&mut self, filters: SearchFilters) {
        let _span = tracing::debug_span!("set_filters", filters = ?filters).entered();

        self.state.filters = filters;
        self.persist();

        if self.state.query.trim().is_empty() {
            self.notify();
        } else {
            let query = self.state.query.clone();
            self.run(&query);
        }
    }

    /// Re-runs the active query with the active filters, e.g. after the
    /// site language changed. Does nothing without an active query.
    pub fn rerun(&mut self) {
        if self.state.has_searched && !self.state.query.trim().is_empty() {
            let query = self.state.query.clone();
            self.run(&query);
        }
    }

    /// Resets the query and everything derived from it. Recent searches and
    /// filters are kept.
    pub fn clear_search(&mut self) {
        let _span = tracing::debug_span!("clear_search").entered();
        self.state.query.clear();
        self.state.results.clear();
        self.state.suggestions.clear();
        self.state.has_searched = false;
        self.state.is_searching = false;
        self.notify();
    }

    pub fn clear_recent_searches(&mut self) {
        self.state.recent_searches.clear();
        self.persist();
        self.notify();
    }

    /// Removes one remembered query, compared case-insensitively.
    pub fn remove_recent_search(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        let before = self.state.recent_searches.len();
        self.state.recent_searches.retain(|q| q.to_lowercase() != needle);
        if self.state.recent_searches.len() != before {
            self.persist();
            self.notify();
        }
    }

    fn run(&mut self, query: &str) {
        self.state.is_searching = true;
        self.state.query = query.to_string();
        self.state.suggestions.clear();
        self.state.generation += 1;

        match PreparedQuery::new(query) {
            Some(prepared) => {
                self.state.results = self.score_index(&prepared);
                self.state.has_searched = true;
                if prepared.text.chars().count() >= MIN_RECORDED_CHARS {
                    self.record_recent(query.trim());
                }
            }
            None => {
                self.state.results.clear();
                self.state.has_searched = false;
            }
        }
        self.state.is_searching = false;

        tracing::debug!(results = self.state.results.len(), "search completed");
        self.notify();
        self.broadcast.publish(&AppEvent::SearchCompleted {
            query: self.state.query.clone(),
            result_count: self.state.results.len(),
            generation: self.state.generation,
        });
    }

    fn score_index(&self, query: &PreparedQuery) -> Vec<SearchResult> {
        let filters = &self.state.filters;
        let display = filters.language.unwrap_or_default();

        let mut results: Vec<SearchResult> = self
            .index
            .entries()
            .iter()
            .filter(|entry| filters.admits_kind(entry.kind))
            .filter_map(|entry| {
                let score = scoring::score(entry, query, filters.language);
                (score > 0).then_some((entry, score))
            })
            .filter(|(entry, _)| filters.admits_scored(entry))
            .map(|(entry, score)| SearchResult {
                highlights: scoring::highlight_ranges(entry.title.get(display), &query.text, &self.matcher),
                entry: entry.clone(),
                score,
            })
            .collect();

        // stable: ties keep index order
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }

    fn suggest(&self, text: &str) -> Vec<String> {
        let needle = text.trim().to_lowercase();
        let mut seen = HashSet::new();
        self.index
            .suggestion_terms()
            .filter(|term| term.to_lowercase().contains(&needle))
            .filter(|term| seen.insert(term.to_lowercase()))
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect()
    }

    fn record_recent(&mut self, query: &str) {
        let lowered = query.to_lowercase();
        self.state.recent_searches.retain(|q| q.to_lowercase() != lowered);
        self.state.recent_searches.insert(0, query.to_string());
        self.state.recent_searches.truncate(RECENT_SEARCHES_CAP);
        self.persist();
    }

    fn persist(&self) {
        self.slot.save(&Persisted {
            recent_searches: self.state.recent_searches.clone(),
            filters: self.state.filters.clone(),
        });
    }

    fn notify(&self) {
        self.observers.publish(&self.state);
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SearchState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for SearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchStore")
            .field("query", &self.state.query)
            .field("filters", &self.state.filters)
            .field("results", &self.state.results.len())
            .field("generation", &self.state.generation)
            .finish_non_exhaustive()
    }
}

/// Drops case-insensitive duplicates (first wins) and enforces the cap on
/// a list loaded from storage.
fn dedupe_recent(recent: &mut Vec<String>) {
    let mut seen = HashSet::new();
    recent.retain(|q| !q.trim().is_empty() && seen.insert(q.to_lowercase()));
    recent.truncate(RECENT_SEARCHES_CAP);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn store_on(backend: Arc<dyn KeyValueStore>) -> SearchStore {
        let index = Arc::new(ContentIndex::builtin().unwrap());
        SearchStore::new(index, backend, Arc::new(Broadcast::new()))
    }

    fn store() -> SearchStore {
        store_on(Arc::new(MemoryStore::new()))
    }

    fn ids(store: &SearchStore) -> Vec<&str> {
        store.results().iter().map(|r| r.entry.id.as_str()).collect()
    }

    #[test]
    fn blank_query_is_not_a_search() {
        let mut s = store();
        s.perform_search("   ", None);
        assert!(s.results().is_empty());
        assert!(!s.state().has_searched);
        assert!(!s.state().is_searching);
        assert!(s.recent_searches().is_empty());
    }

    #[test]
    fn no_match_is_a_valid_empty_result() {
        let mut s = store();
        s.perform_search("zzzzzz", None);
        assert!(s.results().is_empty());
        assert!(s.state().has_searched);
    }

    #[test]
    fn results_are_sorted_and_positive() {
        let mut s = store();
        s.perform_search("grace", None);
        assert!(!s.results().is_empty());
        assert!(s.results().iter().all(|r| r.score > 0));
        assert!(s.results().windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(ids(&s)[0], "grace-that-saves");
    }

    #[test]
    fn category_filter_applies_before_scoring() {
        let mut s = store();
        s.perform_search("youth", Some(SearchFilters::category(ContentKind::News)));
        assert!(s.results().is_empty());
        assert!(s.state().has_searched);

        s.set_filters(SearchFilters::category(ContentKind::Event));
        assert_eq!(ids(&s), vec!["youth-camp-2025"]);
    }

    #[test]
    fn date_range_and_tag_filters() {
        let mut s = store();
        let filters = SearchFilters {
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2025, 1, 1),
                end: None,
            }),
            ..SearchFilters::default()
        };
        s.perform_search("christmas", Some(filters));
        assert!(s.results().is_empty());

        let filters = SearchFilters {
            tags: vec!["CHOIR".to_string()],
            ..SearchFilters::default()
        };
        s.perform_search("christmas", Some(filters));
        assert_eq!(ids(&s), vec!["christmas-carols-2024"]);
    }

    #[test]
    fn common_short_words_inside_the_query_score_nothing() {
        let mut s = store();
        s.perform_search("together", None);
        assert!(s.results().is_empty());

        s.perform_search("father", None);
        assert_eq!(ids(&s), vec!["prodigal-son"]);
    }

    #[test]
    fn telugu_filter_skips_english_only_text() {
        let mut s = store();
        let telugu = SearchFilters {
            language: Some(Language::Te),
            ..SearchFilters::default()
        };
        s.perform_search("father", Some(telugu.clone()));
        assert!(s.results().is_empty());

        s.perform_search("తండ్రి", Some(telugu));
        assert_eq!(ids(&s), vec!["prodigal-son"]);
    }

    #[test]
    fn telugu_query_matches() {
        let mut s = store();
        s.perform_search("కృప", None);
        assert!(ids(&s).contains(&"grace-that-saves"));
    }

    #[test]
    fn highlights_follow_display_language() {
        let mut s = store();
        s.perform_search("camp", None);
        let top = &s.results()[0];
        assert_eq!(top.entry.id, "youth-camp-2025");
        let (start, end) = top.highlights[0];
        let title: String = top
            .display_title(Language::En)
            .chars()
            .skip(start)
            .take(end - start)
            .collect();
        assert_eq!(title, "Camp");
    }

    #[test]
    fn suggestions_need_two_characters() {
        let mut s = store();
        s.set_query("g");
        assert!(s.suggestions().is_empty());

        s.set_query("wor");
        assert!(!s.suggestions().is_empty());
        assert!(s.suggestions().len() <= MAX_SUGGESTIONS);
        assert!(s.suggestions().iter().all(|t| t.to_lowercase().contains("wor")));

        let unique: HashSet<String> = s.suggestions().iter().map(|t| t.to_lowercase()).collect();
        assert_eq!(unique.len(), s.suggestions().len());
    }

    #[test]
    fn clear_search_keeps_recents() {
        let mut s = store();
        s.perform_search("faith", None);
        s.clear_search();
        assert_eq!(s.state().query, "");
        assert!(s.results().is_empty());
        assert!(!s.state().has_searched);
        assert_eq!(s.recent_searches(), ["faith"]);
    }

    #[test]
    fn short_queries_are_not_remembered() {
        let mut s = store();
        s.perform_search("vb", None);
        assert!(s.recent_searches().is_empty());
    }

    #[test]
    fn repeat_query_moves_to_front() {
        let mut s = store();
        s.perform_search("grace", None);
        s.perform_search("faith", None);
        s.perform_search("Grace", None);
        assert_eq!(s.recent_searches(), ["Grace", "faith"]);

        s.remove_recent_search("GRACE");
        assert_eq!(s.recent_searches(), ["faith"]);
        s.clear_recent_searches();
        assert!(s.recent_searches().is_empty());
    }

    #[test]
    fn recents_and_filters_persist() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut s = store_on(Arc::clone(&backend));
        s.perform_search("prayer", Some(SearchFilters::category(ContentKind::Sermon)));

        let reloaded = store_on(backend);
        assert_eq!(reloaded.recent_searches(), ["prayer"]);
        assert_eq!(reloaded.state().filters.category, Some(ContentKind::Sermon));
        assert!(reloaded.results().is_empty());
    }

    #[test]
    fn generation_increases_per_run() {
        let mut s = store();
        s.perform_search("grace", None);
        s.set_filters(SearchFilters::category(ContentKind::Sermon));
        s.rerun();
        assert_eq!(s.state().generation, 3);
    }
}
