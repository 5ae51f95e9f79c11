//! Sermon and event listing filters.
//!
//! A listing shows one [`ContentKind`] page by page, narrowed by tag and
//! year and ordered by date or title. Changing any filter returns to the
//! first page. Filters persist per kind under
//! [`keys::listing`](crate::storage::keys::listing); the page does not.

use crate::content::ContentIndex;
use crate::domain::{ContentEntry, ContentKind, Language};
use crate::events::{EventBus, SubscriptionId};
use crate::storage::{keys, KeyValueStore, PersistedSlot};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilters {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub sort: ListingSort,
}

/// Observable state of a listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingState {
    pub kind: ContentKind,
    pub filters: ListingFilters,
    pub page: usize,
    pub page_size: usize,
}

pub struct ListingStore {
    state: ListingState,
    index: Arc<ContentIndex>,
    slot: PersistedSlot<ListingFilters>,
    observers: EventBus<ListingState>,
}

impl ListingStore {
    pub fn new(kind: ContentKind, index: Arc<ContentIndex>, backend: Arc<dyn KeyValueStore>) -> Self {
        let slot = PersistedSlot::new(backend, keys::listing(kind.as_str()));
        let filters = slot.load().unwrap_or_default();
        Self {
            state: ListingState {
                kind,
                filters,
                page: 1,
                page_size: DEFAULT_PAGE_SIZE,
            },
            index,
            slot,
            observers: EventBus::new(),
        }
    }

    /// Sets the page size, at least 1.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.state.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub const fn state(&self) -> &ListingState {
        &self.state
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.update_filters(|f| f.tag = tag.filter(|t| !t.trim().is_empty()));
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.update_filters(|f| f.year = year);
    }

    pub fn set_sort(&mut self, sort: ListingSort) {
        self.update_filters(|f| f.sort = sort);
    }

    pub fn reset_filters(&mut self) {
        self.update_filters(|f| *f = ListingFilters::default());
    }

    /// Moves to `page`, clamped to the available pages.
    pub fn set_page(&mut self, page: usize) {
        let page = page.clamp(1, self.total_pages());
        if page != self.state.page {
            self.state.page = page;
            self.notify();
        }
    }

    pub fn next_page(&mut self) {
        self.set_page(self.state.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.state.page.saturating_sub(1));
    }

    /// Every entry passing the filters, in display order.
    #[must_use]
    pub fn matching(&self) -> Vec<&ContentEntry> {
        let filters = &self.state.filters;
        let mut entries: Vec<&ContentEntry> = self
            .index
            .of_kind(self.state.kind)
            .filter(|e| {
                filters
                    .tag
                    .as_ref()
                    .map_or(true, |tag| e.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
            })
            .filter(|e| filters.year.map_or(true, |y| e.date.map(|d| d.year()) == Some(y)))
            .collect();

        entries.sort_by(|a, b| compare(a, b, filters.sort));
        entries
    }

    /// The current page of [`matching`](Self::matching).
    #[must_use]
    pub fn visible(&self) -> Vec<&ContentEntry> {
        let skip = (self.state.page - 1) * self.state.page_size;
        self.matching()
            .into_iter()
            .skip(skip)
            .take(self.state.page_size)
            .collect()
    }

    /// Number of pages; an empty listing still has one.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.matching().len().div_ceil(self.state.page_size).max(1)
    }

    /// Tags used by this kind, sorted and lowercased, for the filter menu.
    #[must_use]
    pub fn available_tags(&self) -> Vec<String> {
        self.index
            .of_kind(self.state.kind)
            .flat_map(|e| e.tags.iter().map(|t| t.to_lowercase()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Years with dated entries of this kind, newest first.
    #[must_use]
    pub fn available_years(&self) -> Vec<i32> {
        self.index
            .of_kind(self.state.kind)
            .filter_map(|e| e.date.map(|d| d.year()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    fn update_filters(&mut self, change: impl FnOnce(&mut ListingFilters)) {
        let _span = tracing::debug_span!("listing_filters", kind = %self.state.kind).entered();

        let before = self.state.filters.clone();
        change(&mut self.state.filters);
        if self.state.filters == before {
            return;
        }
        self.state.page = 1;
        self.slot.save(&self.state.filters);
        tracing::debug!(filters = ?self.state.filters, "listing filters changed");
        self.notify();
    }

    fn notify(&self) {
        self.observers.publish(&self.state);
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ListingState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for ListingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Undated entries sort after dated ones in both date orders; equal keys
/// keep index order.
fn compare(a: &ContentEntry, b: &ContentEntry, sort: ListingSort) -> Ordering {
    match sort {
        ListingSort::Title => a
            .title
            .get(Language::En)
            .to_lowercase()
            .cmp(&b.title.get(Language::En).to_lowercase()),
        ListingSort::Newest | ListingSort::Oldest => match (a.date, b.date) {
            (Some(x), Some(y)) if sort == ListingSort::Newest => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}
