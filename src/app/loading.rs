//! Named busy flags.
//!
//! One boolean per independently loading UI region plus the reserved
//! [`GLOBAL`] key. Setting `global` marks the document body so styling
//! outside the stores can swap the page for a loading view; the marker is
//! removed the moment `global` clears.

use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::ui::Document;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Reserved key for whole-page loading.
pub const GLOBAL: &str = "global";

/// Observable state of the loading store. Absent keys are not loading.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingState {
    pub flags: BTreeMap<String, bool>,
}

impl LoadingState {
    #[must_use]
    pub fn is_loading(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_any_loading(&self) -> bool {
        self.flags.values().any(|v| *v)
    }
}

pub struct LoadingStore {
    state: LoadingState,
    observers: EventBus<LoadingState>,
    broadcast: Arc<Broadcast>,
    document: Arc<dyn Document>,
}

impl LoadingStore {
    pub fn new(broadcast: Arc<Broadcast>, document: Arc<dyn Document>) -> Self {
        document.set_global_loading_marker(false);
        Self {
            state: LoadingState::default(),
            observers: EventBus::new(),
            broadcast,
            document,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &LoadingState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self, key: &str) -> bool {
        self.state.is_loading(key)
    }

    #[must_use]
    pub fn is_any_loading(&self) -> bool {
        self.state.is_any_loading()
    }

    #[must_use]
    pub fn is_global_loading(&self) -> bool {
        self.state.is_loading(GLOBAL)
    }

    pub fn set_loading(&mut self, key: &str, loading: bool) {
        if self.state.is_loading(key) == loading {
            return;
        }
        tracing::debug!(key = %key, loading, "loading flag changed");

        if loading {
            self.state.flags.insert(key.to_string(), true);
        } else {
            self.state.flags.remove(key);
        }

        if key == GLOBAL {
            self.document.set_global_loading_marker(loading);
        }
        self.observers.publish(&self.state);
        if key == GLOBAL {
            self.broadcast
                .publish(&AppEvent::GlobalLoadingChanged { active: loading });
        }
    }

    pub fn set_global_loading(&mut self, loading: bool) {
        self.set_loading(GLOBAL, loading);
    }

    /// Marks `key` loading until the returned guard is dropped.
    pub fn begin(&mut self, key: impl Into<String>) -> LoadingGuard<'_> {
        let key = key.into();
        self.set_loading(&key, true);
        LoadingGuard { store: self, key }
    }

    /// Runs `work` with `key` marked loading. The flag clears when `work`
    /// finishes or when the returned future is dropped early.
    pub async fn with_loading<F, T>(&mut self, key: impl Into<String>, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.begin(key);
        work.await
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LoadingState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for LoadingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Clears its loading flag on drop.
pub struct LoadingGuard<'a> {
    store: &'a mut LoadingStore,
    key: String,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(&self.key, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::DocumentState;

    fn store() -> (LoadingStore, Arc<DocumentState>) {
        let document = Arc::new(DocumentState::new());
        (LoadingStore::new(Arc::new(Broadcast::new()), document.clone()), document)
    }

    #[test]
    fn flags_are_independent() {
        let (mut loading, _) = store();
        assert!(!loading.is_any_loading());

        loading.set_loading("sermons", true);
        loading.set_loading("gallery", true);
        loading.set_loading("sermons", false);
        assert!(loading.is_loading("gallery"));
        assert!(!loading.is_loading("sermons"));
        assert!(loading.is_any_loading());

        loading.set_loading("gallery", false);
        assert!(!loading.is_any_loading());
    }

    #[test]
    fn global_flag_drives_body_marker() {
        let (mut loading, document) = store();
        loading.set_global_loading(true);
        assert!(document.flags().global_loading);
        assert!(loading.is_any_loading());

        loading.set_global_loading(false);
        assert!(!document.flags().global_loading);
        assert!(!loading.is_any_loading());
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let (mut loading, _) = store();
        {
            let _guard = loading.begin("events");
        }
        assert!(!loading.is_loading("events"));
    }

    #[tokio::test]
    async fn with_loading_clears_after_work() {
        let (mut loading, document) = store();
        let value = loading.with_loading(GLOBAL, async { 7 }).await;
        assert_eq!(value, 7);
        assert!(!loading.is_global_loading());
        assert!(!document.flags().global_loading);
    }
}
