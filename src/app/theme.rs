//! Theme preference store.
//!
//! The stored preference may be `system`; the effective scheme handed to the
//! document never is. While `system` is selected the store follows the OS
//! scheme: the host forwards every OS change to
//! [`ThemeStore::system_scheme_changed`] for the lifetime of the page.

use crate::domain::error::Result;
use crate::domain::{ColorScheme, ThemePreference};
use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::storage::{keys, KeyValueStore, PersistedSlot};
use crate::ui::Document;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Observable state of the theme store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThemeState {
    pub theme: ThemePreference,
    /// Last scheme reported by the operating system.
    pub system_scheme: ColorScheme,
}

impl ThemeState {
    #[must_use]
    pub const fn effective(&self) -> ColorScheme {
        self.theme.resolve(self.system_scheme)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Persisted {
    theme: ThemePreference,
}

pub struct ThemeStore {
    state: ThemeState,
    slot: PersistedSlot<Persisted>,
    observers: EventBus<ThemeState>,
    broadcast: Arc<Broadcast>,
    document: Arc<dyn Document>,
}

impl ThemeStore {
    /// Creates the store from persisted state (or `default`) and applies the
    /// effective scheme to the document immediately.
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        broadcast: Arc<Broadcast>,
        document: Arc<dyn Document>,
        default: ThemePreference,
        system_scheme: ColorScheme,
    ) -> Self {
        let slot = PersistedSlot::new(backend, keys::THEME);
        let theme = slot.load().map_or(default, |p: Persisted| p.theme);
        let state = ThemeState {
            theme,
            system_scheme,
        };

        tracing::debug!(theme = %theme, effective = %state.effective(), "theme store initialized");
        document.apply_color_scheme(state.effective());

        Self {
            state,
            slot,
            observers: EventBus::new(),
            broadcast,
            document,
        }
    }

    #[must_use]
    pub const fn get(&self) -> ThemePreference {
        self.state.theme
    }

    #[must_use]
    pub const fn state(&self) -> &ThemeState {
        &self.state
    }

    /// The concrete scheme to render with.
    #[must_use]
    pub const fn resolve_effective(&self) -> ColorScheme {
        self.state.effective()
    }

    pub fn set(&mut self, theme: ThemePreference) {
        let _span = tracing::debug_span!("theme_set", theme = %theme).entered();

        self.state.theme = theme;
        self.slot.save(&Persisted { theme });
        self.commit();
    }

    /// Parses a theme name and sets it.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::InvalidPreference`](crate::ChapelError::InvalidPreference)
    /// for anything but `light`, `dark` or `system`.
    pub fn set_named(&mut self, name: &str) -> Result<()> {
        let theme = name.parse()?;
        self.set(theme);
        Ok(())
    }

    /// Advances light → dark → system → light.
    pub fn toggle(&mut self) {
        self.set(self.state.theme.next());
    }

    /// OS color scheme notification.
    ///
    /// Always records the scheme; only re-applies and re-broadcasts when the
    /// preference is `system`, since otherwise nothing visible changed.
    pub fn system_scheme_changed(&mut self, scheme: ColorScheme) {
        let previous = self.state.system_scheme;
        self.state.system_scheme = scheme;

        if self.state.theme == ThemePreference::System && previous != scheme {
            tracing::debug!(scheme = %scheme, "following OS color scheme change");
            self.commit();
        }
    }

    /// Applies the effective scheme, then notifies observers and the bus.
    fn commit(&self) {
        let effective = self.state.effective();
        self.document.apply_color_scheme(effective);
        self.observers.publish(&self.state);
        self.broadcast.publish(&AppEvent::ThemeChanged {
            preference: self.state.theme,
            effective,
        });
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ThemeState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::ui::DocumentState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store(backend: Arc<dyn KeyValueStore>, os: ColorScheme) -> (ThemeStore, Arc<Broadcast>, Arc<DocumentState>) {
        let broadcast = Arc::new(Broadcast::new());
        let document = Arc::new(DocumentState::new());
        let store = ThemeStore::new(
            backend,
            Arc::clone(&broadcast),
            document.clone(),
            ThemePreference::System,
            os,
        );
        (store, broadcast, document)
    }

    #[test]
    fn preference_round_trips() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        for pref in [ThemePreference::Light, ThemePreference::Dark, ThemePreference::System] {
            let (mut s, _, _) = store(Arc::clone(&backend), ColorScheme::Light);
            s.set(pref);
            let (reloaded, _, _) = store(Arc::clone(&backend), ColorScheme::Light);
            assert_eq!(reloaded.get(), pref);
        }
    }

    #[test]
    fn system_follows_os_changes_without_set() {
        let (mut s, broadcast, document) = store(Arc::new(MemoryStore::new()), ColorScheme::Light);
        let events = Arc::new(AtomicUsize::new(0));
        let e = Arc::clone(&events);
        broadcast.subscribe(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(s.resolve_effective(), ColorScheme::Light);
        s.system_scheme_changed(ColorScheme::Dark);
        assert_eq!(s.resolve_effective(), ColorScheme::Dark);
        assert_eq!(document.flags().color_scheme, ColorScheme::Dark);
        assert_eq!(events.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_preference_ignores_os_changes() {
        let (mut s, _, document) = store(Arc::new(MemoryStore::new()), ColorScheme::Light);
        s.set(ThemePreference::Light);
        let applied = document.flags().scheme_applications;

        s.system_scheme_changed(ColorScheme::Dark);
        assert_eq!(s.resolve_effective(), ColorScheme::Light);
        assert_eq!(document.flags().scheme_applications, applied);

        s.set(ThemePreference::System);
        assert_eq!(s.resolve_effective(), ColorScheme::Dark);
    }

    #[test]
    fn set_applies_root_class_immediately() {
        let (mut s, _, document) = store(Arc::new(MemoryStore::new()), ColorScheme::Light);
        s.toggle();
        assert_eq!(s.get(), ThemePreference::Light);
        s.toggle();
        assert_eq!(document.flags().color_scheme, ColorScheme::Dark);
    }

    #[test]
    fn unknown_theme_name_is_an_error() {
        let (mut s, _, _) = store(Arc::new(MemoryStore::new()), ColorScheme::Light);
        assert!(s.set_named("sepia").is_err());
        assert_eq!(s.get(), ThemePreference::System);
    }
}
