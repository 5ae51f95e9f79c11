//! Language preference store.
//!
//! Holds the active site language, persists it under
//! [`keys::LANGUAGE`](crate::storage::keys::LANGUAGE) as
//! `{"state": {"currentLanguage": "te"}}`, and answers translation lookups
//! against the active language.

use crate::domain::error::Result;
use crate::domain::Language;
use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::i18n::Translations;
use crate::storage::{keys, KeyValueStore, PersistedSlot};
use crate::ui::Document;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Observable state of the language store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageState {
    pub current_language: Language,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Persisted {
    current_language: Language,
}

/// Single-owner store for the site language.
pub struct LanguageStore {
    state: LanguageState,
    slot: PersistedSlot<Persisted>,
    translations: Arc<Translations>,
    observers: EventBus<LanguageState>,
    broadcast: Arc<Broadcast>,
    document: Arc<dyn Document>,
}

impl LanguageStore {
    /// Creates the store, restoring the persisted language or falling back
    /// to `default`.
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        broadcast: Arc<Broadcast>,
        document: Arc<dyn Document>,
        translations: Arc<Translations>,
        default: Language,
    ) -> Self {
        let slot = PersistedSlot::new(backend, keys::LANGUAGE);
        let current_language = slot.load().map_or(default, |p: Persisted| p.current_language);

        tracing::debug!(language = %current_language, "language store initialized");
        document.set_lang(current_language.code());

        Self {
            state: LanguageState { current_language },
            slot,
            translations,
            observers: EventBus::new(),
            broadcast,
            document,
        }
    }

    #[must_use]
    pub const fn get(&self) -> Language {
        self.state.current_language
    }

    #[must_use]
    pub const fn state(&self) -> &LanguageState {
        &self.state
    }

    /// Sets, persists and announces the language.
    pub fn set(&mut self, language: Language) {
        let _span = tracing::debug_span!("language_set", language = %language).entered();

        self.state.current_language = language;
        self.slot.save(&Persisted {
            current_language: language,
        });
        self.document.set_lang(language.code());

        self.observers.publish(&self.state);
        self.broadcast.publish(&AppEvent::LanguageChanged { language });
    }

    /// Parses a language code and sets it.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::InvalidPreference`](crate::ChapelError::InvalidPreference)
    /// when `code` is not a supported language. The store is left unchanged.
    pub fn set_code(&mut self, code: &str) -> Result<()> {
        let language = code.parse()?;
        self.set(language);
        Ok(())
    }

    /// Switches between English and Telugu.
    pub fn toggle(&mut self) {
        self.set(self.state.current_language.next());
    }

    /// Translates `key` in the active language; unknown keys come back as-is.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.translations.t(self.get(), key)
    }

    /// Translates `key` in the active language with an explicit fallback.
    #[must_use]
    pub fn t_or(&self, key: &str, fallback: &str) -> String {
        self.translations.t_or(self.get(), key, fallback)
    }

    /// Translates `key` and fills `{name}` placeholders.
    #[must_use]
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.translations.t_with(self.get(), key, params)
    }

    #[must_use]
    pub fn translations(&self) -> &Arc<Translations> {
        &self.translations
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LanguageState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for LanguageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageStore")
            .field("state", &self.state)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
