//! Generic form store.
//!
//! # Submission
//!
//! ```text
//! submit_form
//!   ├─ clear messages
//!   ├─ validate_form ── invalid ──▶ errors shown, nothing sent
//!   └─ valid
//!        ├─ is_submitting = true
//!        ├─ transport.submit(..)
//!        ├─ is_submitting = false   (also if the future is dropped)
//!        ├─ Ok  ──▶ draft reset, success message, saved draft discarded
//!        └─ Err ──▶ error message, draft kept for retry
//! ```
//!
//! Validation errors are kept per field and cleared the moment that field is
//! edited. Messages are localized in the store's current language.

use super::validation::ValidationError;
use super::{FieldValue, FormData, FormSchema};
use crate::app::transport::{Submission, SubmissionMetadata, SubmissionTransport};
use crate::domain::Language;
use crate::events::{AppEvent, Broadcast, EventBus, SubscriptionId};
use crate::i18n::Translations;
use crate::storage::{keys, KeyValueStore, PersistedSlot};
use chrono::Utc;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Observable state of a form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub data: FormData,
    pub errors: BTreeMap<String, ValidationError>,
    pub is_submitting: bool,
    pub is_submitted: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

impl FormState {
    #[must_use]
    pub fn text(&self, field: &str) -> &str {
        self.data.get(field).map_or("", FieldValue::as_text)
    }
}

pub struct FormStore<S: FormSchema> {
    state: FormState,
    language: Language,
    translations: Arc<Translations>,
    backend: Arc<dyn KeyValueStore>,
    draft: Option<PersistedSlot<FormData>>,
    user_agent: String,
    referrer: Option<String>,
    observers: EventBus<FormState>,
    broadcast: Arc<Broadcast>,
    _schema: PhantomData<S>,
}

impl<S: FormSchema> FormStore<S> {
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        broadcast: Arc<Broadcast>,
        translations: Arc<Translations>,
        language: Language,
    ) -> Self {
        Self {
            state: FormState {
                data: S::defaults(),
                ..FormState::default()
            },
            language,
            translations,
            backend,
            draft: None,
            user_agent: format!("chapel/{}", env!("CARGO_PKG_VERSION")),
            referrer: None,
            observers: EventBus::new(),
            broadcast,
            _schema: PhantomData,
        }
    }

    /// Sets the user agent and referrer reported with submissions.
    #[must_use]
    pub fn with_client_info(mut self, user_agent: impl Into<String>, referrer: Option<String>) -> Self {
        self.user_agent = user_agent.into();
        self.referrer = referrer;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    /// Language for messages produced from now on.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// The localized validation message for `field`, if it has an error.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<String> {
        self.state
            .errors
            .get(field)
            .map(|e| e.localize(&self.translations, self.language))
    }

    /// Merges `partial` into the draft and clears the errors of every field
    /// it touches. Fields the form does not declare are dropped.
    pub fn set_form_data(&mut self, partial: FormData) {
        let _span = tracing::debug_span!("set_form_data", form = S::NAME, fields = partial.len()).entered();

        for (field, value) in partial {
            if !S::FIELDS.contains(&field.as_str()) {
                tracing::warn!(field = %field, "ignoring unknown form field");
                continue;
            }
            self.state.errors.remove(&field);
            self.state.data.insert(field, value);
        }
        self.mirror_draft();
        self.notify();
    }

    /// Single-field convenience for [`set_form_data`](Self::set_form_data).
    pub fn set_field(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.set_form_data(FormData::from([(field.to_string(), value.into())]));
    }

    /// Checks `value` for `field` against the current draft. Pure.
    #[must_use]
    pub fn validate_field(&self, field: &str, value: &FieldValue) -> Option<ValidationError> {
        S::validate_field(field, value, &self.state.data)
    }

    /// Recomputes one field's error from its current value.
    pub fn validate_field_on_blur(&mut self, field: &str) {
        let value = self
            .state
            .data
            .get(field)
            .cloned()
            .unwrap_or(FieldValue::Text(String::new()));
        match self.validate_field(field, &value) {
            Some(error) => self.state.errors.insert(field.to_string(), error),
            None => self.state.errors.remove(field),
        };
        self.notify();
    }

    /// Validates every field, replaces the stored errors with the result
    /// and returns whether the form is valid.
    pub fn validate_form(&mut self) -> bool {
        let _span = tracing::debug_span!("validate_form", form = S::NAME).entered();

        let empty = FieldValue::Text(String::new());
        let errors: BTreeMap<String, ValidationError> = S::FIELDS
            .iter()
            .filter_map(|field| {
                let value = self.state.data.get(*field).unwrap_or(&empty);
                self.validate_field(field, value)
                    .map(|error| ((*field).to_string(), error))
            })
            .collect();

        if !errors.is_empty() {
            tracing::debug!(invalid = ?errors.keys().collect::<Vec<_>>(), "form has errors");
        }
        self.state.errors = errors;
        self.notify();
        self.state.errors.is_empty()
    }

    /// Validates and, if valid, sends the draft through `transport`.
    /// Returns whether the submission was accepted.
    pub async fn submit_form(&mut self, transport: &dyn SubmissionTransport) -> bool {
        tracing::debug!(form = S::NAME, "submitting form");

        self.state.error_message = None;
        self.state.success_message = None;
        self.state.is_submitted = false;
        if !self.validate_form() {
            return false;
        }

        let submission = Submission {
            form: S::NAME.to_string(),
            data: self.state.data.clone(),
            metadata: SubmissionMetadata {
                timestamp: Utc::now(),
                user_agent: self.user_agent.clone(),
                referrer: self.referrer.clone(),
            },
        };

        self.state.is_submitting = true;
        self.notify();
        let outcome = {
            let _submitting = ClearOnDrop(&mut self.state.is_submitting);
            transport.submit(&submission).await
        };

        let success = match outcome {
            Ok(()) => {
                tracing::info!(form = S::NAME, "form submitted");
                let name = submission.data.get("name").map_or("", FieldValue::as_text);
                let message = self.translations.t_with(
                    self.language,
                    &format!("forms.{}.success", S::NAME),
                    &[("name", name.trim())],
                );
                self.state.data = S::defaults();
                self.state.errors.clear();
                self.state.is_submitted = true;
                self.state.success_message = Some(message);
                self.discard_saved_draft();
                true
            }
            Err(e) => {
                tracing::warn!(form = S::NAME, error = %e, "form submission failed");
                self.state.error_message =
                    Some(self.translations.t(self.language, &format!("forms.{}.error", S::NAME)));
                false
            }
        };

        self.notify();
        self.broadcast.publish(&AppEvent::FormSubmitted {
            form: S::NAME.to_string(),
            success,
        });
        success
    }

    /// Restores the default draft and clears errors and messages.
    pub fn reset_form(&mut self) {
        self.state = FormState {
            data: S::defaults(),
            ..FormState::default()
        };
        self.mirror_draft();
        self.notify();
    }

    pub fn clear_messages(&mut self) {
        self.state.error_message = None;
        self.state.success_message = None;
        self.notify();
    }

    /// Starts mirroring non-empty drafts to
    /// [`keys::draft`](crate::storage::keys::draft).
    pub fn enable_draft_persistence(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(PersistedSlot::new(Arc::clone(&self.backend), keys::draft(S::NAME)));
        }
    }

    /// Loads a saved draft over the current one. Returns whether one was
    /// found. Fields the form does not know are ignored.
    pub fn restore_draft(&mut self) -> bool {
        let Some(saved) = self.draft.as_ref().and_then(PersistedSlot::load) else {
            return false;
        };

        let mut data = S::defaults();
        for (field, value) in saved {
            if S::FIELDS.contains(&field.as_str()) {
                data.insert(field, value);
            }
        }
        self.state.data = data;
        self.state.errors.clear();
        tracing::debug!(form = S::NAME, "draft restored");
        self.notify();
        true
    }

    /// Removes the saved draft, if draft persistence is on.
    pub fn discard_saved_draft(&mut self) {
        if let Some(slot) = &self.draft {
            slot.clear();
        }
    }

    fn mirror_draft(&self) {
        let Some(slot) = &self.draft else {
            return;
        };
        if self.state.data == S::defaults() || self.state.data.values().all(FieldValue::is_empty) {
            slot.clear();
        } else {
            slot.save(&self.state.data);
        }
    }

    fn notify(&self) {
        self.observers.publish(&self.state);
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&FormState) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl<S: FormSchema> std::fmt::Debug for FormStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormStore")
            .field("form", &S::NAME)
            .field("errors", &self.state.errors)
            .field("is_submitting", &self.state.is_submitting)
            .finish_non_exhaustive()
    }
}

struct ClearOnDrop<'a>(&'a mut bool);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::forms::{form_data, ContactForm, PrayerRequestForm};
    use crate::domain::error::{ChapelError, Result};
    use crate::storage::{MemoryStore, UnavailableStore};
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    struct Recording {
        fail: bool,
        sent: Mutex<Vec<Submission>>,
    }

    impl Recording {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl SubmissionTransport for Recording {
        fn submit<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                self.sent.lock().unwrap().push(submission.clone());
                if self.fail {
                    Err(ChapelError::Network("HTTP error: 503".to_string()))
                } else {
                    Ok(())
                }
            })
        }
    }

    fn contact(backend: Arc<dyn KeyValueStore>) -> FormStore<ContactForm> {
        FormStore::new(
            backend,
            Arc::new(Broadcast::new()),
            Arc::new(Translations::builtin().unwrap()),
            Language::En,
        )
    }

    fn filled(store: &mut FormStore<ContactForm>) {
        store.set_form_data(form_data([
            ("name", FieldValue::from("Anu Kumari")),
            ("email", FieldValue::from("anu@example.com")),
            ("subject", FieldValue::from("Sunday service")),
            ("message", FieldValue::from("What time does the Telugu service start?")),
            ("consent", FieldValue::from(true)),
        ]));
    }

    #[test]
    fn validate_form_collects_every_error() {
        let mut form = contact(Arc::new(MemoryStore::new()));
        assert!(!form.validate_form());
        let invalid: Vec<&str> = form.state().errors.keys().map(String::as_str).collect();
        assert_eq!(invalid, vec!["consent", "email", "message", "name", "subject"]);
        assert_eq!(form.error_for("name").as_deref(), Some("This field is required"));
    }

    #[test]
    fn editing_clears_only_that_field() {
        let mut form = contact(Arc::new(MemoryStore::new()));
        form.validate_form();
        form.set_field("message", "valid text longer than ten chars");
        assert!(!form.state().errors.contains_key("message"));
        assert!(form.state().errors.contains_key("name"));
    }

    #[test]
    fn blur_validates_one_field() {
        let mut form = contact(Arc::new(MemoryStore::new()));
        form.set_field("email", "nope");
        form.validate_field_on_blur("email");
        assert_eq!(form.state().errors.len(), 1);
        form.set_field("email", "anu@example.com");
        form.validate_field_on_blur("email");
        assert!(form.state().errors.is_empty());
    }

    #[tokio::test]
    async fn undeclared_fields_never_reach_the_payload() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut form = contact(Arc::clone(&backend));
        form.enable_draft_persistence();
        filled(&mut form);
        form.set_field("emial", "typo@example.com");
        assert!(!form.state().data.contains_key("emial"));

        let saved = String::from_utf8(backend.get(&keys::draft("contact")).unwrap().unwrap()).unwrap();
        assert!(!saved.contains("emial"));

        let transport = Recording::new(false);
        assert!(form.submit_form(&transport).await);
        let sent = transport.sent.lock().unwrap();
        let fields: Vec<&str> = sent[0].data.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["category", "consent", "email", "message", "name", "phone", "subject"]);
    }

    #[tokio::test]
    async fn invalid_form_is_never_sent() {
        let mut form = contact(Arc::new(MemoryStore::new()));
        let transport = Recording::new(false);
        assert!(!form.submit_form(&transport).await);
        assert!(transport.sent.lock().unwrap().is_empty());
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn success_resets_draft_with_localized_message() {
        let mut form = contact(Arc::new(MemoryStore::new())).with_client_info("test-agent", Some("/contact".to_string()));
        filled(&mut form);
        let transport = Recording::new(false);

        assert!(form.submit_form(&transport).await);
        assert!(!form.is_submitting());
        assert!(form.state().is_submitted);
        assert_eq!(form.state().data, ContactForm::defaults());
        assert_eq!(
            form.state().success_message.as_deref(),
            Some("Thank you, Anu Kumari! Your message has been sent. We will get back to you soon.")
        );

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].form, "contact");
        assert_eq!(sent[0].metadata.user_agent, "test-agent");
        assert_eq!(sent[0].metadata.referrer.as_deref(), Some("/contact"));
    }

    #[tokio::test]
    async fn failure_keeps_draft_for_retry() {
        let mut form = contact(Arc::new(MemoryStore::new()));
        form.set_language(Language::Te);
        filled(&mut form);

        assert!(!form.submit_form(&Recording::new(true)).await);
        assert!(!form.is_submitting());
        assert_eq!(form.state().text("name"), "Anu Kumari");
        assert_eq!(
            form.state().error_message.as_deref(),
            Some("క్షమించండి, మీ సందేశాన్ని పంపలేకపోయాము. దయచేసి మళ్ళీ ప్రయత్నించండి.")
        );

        form.clear_messages();
        assert!(form.submit_form(&Recording::new(false)).await);
        assert_eq!(form.state().error_message, None);
    }

    #[test]
    fn drafts_survive_reload_until_discarded() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut form = contact(Arc::clone(&backend));
        form.enable_draft_persistence();
        form.set_field("message", "Half-written message");

        let mut reloaded = contact(Arc::clone(&backend));
        reloaded.enable_draft_persistence();
        assert!(reloaded.restore_draft());
        assert_eq!(reloaded.state().text("message"), "Half-written message");

        reloaded.discard_saved_draft();
        let mut again = contact(backend);
        again.enable_draft_persistence();
        assert!(!again.restore_draft());
    }

    #[test]
    fn draft_persistence_failure_is_not_fatal() {
        let mut form = contact(Arc::new(UnavailableStore));
        form.enable_draft_persistence();
        form.set_field("name", "Anu");
        assert!(!form.restore_draft());
        assert_eq!(form.state().text("name"), "Anu");
    }

    #[tokio::test]
    async fn anonymous_prayer_request() {
        let mut form: FormStore<PrayerRequestForm> = FormStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Broadcast::new()),
            Arc::new(Translations::builtin().unwrap()),
            Language::En,
        );
        form.set_form_data(form_data([
            ("anonymous", FieldValue::from(true)),
            ("request", FieldValue::from("Please pray for my mother's surgery.")),
            ("category", FieldValue::from("healing")),
        ]));

        assert!(form.submit_form(&Recording::new(false)).await);
        assert_eq!(
            form.state().success_message.as_deref(),
            Some("Your prayer request has been received. Our prayer team will be praying for you.")
        );
    }
}
