//! Form drafts, validation and submission.
//!
//! One generic [`FormStore`] drives every form; a [`FormSchema`] supplies the
//! form's name, fields, defaults and per-field rules.
//!
//! # Modules
//!
//! - [`validation`]: Reusable field rules and [`ValidationError`]
//! - [`contact`]: Contact form schema
//! - [`prayer`]: Prayer request schema
//! - [`store`]: The form store itself

pub mod contact;
pub mod prayer;
pub mod store;
pub mod validation;

pub use contact::ContactForm;
pub use prayer::PrayerRequestForm;
pub use store::{FormState, FormStore};
pub use validation::ValidationError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field value: text inputs and selects carry text, checkboxes a
/// flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// The text of a text field; flags read as empty.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Flag(_) => "",
        }
    }

    /// The state of a checkbox; text reads as unchecked.
    #[must_use]
    pub const fn as_flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }

    /// Blank text and unchecked flags are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Flag(flag) => !flag,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Field name to value. Ordered so payloads and saved drafts are stable.
pub type FormData = BTreeMap<String, FieldValue>;

/// Builds [`FormData`] from `(field, value)` pairs.
pub fn form_data<I, K, V>(pairs: I) -> FormData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// Static description of one form.
pub trait FormSchema: Send + Sync + 'static {
    /// Short name used in storage keys, payloads and message keys.
    const NAME: &'static str;

    /// Every field, in display order.
    const FIELDS: &'static [&'static str];

    /// The draft of a fresh or freshly reset form.
    fn defaults() -> FormData;

    /// Checks one field. `draft` is the whole current draft, for rules that
    /// depend on another field.
    fn validate_field(field: &str, value: &FieldValue, draft: &FormData) -> Option<ValidationError>;
}
