//! Reusable field rules.
//!
//! Rules are pure: they look at a value and return the first problem, or
//! `None`. Messages are resolved through the translation catalogue at the
//! point they are shown, so a language switch re-localizes existing errors.

use crate::domain::Language;
use crate::i18n::Translations;
use std::fmt;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: regex::Regex = regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref INDIAN_PHONE_REGEX: regex::Regex = regex::Regex::new(r"^(\+91)?[6-9][0-9]{9}$").unwrap();
    static ref INTERNATIONAL_PHONE_REGEX: regex::Regex = regex::Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
}

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidEmail,
    InvalidPhone,
    InvalidChoice,
    ConsentRequired,
}

impl ValidationError {
    /// Catalogue key of the message.
    #[must_use]
    pub const fn message_key(self) -> &'static str {
        match self {
            Self::Required => "forms.validation.required",
            Self::TooShort { .. } => "forms.validation.too_short",
            Self::TooLong { .. } => "forms.validation.too_long",
            Self::InvalidEmail => "forms.validation.invalid_email",
            Self::InvalidPhone => "forms.validation.invalid_phone",
            Self::InvalidChoice => "forms.validation.invalid_choice",
            Self::ConsentRequired => "forms.validation.consent_required",
        }
    }

    /// The message in `language`, with limits filled in.
    #[must_use]
    pub fn localize(self, translations: &Translations, language: Language) -> String {
        match self {
            Self::TooShort { min } => {
                translations.t_with(language, self.message_key(), &[("min", &min.to_string())])
            }
            Self::TooLong { max } => {
                translations.t_with(language, self.message_key(), &[("max", &max.to_string())])
            }
            _ => translations.t(language, self.message_key()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("field is required"),
            Self::TooShort { min } => write!(f, "must be at least {min} characters"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::InvalidEmail => f.write_str("invalid email address"),
            Self::InvalidPhone => f.write_str("invalid phone number"),
            Self::InvalidChoice => f.write_str("not one of the allowed options"),
            Self::ConsentRequired => f.write_str("consent is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Required text between `min` and `max` characters after trimming.
pub fn required_text(value: &str, min: usize, max: usize) -> Option<ValidationError> {
    if value.trim().is_empty() {
        return Some(ValidationError::Required);
    }
    length(value, min, max)
}

/// Length check in characters (not bytes) of the trimmed value.
pub fn length(value: &str, min: usize, max: usize) -> Option<ValidationError> {
    let count = value.trim().chars().count();
    if count < min {
        Some(ValidationError::TooShort { min })
    } else if count > max {
        Some(ValidationError::TooLong { max })
    } else {
        None
    }
}

#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value.trim())
}

/// Accepts Indian mobile numbers (optional `+91`, ten digits starting 6-9)
/// and generic international numbers of 10 to 15 digits. Spaces, dashes,
/// dots and parentheses are ignored.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let compact: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    INDIAN_PHONE_REGEX.is_match(&compact) || INTERNATIONAL_PHONE_REGEX.is_match(&compact)
}

/// Required email.
pub fn email(value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(ValidationError::Required)
    } else if is_email(value) {
        None
    } else {
        Some(ValidationError::InvalidEmail)
    }
}

/// Email that may be left blank.
pub fn optional_email(value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        None
    } else {
        email(value)
    }
}

/// Phone that may be left blank.
pub fn optional_phone(value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() || is_phone(value) {
        None
    } else {
        Some(ValidationError::InvalidPhone)
    }
}

pub fn one_of(value: &str, allowed: &[&str]) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(ValidationError::Required)
    } else if allowed.contains(&value.trim()) {
        None
    } else {
        Some(ValidationError::InvalidChoice)
    }
}

pub const fn consent(checked: bool) -> Option<ValidationError> {
    if checked {
        None
    } else {
        Some(ValidationError::ConsentRequired)
    }
}
