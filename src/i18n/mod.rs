//! Translation catalogues and key lookup.
//!
//! Catalogues are TOML files with nested tables, flattened into dotted keys
//! (`[forms.contact] success = ".."` becomes `forms.contact.success`). The
//! English and Telugu catalogues ship embedded in the binary.
//!
//! # Lookup Order
//!
//! 1. The requested language's catalogue
//! 2. The English catalogue
//! 3. The caller's fallback, if given
//! 4. The key itself
//!
//! ```
//! use chapel::i18n::Translations;
//! use chapel::Language;
//!
//! let translations = Translations::builtin()?;
//! assert_eq!(translations.t(Language::Te, "nav.home"), "హోమ్");
//! assert_eq!(translations.t(Language::Te, "nonexistent_key"), "nonexistent_key");
//! # Ok::<(), chapel::ChapelError>(())
//! ```

use crate::domain::error::{ChapelError, Result};
use crate::domain::Language;
use std::collections::HashMap;

const EN_CATALOGUE: &str = include_str!("../../locales/en.toml");
const TE_CATALOGUE: &str = include_str!("../../locales/te.toml");

/// Flattened `key → text` map for one language.
pub type Catalogue = HashMap<String, String>;

/// English and Telugu catalogues.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    en: Catalogue,
    te: Catalogue,
}

impl Translations {
    /// Loads the embedded catalogues.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Content`] if an embedded catalogue is not valid
    /// TOML or contains non-string leaves.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(EN_CATALOGUE, TE_CATALOGUE)
    }

    /// Builds catalogues from TOML sources.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Content`] on malformed TOML or non-string leaves.
    pub fn from_toml(en: &str, te: &str) -> Result<Self> {
        let en = parse_catalogue(en, Language::En)?;
        let te = parse_catalogue(te, Language::Te)?;

        let missing = en.keys().filter(|k| !te.contains_key(*k)).count();
        if missing > 0 {
            tracing::debug!(missing, "telugu catalogue falls back to english for some keys");
        }

        Ok(Self { en, te })
    }

    fn catalogue(&self, language: Language) -> &Catalogue {
        match language {
            Language::En => &self.en,
            Language::Te => &self.te,
        }
    }

    /// Looks up `key`, returning the key itself when no catalogue has it.
    #[must_use]
    pub fn t(&self, language: Language, key: &str) -> String {
        self.lookup(language, key).unwrap_or(key).to_string()
    }

    /// Looks up `key`, returning `fallback` when no catalogue has it.
    #[must_use]
    pub fn t_or(&self, language: Language, key: &str, fallback: &str) -> String {
        self.lookup(language, key).unwrap_or(fallback).to_string()
    }

    /// Looks up `key` and substitutes `{name}` placeholders.
    #[must_use]
    pub fn t_with(&self, language: Language, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.lookup(language, key).unwrap_or(key);
        interpolate(template, params)
    }

    /// Whether `key` exists in the requested language's own catalogue.
    #[must_use]
    pub fn has(&self, language: Language, key: &str) -> bool {
        self.catalogue(language).contains_key(key)
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.catalogue(language)
            .get(key)
            .or_else(|| self.en.get(key))
            .map(String::as_str)
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

fn parse_catalogue(source: &str, language: Language) -> Result<Catalogue> {
    let table: toml::Table = source
        .parse()
        .map_err(|e| ChapelError::Content(format!("{language} catalogue: {e}")))?;

    let mut catalogue = Catalogue::new();
    flatten(&mut catalogue, String::new(), &table, language)?;
    Ok(catalogue)
}

fn flatten(out: &mut Catalogue, prefix: String, table: &toml::Table, language: Language) -> Result<()> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(key, text.clone());
            }
            toml::Value::Table(nested) => flatten(out, key, nested, language)?,
            other => {
                return Err(ChapelError::Content(format!(
                    "{language} catalogue: {key} must be a string, found {}",
                    other.type_str()
                )))
            }
        }
    }
    Ok(())
}
