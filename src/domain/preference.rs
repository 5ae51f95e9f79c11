//! Closed preference enums: language, theme and the concrete color scheme.
//!
//! Each enum knows its own fixed toggle cycle and its wire spelling. Parsing
//! from strings goes through [`FromStr`] and rejects anything outside the
//! enum with [`ChapelError::InvalidPreference`].

use super::error::ChapelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English, the default language. Every catalogue key and content title
    /// exists in English.
    #[default]
    En,
    /// Telugu.
    Te,
}

impl Language {
    /// All supported languages in display order.
    pub const ALL: [Self; 2] = [Self::En, Self::Te];

    /// The next language in the en ↔ te cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::En => Self::Te,
            Self::Te => Self::En,
        }
    }

    /// Two-letter code used in URLs, storage and the `lang` attribute.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Te => "te",
        }
    }

    /// Name of the language written in that language.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Te => "తెలుగు",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ChapelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "te" => Ok(Self::Te),
            other => Err(ChapelError::InvalidPreference {
                kind: "language",
                value: other.to_string(),
            }),
        }
    }
}

/// Stored theme preference. `System` is an alias resolved at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the operating system's color scheme.
    #[default]
    System,
}

impl ThemePreference {
    /// The next preference in the light → dark → system → light cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }

    /// Resolves the preference against an observed OS scheme.
    #[must_use]
    pub const fn resolve(self, system: ColorScheme) -> ColorScheme {
        match self {
            Self::Light => ColorScheme::Light,
            Self::Dark => ColorScheme::Dark,
            Self::System => system,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ChapelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(ChapelError::InvalidPreference {
                kind: "theme",
                value: other.to_string(),
            }),
        }
    }
}

/// A concrete color scheme handed to presentation code. Never "system".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Class name applied to the document root.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_cycle_is_two_step() {
        assert_eq!(Language::En.next(), Language::Te);
        assert_eq!(Language::Te.next().next(), Language::Te);
    }

    #[test]
    fn theme_cycle_visits_every_preference() {
        let mut pref = ThemePreference::Light;
        let mut seen = vec![pref];
        for _ in 0..2 {
            pref = pref.next();
            seen.push(pref);
        }
        assert_eq!(
            seen,
            vec![ThemePreference::Light, ThemePreference::Dark, ThemePreference::System]
        );
        assert_eq!(pref.next(), ThemePreference::Light);
    }

    #[test]
    fn system_resolves_to_observed_scheme() {
        assert_eq!(ThemePreference::System.resolve(ColorScheme::Dark), ColorScheme::Dark);
        assert_eq!(ThemePreference::Light.resolve(ColorScheme::Dark), ColorScheme::Light);
    }

    #[test]
    fn parsing_rejects_unknown_values() {
        assert_eq!("te".parse::<Language>().unwrap(), Language::Te);
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(ChapelError::InvalidPreference { kind: "language", .. })
        ));
        assert!("sepia".parse::<ThemePreference>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_codes() {
        assert_eq!(serde_json::to_string(&Language::Te).unwrap(), "\"te\"");
        assert_eq!(
            serde_json::from_str::<ThemePreference>("\"system\"").unwrap(),
            ThemePreference::System
        );
        assert!(serde_json::from_str::<ThemePreference>("\"auto\"").is_err());
    }
}
