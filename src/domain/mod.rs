//! Domain layer: error type, preference enums and content records.
//!
//! Nothing here touches storage, events or the host document.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`preference`]: Language, theme and color scheme enums
//! - [`content`]: Content index entry model

pub mod content;
pub mod error;
pub mod preference;

pub use content::{ContentEntry, ContentKind, Localized};
pub use error::{ChapelError, Result};
pub use preference::{ColorScheme, Language, ThemePreference};
