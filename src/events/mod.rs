//! Ambient broadcast events.
//!
//! Any store may announce a state change on the shared [`Broadcast`] bus
//! without knowing who listens; any part of the system may listen without the
//! publisher knowing about it. Events are published after the store has
//! committed its state.

pub mod bus;

pub use bus::{EventBus, SubscriptionId};

use crate::domain::{ColorScheme, Language, ThemePreference};
use serde::{Deserialize, Serialize};

/// The shared, process-wide broadcast channel.
pub type Broadcast = EventBus<AppEvent>;

/// Change notifications published by the stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    /// The site language was set.
    LanguageChanged { language: Language },

    /// The theme preference was set, or the OS scheme changed while the
    /// preference is `system`.
    ThemeChanged {
        preference: ThemePreference,
        effective: ColorScheme,
    },

    /// The mobile menu opened or closed.
    MobileMenuChanged { open: bool },

    /// The active navigation section changed.
    ActiveSectionChanged { section: Option<String> },

    /// The global loading flag flipped.
    GlobalLoadingChanged { active: bool },

    /// A search run finished.
    SearchCompleted {
        query: String,
        result_count: usize,
        generation: u64,
    },

    /// A form submission finished.
    FormSubmitted { form: String, success: bool },
}
