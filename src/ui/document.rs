//! Host-document side effects.
//!
//! Some store actions must change the page itself, not just store state: the
//! theme store toggles a root-level class so there is never a flash of the
//! previous theme, the navigation store locks body scrolling while the mobile
//! menu is open, and the loading store marks the body while global loading is
//! active. [`Document`] is the seam for those effects; [`DocumentState`] is
//! an in-process implementation that records the current flags.

use crate::domain::ColorScheme;
use std::sync::Mutex;

/// Root-level presentation flags a store may flip.
///
/// Calls are idempotent: applying the same value twice leaves the document
/// unchanged.
pub trait Document: Send + Sync {
    /// Applies the color scheme class to the document root.
    fn apply_color_scheme(&self, scheme: ColorScheme);

    /// Locks or restores page-body scrolling.
    fn set_scroll_locked(&self, locked: bool);

    /// Adds or removes the body-level global loading marker.
    fn set_global_loading_marker(&self, active: bool);

    /// Sets the document language attribute.
    fn set_lang(&self, code: &str);
}

/// Snapshot of the flags held by a [`DocumentState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentFlags {
    pub color_scheme: ColorScheme,
    pub scroll_locked: bool,
    pub global_loading: bool,
    pub lang: String,
    /// Number of times the root color class was applied.
    pub scheme_applications: usize,
}

/// In-process [`Document`] that records flags instead of touching a DOM.
#[derive(Debug, Default)]
pub struct DocumentState {
    flags: Mutex<DocumentFlags>,
}

impl DocumentState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(DocumentFlags {
                lang: "en".to_string(),
                ..DocumentFlags::default()
            }),
        }
    }

    /// Returns a copy of the current flags.
    #[must_use]
    pub fn flags(&self) -> DocumentFlags {
        self.flags.lock().map(|f| f.clone()).unwrap_or_default()
    }

    fn update(&self, change: impl FnOnce(&mut DocumentFlags)) {
        match self.flags.lock() {
            Ok(mut flags) => change(&mut flags),
            Err(e) => tracing::error!(error = %e, "document flags poisoned"),
        }
    }
}

impl Document for DocumentState {
    fn apply_color_scheme(&self, scheme: ColorScheme) {
        tracing::trace!(scheme = %scheme, "applying root color scheme");
        self.update(|f| {
            f.color_scheme = scheme;
            f.scheme_applications += 1;
        });
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.update(|f| f.scroll_locked = locked);
    }

    fn set_global_loading_marker(&self, active: bool) {
        self.update(|f| f.global_loading = active);
    }

    fn set_lang(&self, code: &str) {
        self.update(|f| f.lang = code.to_string());
    }
}
