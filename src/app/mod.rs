//! The stores.
//!
//! Each store is an independently constructed, single-owner state container.
//! Callers mutate it only through its actions (`&mut self`), read it through
//! `state()`, and observe it through `subscribe`.
//!
//! # Data Flow
//!
//! ```text
//! caller ──action──▶ store ──commit──▶ [persist] ──▶ store subscribers
//!                                                      │
//!                                                      ▼
//!                                           Broadcast (AppEvent)
//! ```
//!
//! Stores never call each other. When one store's change should affect
//! another (the language changed, so search results should be re-scored),
//! the caller reacts to the broadcast and invokes the second store's action.
//!
//! # Modules
//!
//! - [`language`]: Site language and translation lookup
//! - [`theme`]: Theme preference and effective color scheme
//! - [`navigation`]: Menus and active section
//! - [`loading`]: Named busy flags
//! - [`search`]: Content search, suggestions and recent searches
//! - [`listing`]: Sermon and event listing filters
//! - [`forms`]: Contact and prayer request forms
//! - [`transport`]: Form submission transport

pub mod forms;
pub mod language;
pub mod listing;
pub mod loading;
pub mod navigation;
pub mod search;
pub mod theme;
pub mod transport;

pub use forms::{ContactForm, FormStore, PrayerRequestForm};
pub use language::LanguageStore;
pub use listing::ListingStore;
pub use loading::LoadingStore;
pub use navigation::NavigationStore;
pub use search::{SearchFilters, SearchStore};
pub use theme::ThemeStore;
pub use transport::{HttpTransport, Submission, SubmissionTransport};
