//! Chapel: the client-side state layer of a bilingual (English/Telugu)
//! church website.
//!
//! Chapel provides:
//! - Persistent language and theme preferences with OS theme following
//! - Navigation, mobile menu and loading state with document side effects
//! - Relevance-scored content search with suggestions and recent searches
//! - Listing filters for sermon and event pages
//! - Contact and prayer request forms with validation, drafts and submission
//! - Sitemap, robots.txt and RSS generation from the same content index

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs) / host page                          │  ← Entry points
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Stores (app/)                                      │  ← Single-owner state
//! │  language · theme · navigation · loading            │
//! │  search · listing · forms                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Events        │   │ Storage       │   │ UI seams      │
//! │ (events/)     │   │ (storage/)    │   │ (ui/)         │
//! │ - Broadcast   │   │ - Key-value   │   │ - Document    │
//! │ - Observers   │   │ - JSON file   │   │ - Nav tree    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, i18n, content index, SEO                   │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing + OpenTelemetry JSON-lines export        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: The stores
//! - [`content`]: Static content index
//! - [`domain`]: Errors, preference enums and content records
//! - [`events`]: Broadcast bus and store observers
//! - [`i18n`]: Translation catalogues
//! - [`infrastructure`]: Data directory and path helpers
//! - [`observability`]: Tracing setup
//! - [`seo`]: Sitemap, robots.txt and RSS
//! - [`storage`]: Durable key-value storage
//! - [`ui`]: Document side effects and navigation tree
//!
//! # Configuration
//!
//! ```toml
//! site_url = "https://gracefellowship.example"
//! default_language = "te"
//! default_theme = "system"
//! contact_endpoint = "https://gracefellowship.example/api/contact"
//! prayer_endpoint = "https://gracefellowship.example/api/prayer"
//! request_timeout_secs = 15
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use chapel::storage::MemoryStore;
//! use chapel::ui::DocumentState;
//! use chapel::{initialize, ColorScheme, Config, Language};
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let mut stores = initialize(
//!     &config,
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(DocumentState::new()),
//!     ColorScheme::Light,
//! )?;
//!
//! stores.search.perform_search("grace", None);
//! stores.set_language(Language::Te);
//! assert!(!stores.search.results().is_empty());
//! # Ok::<(), chapel::ChapelError>(())
//! ```

pub mod app;
pub mod content;
pub mod domain;
pub mod events;
pub mod i18n;
pub mod infrastructure;
pub mod observability;
pub mod seo;
pub mod storage;
pub mod ui;

pub use app::{
    ContactForm, FormStore, HttpTransport, LanguageStore, ListingStore, LoadingStore, NavigationStore,
    PrayerRequestForm, SearchStore, ThemeStore,
};
pub use domain::{ChapelError, ColorScheme, ContentEntry, ContentKind, Language, Result, ThemePreference};
pub use events::{AppEvent, Broadcast};

use content::ContentIndex;
use i18n::Translations;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::{JsonFileStore, KeyValueStore};
use ui::Document;

/// Site configuration, read from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Absolute site URL used by the SEO generators.
    pub site_url: String,

    /// Directory for the preference file and trace output. Defaults to
    /// [`infrastructure::default_data_dir`]. A leading `~` is expanded.
    pub data_dir: Option<PathBuf>,

    /// Language used until the visitor picks one.
    pub default_language: Language,

    /// Theme used until the visitor picks one.
    pub default_theme: ThemePreference,

    /// Endpoint for contact form submissions.
    pub contact_endpoint: Option<String>,

    /// Endpoint for prayer request submissions.
    pub prayer_endpoint: Option<String>,

    /// Timeout for form submissions, in seconds.
    pub request_timeout_secs: u64,

    /// User agent sent with submissions.
    pub user_agent: String,

    /// Tracing level: `trace`, `debug`, `info`, `warn`, `error`. `RUST_LOG`
    /// takes precedence. Default: `"info"`
    pub trace_level: Option<String>,

    /// Content index file to use instead of the built-in one.
    pub content_index: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: "https://gracefellowship.example".to_string(),
            data_dir: None,
            default_language: Language::En,
            default_theme: ThemePreference::System,
            contact_endpoint: None,
            prayer_endpoint: None,
            request_timeout_secs: 15,
            user_agent: format!("chapel/{}", env!("CARGO_PKG_VERSION")),
            trace_level: None,
            content_index: None,
        }
    }
}

impl Config {
    /// Parses configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Config`] for malformed TOML, unknown keys, or
    /// values of the wrong type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chapel::{Config, Language};
    ///
    /// let config = Config::from_toml_str("default_language = \"te\"")?;
    /// assert_eq!(config.default_language, Language::Te);
    /// assert_eq!(config.request_timeout_secs, 15);
    /// # Ok::<(), chapel::ChapelError>(())
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ChapelError::Config(e.to_string()))?;
        if config.site_url.trim().is_empty() {
            return Err(ChapelError::Config("site_url must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// The data directory with `~` expanded.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.as_ref().map_or_else(infrastructure::default_data_dir, |dir| {
            infrastructure::expand_tilde(dir)
        })
    }

    /// Loads the configured content index, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns an error if the index file cannot be read or is invalid.
    pub fn content_index(&self) -> Result<ContentIndex> {
        match &self.content_index {
            Some(path) => ContentIndex::load(&infrastructure::expand_tilde(path)),
            None => ContentIndex::builtin(),
        }
    }

    /// Opens the JSON preference file in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file is
    /// unreadable.
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStore>> {
        let dir = self.data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(Arc::new(JsonFileStore::open(dir.join("state.json"))?))
    }

    /// Builds the HTTP transport for the configured form endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ChapelError::Config`] if the HTTP client cannot be built.
    pub fn http_transport(&self) -> Result<HttpTransport> {
        let mut transport = HttpTransport::new(Duration::from_secs(self.request_timeout_secs), &self.user_agent)?;
        if let Some(url) = &self.contact_endpoint {
            transport = transport.with_endpoint(<ContactForm as app::forms::FormSchema>::NAME, url);
        }
        if let Some(url) = &self.prayer_endpoint {
            transport = transport.with_endpoint(<PrayerRequestForm as app::forms::FormSchema>::NAME, url);
        }
        Ok(transport)
    }
}

/// Every store of one visitor session, sharing one broadcast bus, one
/// storage backend and one document.
#[derive(Debug)]
pub struct Stores {
    pub broadcast: Arc<Broadcast>,
    pub language: LanguageStore,
    pub theme: ThemeStore,
    pub navigation: NavigationStore,
    pub loading: LoadingStore,
    pub search: SearchStore,
    pub sermons: ListingStore,
    pub events: ListingStore,
    pub contact: FormStore<ContactForm>,
    pub prayer: FormStore<PrayerRequestForm>,
}

impl Stores {
    /// Switches the site language and brings the language-dependent stores
    /// along: form messages and, if a search is showing, its results.
    pub fn set_language(&mut self, language: Language) {
        self.language.set(language);
        self.contact.set_language(language);
        self.prayer.set_language(language);
        self.search.rerun();
    }
}

/// Creates the session's stores.
///
/// # Errors
///
/// Returns an error if the translation catalogues or the content index
/// cannot be loaded.
pub fn initialize(
    config: &Config,
    backend: Arc<dyn KeyValueStore>,
    document: Arc<dyn Document>,
    system_scheme: ColorScheme,
) -> Result<Stores> {
    let _span = tracing::debug_span!("initialize", site = %config.site_url).entered();

    let translations = Arc::new(Translations::builtin()?);
    let index = Arc::new(config.content_index()?);
    let broadcast = Arc::new(Broadcast::new());

    let language = LanguageStore::new(
        Arc::clone(&backend),
        Arc::clone(&broadcast),
        Arc::clone(&document),
        Arc::clone(&translations),
        config.default_language,
    );
    let current = language.get();

    let stores = Stores {
        theme: ThemeStore::new(
            Arc::clone(&backend),
            Arc::clone(&broadcast),
            Arc::clone(&document),
            config.default_theme,
            system_scheme,
        ),
        navigation: NavigationStore::new(ui::site_navigation(), Arc::clone(&broadcast), Arc::clone(&document)),
        loading: LoadingStore::new(Arc::clone(&broadcast), Arc::clone(&document)),
        search: SearchStore::new(Arc::clone(&index), Arc::clone(&backend), Arc::clone(&broadcast)),
        sermons: ListingStore::new(ContentKind::Sermon, Arc::clone(&index), Arc::clone(&backend)),
        events: ListingStore::new(ContentKind::Event, Arc::clone(&index), Arc::clone(&backend)),
        contact: FormStore::new(Arc::clone(&backend), Arc::clone(&broadcast), Arc::clone(&translations), current)
            .with_client_info(config.user_agent.clone(), None),
        prayer: FormStore::new(backend, Arc::clone(&broadcast), translations, current)
            .with_client_info(config.user_agent.clone(), None),
        language,
        broadcast,
    };

    tracing::info!(language = %current, entries = index.len(), "stores initialized");
    Ok(stores)
}
