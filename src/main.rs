//! Command-line entry point.
//!
//! # Usage
//!
//! ```bash
//! # Write sitemap.xml, robots.txt and rss.xml into ./public
//! chapel generate --out public
//!
//! # Telugu feed only
//! chapel --config chapel.toml generate rss --language te --out public
//!
//! # Run a search against the content index
//! chapel search grace --category sermon
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use chapel::app::SearchFilters;
use chapel::i18n::Translations;
use chapel::seo::{self, RssChannel, StaticPage};
use chapel::{ChapelError, Config, ContentKind, Language};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Bilingual church site tooling.
#[derive(Parser, Debug)]
#[command(name = "chapel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Print trace events to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate SEO artifacts from the content index
    Generate {
        #[arg(value_enum, default_value_t = Artifact::All)]
        artifact: Artifact,

        /// Output directory
        #[arg(long, short = 'o', default_value = ".")]
        out: PathBuf,

        /// Feed language
        #[arg(long, default_value = "en")]
        language: Language,
    },
    /// Search the content index and print ranked results
    Search {
        query: String,

        /// Restrict to one content kind
        #[arg(long)]
        category: Option<ContentKind>,

        /// Restrict to one language
        #[arg(long)]
        language: Option<Language>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Artifact {
    All,
    Sitemap,
    Robots,
    Rss,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    chapel::observability::init_tracing(&config, cli.verbose);

    let result = match cli.command {
        Command::Generate { artifact, out, language } => generate(&config, artifact, &out, language),
        Command::Search {
            query,
            category,
            language,
        } => search(&config, &query, category, language),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn generate(config: &Config, artifact: Artifact, out: &Path, language: Language) -> Result<(), ChapelError> {
    let _span = tracing::info_span!("generate", ?artifact, out = %out.display()).entered();

    let index = config.content_index()?;
    std::fs::create_dir_all(out)?;

    if matches!(artifact, Artifact::All | Artifact::Sitemap) {
        let xml = seo::sitemap_xml(&config.site_url, &StaticPage::site_pages(), index.entries());
        write_artifact(out, "sitemap.xml", &xml)?;
    }
    if matches!(artifact, Artifact::All | Artifact::Robots) {
        let txt = seo::robots_txt(&config.site_url, seo::robots::DEFAULT_DISALLOW);
        write_artifact(out, "robots.txt", &txt)?;
    }
    if matches!(artifact, Artifact::All | Artifact::Rss) {
        let translations = Translations::builtin()?;
        let channel = RssChannel {
            title: translations.t(language, "site.name"),
            site_url: config.site_url.clone(),
            description: translations.t(language, "site.tagline"),
            language,
        };
        write_artifact(out, "rss.xml", &seo::rss_xml(&channel, index.entries()))?;
    }
    Ok(())
}

fn write_artifact(dir: &Path, name: &str, content: &str) -> Result<(), ChapelError> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "artifact written");
    println!("{}", path.display());
    Ok(())
}

fn search(
    config: &Config,
    query: &str,
    category: Option<ContentKind>,
    language: Option<Language>,
) -> Result<(), ChapelError> {
    let stores = chapel::initialize(
        config,
        std::sync::Arc::new(chapel::storage::MemoryStore::new()),
        std::sync::Arc::new(chapel::ui::DocumentState::new()),
        chapel::ColorScheme::Light,
    )?;
    let mut search = stores.search;

    let filters = SearchFilters {
        category,
        language,
        ..SearchFilters::default()
    };
    search.perform_search(query, Some(filters));

    let display = language.unwrap_or(config.default_language);
    if search.results().is_empty() {
        println!("No results for {query:?}");
    }
    for result in search.results() {
        println!(
            "{:>4}  {:<8} {}  {}",
            result.score,
            result.entry.kind.as_str(),
            result.display_title(display),
            result.entry.url
        );
    }
    Ok(())
}
