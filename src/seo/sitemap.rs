//! `sitemap.xml` generation.

use super::{absolute_url, escape_xml};
use crate::domain::{ContentEntry, ContentKind};

/// Cache policy for the served sitemap.
#[must_use]
pub const fn cache_control() -> &'static str {
    "public, max-age=3600"
}

/// A page that exists independently of the content index.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPage {
    pub path: String,
    pub change_frequency: &'static str,
    pub priority: f32,
}

impl StaticPage {
    pub fn new(path: impl Into<String>, change_frequency: &'static str, priority: f32) -> Self {
        Self {
            path: path.into(),
            change_frequency,
            priority,
        }
    }

    /// The site's top-level pages.
    #[must_use]
    pub fn site_pages() -> Vec<Self> {
        vec![
            Self::new("/", "weekly", 1.0),
            Self::new("/about", "monthly", 0.8),
            Self::new("/ministries", "monthly", 0.8),
            Self::new("/sermons", "weekly", 0.9),
            Self::new("/events", "weekly", 0.9),
            Self::new("/gallery", "monthly", 0.6),
            Self::new("/contact", "yearly", 0.7),
            Self::new("/contact/prayer", "yearly", 0.7),
        ]
    }
}

const fn entry_frequency(kind: ContentKind) -> (&'static str, f32) {
    match kind {
        ContentKind::Event => ("weekly", 0.7),
        ContentKind::Sermon => ("monthly", 0.7),
        ContentKind::News => ("monthly", 0.6),
        ContentKind::Ministry => ("monthly", 0.8),
    }
}

/// Renders a sitemap: static pages first, then entries in the given order.
/// Entries with a date carry it as `lastmod`. Repeated URLs are listed once.
#[must_use]
pub fn sitemap_xml(site_url: &str, static_pages: &[StaticPage], entries: &[ContentEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    let mut seen = std::collections::HashSet::new();

    for page in static_pages {
        if seen.insert(page.path.as_str()) {
            push_url(&mut xml, site_url, &page.path, None, page.change_frequency, page.priority);
        }
    }
    for entry in entries {
        if seen.insert(entry.url.as_str()) {
            let (frequency, priority) = entry_frequency(entry.kind);
            let lastmod = entry.date.map(|d| d.format("%Y-%m-%d").to_string());
            push_url(&mut xml, site_url, &entry.url, lastmod.as_deref(), frequency, priority);
        }
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, site_url: &str, path: &str, lastmod: Option<&str>, frequency: &str, priority: f32) {
    xml.push_str("  <url>\n");
    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&absolute_url(site_url, path))));
    if let Some(lastmod) = lastmod {
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
    }
    xml.push_str(&format!("    <changefreq>{frequency}</changefreq>\n"));
    xml.push_str(&format!("    <priority>{priority:.1}</priority>\n"));
    xml.push_str("  </url>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentIndex;

    #[test]
    fn lists_pages_then_entries() {
        let index = ContentIndex::builtin().unwrap();
        let xml = sitemap_xml("https://church.example/", &StaticPage::site_pages(), index.entries());

        assert!(xml.starts_with("<?xml"));
        assert!(xml.ends_with("</urlset>\n"));
        assert_eq!(xml.matches("<url>").count(), StaticPage::site_pages().len() + index.len());

        let home = xml.find("<loc>https://church.example/</loc>").unwrap();
        let sermon = xml.find("<loc>https://church.example/sermons/grace-that-saves</loc>").unwrap();
        assert!(home < sermon);
        assert!(xml.contains("<lastmod>2025-03-02</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn deterministic_and_deduplicated() {
        let pages = vec![StaticPage::new("/a?x=1&y=2", "daily", 0.5), StaticPage::new("/a?x=1&y=2", "daily", 0.5)];
        let first = sitemap_xml("https://church.example", &pages, &[]);
        assert_eq!(first, sitemap_xml("https://church.example", &pages, &[]));
        assert_eq!(first.matches("<url>").count(), 1);
        assert!(first.contains("/a?x=1&amp;y=2"));
    }
}
