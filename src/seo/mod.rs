//! SEO artifacts generated from the content index.
//!
//! Every generator is a pure function of its input: identical input gives
//! byte-identical output, so artifacts can be cached and diffed.
//!
//! # Modules
//!
//! - [`sitemap`]: `sitemap.xml`
//! - [`robots`]: `robots.txt`
//! - [`rss`]: RSS 2.0 feed

pub mod robots;
pub mod rss;
pub mod sitemap;

pub use robots::robots_txt;
pub use rss::{rss_xml, RssChannel};
pub use sitemap::{sitemap_xml, StaticPage};

/// Escapes the five XML special characters.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Joins a site URL and a site-relative path without doubling slashes.
#[must_use]
pub fn absolute_url(site_url: &str, path: &str) -> String {
    let base = site_url.trim_end_matches('/');
    if path.is_empty() || path == "/" {
        format!("{base}/")
    } else if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_xml(r#"Faith & "Works" <Part 1>'s"#),
            "Faith &amp; &quot;Works&quot; &lt;Part 1&gt;&apos;s"
        );
        assert_eq!(escape_xml("కృప"), "కృప");
    }

    #[test]
    fn joins_urls() {
        assert_eq!(absolute_url("https://church.example/", "/sermons"), "https://church.example/sermons");
        assert_eq!(absolute_url("https://church.example", "/"), "https://church.example/");
        assert_eq!(absolute_url("https://church.example", "about"), "https://church.example/about");
    }
}
