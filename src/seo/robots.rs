//! `robots.txt` generation.

use super::absolute_url;

#[must_use]
pub const fn cache_control() -> &'static str {
    "public, max-age=86400"
}

/// Paths crawlers are asked to skip unless the caller provides its own.
pub const DEFAULT_DISALLOW: &[&str] = &["/api/", "/admin/"];

/// Allows everything except `disallow` and points crawlers at the sitemap.
#[must_use]
pub fn robots_txt(site_url: &str, disallow: &[&str]) -> String {
    let mut text = String::from("User-agent: *\nAllow: /\n");
    for path in disallow {
        text.push_str("Disallow: ");
        text.push_str(path);
        text.push('\n');
    }
    text.push_str("\nSitemap: ");
    text.push_str(&absolute_url(site_url, "/sitemap.xml"));
    text.push('\n');
    text
}
