//! RSS 2.0 feed of sermons, news and events.

use super::{absolute_url, escape_xml};
use crate::domain::{ContentEntry, ContentKind, Language};
use chrono::NaiveDate;

pub const MAX_ITEMS: usize = 50;

const FEED_KINDS: [ContentKind; 3] = [ContentKind::Sermon, ContentKind::News, ContentKind::Event];

#[must_use]
pub const fn cache_control() -> &'static str {
    "public, max-age=3600"
}

/// Feed-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssChannel {
    pub title: String,
    pub site_url: String,
    pub description: String,
    /// Language of item titles and descriptions.
    pub language: Language,
}

/// Renders the feed: dated sermons, news and events, newest first, at most
/// [`MAX_ITEMS`]. Ties keep input order. `lastBuildDate` is the newest item's
/// date so the output depends only on the input.
#[must_use]
pub fn rss_xml(channel: &RssChannel, entries: &[ContentEntry]) -> String {
    let mut items: Vec<(&ContentEntry, NaiveDate)> = entries
        .iter()
        .filter(|e| FEED_KINDS.contains(&e.kind))
        .filter_map(|e| e.date.map(|d| (e, d)))
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    items.truncate(MAX_ITEMS);

    let link = absolute_url(&channel.site_url, "/");
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n");
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(&channel.title)));
    xml.push_str(&format!("  <link>{}</link>\n", escape_xml(&link)));
    xml.push_str(&format!("  <description>{}</description>\n", escape_xml(&channel.description)));
    xml.push_str(&format!("  <language>{}</language>\n", feed_language(channel.language)));
    if let Some((_, newest)) = items.first() {
        xml.push_str(&format!("  <lastBuildDate>{}</lastBuildDate>\n", rfc2822(*newest)));
    }

    for (entry, date) in &items {
        let url = escape_xml(&absolute_url(&channel.site_url, &entry.url));
        xml.push_str(&format!(
            "  <item>\n    <title>{title}</title>\n    <link>{url}</link>\n    <guid isPermaLink=\"true\">{url}</guid>\n    <description>{description}</description>\n    <category>{kind}</category>\n    <pubDate>{date}</pubDate>\n  </item>\n",
            title = escape_xml(entry.title.get(channel.language)),
            description = escape_xml(entry.description.get(channel.language)),
            kind = entry.kind,
            date = rfc2822(*date),
        ));
    }

    xml.push_str("</channel>\n</rss>\n");
    xml
}

const fn feed_language(language: Language) -> &'static str {
    match language {
        Language::En => "en-in",
        Language::Te => "te-in",
    }
}

fn rfc2822(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc2822())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentIndex;
    use crate::domain::Localized;

    fn channel(language: Language) -> RssChannel {
        RssChannel {
            title: "Grace Fellowship & Friends".to_string(),
            site_url: "https://church.example".to_string(),
            description: "Sermons, news and events".to_string(),
            language,
        }
    }

    #[test]
    fn newest_first_without_ministries() {
        let index = ContentIndex::builtin().unwrap();
        let xml = rss_xml(&channel(Language::En), index.entries());

        assert!(!xml.contains("/ministries/"));
        assert!(xml.contains("<title>Grace Fellowship &amp; Friends</title>"));
        assert!(xml.contains("Jun 2025 00:00:00 +0000</lastBuildDate>"));

        let vbs = xml.find("Vacation Bible School").unwrap();
        let camp = xml.find("Summer Youth Camp").unwrap();
        let prayer = xml.find("The Power of Prayer").unwrap();
        assert!(vbs < camp && camp < prayer);
        assert_eq!(xml, rss_xml(&channel(Language::En), index.entries()));
    }

    #[test]
    fn telugu_feed_uses_telugu_titles() {
        let index = ContentIndex::builtin().unwrap();
        let xml = rss_xml(&channel(Language::Te), index.entries());
        assert!(xml.contains("<language>te-in</language>"));
        assert!(xml.contains("రక్షించే కృప"));
    }

    #[test]
    fn caps_item_count() {
        let entries: Vec<ContentEntry> = (0..60)
            .map(|i| ContentEntry {
                id: format!("news-{i}"),
                kind: ContentKind::News,
                title: Localized::english(format!("Item {i}")),
                description: Localized::default(),
                tags: Vec::new(),
                url: format!("/news/{i}"),
                date: NaiveDate::from_ymd_opt(2025, 1, 1).map(|d| d + chrono::Days::new(i)),
            })
            .collect();
        let xml = rss_xml(&channel(Language::En), &entries);
        assert_eq!(xml.matches("<item>").count(), MAX_ITEMS);
        assert!(xml.contains("Item 59"));
        assert!(!xml.contains("<title>Item 9</title>"));
    }
}
