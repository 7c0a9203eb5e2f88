//! Adapter for Nautilus.
//!
//! Articles carry their topic either under an explicit `/topics/{name}/`
//! segment or as a channel name in the first path position
//! (`https://nautil.us/art-science/...`). A site-wide RSS feed makes date
//! discovery a single fetch, like Aeon.

use crate::scrapers::{SourceAdapter, host_matches};
use url::Url;

const CHANNELS: &[&str] = &[
    "art-science",
    "biology-beyond",
    "catalysts",
    "cosmos",
    "culture",
    "currents",
    "earth",
    "life",
    "mind",
    "ocean",
    "one-question",
    "abstractions",
    "rewilding",
    "ballotbox-science",
    "alliance",
    "spark",
    "animal",
    "climates",
    "food",
    "kinship",
    "reality",
    "rebel",
    "wise",
    "the-porthole",
];

pub struct Nautilus;

impl SourceAdapter for Nautilus {
    fn handles(&self, url: &Url) -> bool {
        host_matches(url, "nautil.us")
    }

    fn source_name(&self) -> &'static str {
        "Nautilus"
    }

    fn source_slug(&self) -> &'static str {
        "nautilus"
    }

    /// The segment after `/topics/` wins; otherwise any recognized channel
    /// name anywhere in the path.
    fn category_from_path(&self, url: &Url) -> Option<String> {
        let parts: Vec<&str> = url.path().trim_matches('/').split('/').collect();
        if let Some(idx) = parts.iter().position(|p| *p == "topics") {
            if let Some(topic) = parts.get(idx + 1) {
                if !topic.is_empty() {
                    return Some(topic.to_string());
                }
            }
        }
        parts
            .iter()
            .find(|p| CHANNELS.contains(p))
            .map(|p| p.to_string())
    }

    fn body_selectors(&self) -> &'static [&'static str] {
        &[
            r#"[class*="article-body"]"#,
            r#"[class*="entry-content"]"#,
            r#"[class*="post-content"]"#,
            "article",
            "main",
        ]
    }

    fn byline_selector(&self) -> Option<&'static str> {
        Some(r#"[class*="byline"]"#)
    }

    fn title_suffix(&self) -> Option<&'static str> {
        Some("Nautilus")
    }

    fn feed_url(&self) -> Option<&'static str> {
        Some("https://nautil.us/feed/")
    }

    fn is_article_path(&self, path: &str) -> bool {
        path != "/" && !path.starts_with("/topics/") && path.trim_matches('/') != "feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_ownership() {
        assert!(Nautilus.handles(&url("https://nautil.us/the-mystery-of-sleep-123/")));
        assert!(Nautilus.handles(&url("https://www.nautil.us/cosmos/dark-matter/")));
        assert!(!Nautilus.handles(&url("https://aeon.co/essays/why-we-dream")));
    }

    #[test]
    fn test_category_from_topics_segment() {
        assert_eq!(
            Nautilus.category_from_path(&url("https://nautil.us/topics/neuroscience/brain-maps/")),
            Some("neuroscience".to_string())
        );
    }

    #[test]
    fn test_category_from_channel_name() {
        assert_eq!(
            Nautilus.category_from_path(&url("https://nautil.us/art-science/seeing-sound/")),
            Some("art-science".to_string())
        );
        assert_eq!(
            Nautilus.category_from_path(&url("https://nautil.us/the-mystery-of-sleep-123/")),
            None
        );
    }

    #[test]
    fn test_feed_capability() {
        assert_eq!(Nautilus.feed_url(), Some("https://nautil.us/feed/"));
        assert!(Nautilus.listing_page_url(1).is_none());
    }

    #[test]
    fn test_topic_listings_are_not_articles() {
        assert!(!Nautilus.is_article_path("/topics/neuroscience/"));
        assert!(!Nautilus.is_article_path("/feed/"));
        assert!(Nautilus.is_article_path("/cosmos/dark-matter/"));
    }
}
