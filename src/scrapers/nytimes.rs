//! Adapter for The New York Times.
//!
//! The most access-restricted of the built-in sources: article pages served
//! to anonymous clients frequently carry only a teaser plus a "verify
//! access" interstitial, while the full text still sits in JSON-LD or the
//! preloaded script state. The adapter therefore only supplies selectors and
//! naming; the fallback tiers in [`crate::body`] do the heavy lifting.

use crate::scrapers::{SourceAdapter, host_matches};
use url::Url;

const SECTIONS: &[&str] = &[
    "science",
    "politics",
    "business",
    "technology",
    "sports",
    "arts",
    "style",
    "health",
    "world",
    "us",
    "opinion",
    "books",
    "food",
    "travel",
    "magazine",
    "t-magazine",
    "interactive",
    "well",
    "climate",
    "realestate",
];

pub struct NewYorkTimes;

impl SourceAdapter for NewYorkTimes {
    fn handles(&self, url: &Url) -> bool {
        host_matches(url, "nytimes.com")
    }

    fn source_name(&self) -> &'static str {
        "New York Times"
    }

    fn source_slug(&self) -> &'static str {
        "nytimes"
    }

    /// NYT paths bury the section between date segments
    /// (`/2025/06/30/science/...`), so any matching segment counts.
    fn category_from_path(&self, url: &Url) -> Option<String> {
        url.path()
            .trim_matches('/')
            .split('/')
            .find(|part| SECTIONS.contains(part))
            .map(|part| part.to_string())
    }

    fn body_selectors(&self) -> &'static [&'static str] {
        &[
            r#"section[name="articleBody"]"#,
            ".StoryBodyCompanionColumn",
            r#"[data-module="ArticleBody"]"#,
            r#"[class*="StoryBody"]"#,
            "article",
            "main",
        ]
    }

    fn byline_selector(&self) -> Option<&'static str> {
        Some(r#"span[class*="byline"]"#)
    }

    fn title_suffix(&self) -> Option<&'static str> {
        Some("The New York Times")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_category_between_date_segments() {
        let adapter = NewYorkTimes;
        assert_eq!(
            adapter.category_from_path(&url(
                "https://www.nytimes.com/2025/06/30/science/whale-song.html"
            )),
            Some("science".to_string())
        );
        assert_eq!(
            adapter.category_from_path(&url(
                "https://www.nytimes.com/interactive/2025/06/30/upshot/foo.html"
            )),
            Some("interactive".to_string())
        );
        assert_eq!(
            adapter.category_from_path(&url("https://www.nytimes.com/crosswords")),
            None
        );
    }

    #[test]
    fn test_ownership() {
        let adapter = NewYorkTimes;
        assert!(adapter.handles(&url("https://www.nytimes.com/2025/06/30/science/x.html")));
        assert!(adapter.handles(&url("https://nytimes.com/2025/06/30/science/x.html")));
        assert!(!adapter.handles(&url("https://cooking.nytimes.com/recipes/1")));
    }
}
