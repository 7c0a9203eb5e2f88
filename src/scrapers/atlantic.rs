//! Adapter for The Atlantic.
//!
//! Section is the first URL path segment
//! (`https://www.theatlantic.com/science/2025/12/...`). Metered paywall:
//! teaser pages usually still embed the full `articleBody` in JSON-LD.

use crate::scrapers::{SourceAdapter, host_matches};
use url::Url;

const SECTIONS: &[&str] = &[
    "science",
    "politics",
    "business",
    "technology",
    "sports",
    "culture",
    "ideas",
    "fiction",
    "photo",
    "economy",
    "global",
    "books",
    "health",
    "education",
    "projects",
    "features",
    "family",
    "national-security",
    "magazine",
];

pub struct Atlantic;

impl SourceAdapter for Atlantic {
    fn handles(&self, url: &Url) -> bool {
        host_matches(url, "theatlantic.com")
    }

    fn source_name(&self) -> &'static str {
        "The Atlantic"
    }

    fn source_slug(&self) -> &'static str {
        "atlantic"
    }

    fn category_from_path(&self, url: &Url) -> Option<String> {
        let first = url.path().trim_matches('/').split('/').next()?;
        SECTIONS.contains(&first).then(|| first.to_string())
    }

    fn body_selectors(&self) -> &'static [&'static str] {
        &[
            r#"[class*="article-content-body"]"#,
            r#"[class*="article-content"]"#,
            "article",
            "main",
        ]
    }

    fn byline_selector(&self) -> Option<&'static str> {
        Some(r#"a[href*="/author/"]"#)
    }

    fn title_suffix(&self) -> Option<&'static str> {
        Some("The Atlantic")
    }
}
