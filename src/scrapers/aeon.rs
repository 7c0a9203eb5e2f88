//! Adapter for Aeon.
//!
//! Only essay URLs are owned; video pages share the domain but are not
//! long-form articles. Aeon publishes a site-wide RSS feed, so date
//! discovery is a single feed fetch instead of listing pagination.

use crate::scrapers::{SourceAdapter, host_matches};
use url::Url;

pub struct Aeon;

impl SourceAdapter for Aeon {
    fn handles(&self, url: &Url) -> bool {
        host_matches(url, "aeon.co") && url.path().starts_with("/essays/")
    }

    fn source_name(&self) -> &'static str {
        "Aeon"
    }

    fn source_slug(&self) -> &'static str {
        "aeon"
    }

    /// Aeon encodes no category in essay paths; the generic chain falls
    /// through to `articleSection` structured data.
    fn category_from_path(&self, _url: &Url) -> Option<String> {
        None
    }

    fn body_selectors(&self) -> &'static [&'static str] {
        &[".article__body", "article", "main"]
    }

    fn title_suffix(&self) -> Option<&'static str> {
        Some("Aeon Essays")
    }

    fn feed_url(&self) -> Option<&'static str> {
        Some("https://aeon.co/feed.rss")
    }

    fn is_article_path(&self, path: &str) -> bool {
        path.starts_with("/essays/")
    }
}
