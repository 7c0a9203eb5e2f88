//! Source adapters and the adapter registry.
//!
//! Each supported publication gets one stateless adapter describing how to
//! recognize its URLs, which selectors carry its article bodies, how its
//! bylines are marked up, and (optionally) how to enumerate its articles for
//! a calendar date. Adapters are leaves: the generic extraction and
//! discovery machinery in [`crate::metadata`], [`crate::body`], and
//! [`crate::discover`] consumes the configuration they expose.
//!
//! # Supported Sources
//!
//! | Source | Module | Discovery | Notes |
//! |--------|--------|-----------|-------|
//! | The New Yorker | [`newyorker`] | `/latest` pagination | prefers modified date |
//! | New York Times | [`nytimes`] | none | paywall-heavy, relies on fallback tiers |
//! | The Atlantic | [`atlantic`] | none | section from first path segment |
//! | Aeon | [`aeon`] | RSS feed | essays only, videos excluded |
//! | Nautilus | [`nautilus`] | RSS feed | topic/channel path categories |

pub mod aeon;
pub mod atlantic;
pub mod nautilus;
pub mod newyorker;
pub mod nytimes;

use crate::models::DatePreference;
use itertools::Itertools;
use scraper::{Html, Selector};
use url::Url;

/// A named, stateless per-source strategy.
///
/// Ownership predicates must match exact registered domains (with an
/// explicit `www.` allowance); use [`host_matches`] so a broad match never
/// shadows a more specific adapter registered later.
pub trait SourceAdapter: Send + Sync {
    /// Whether this adapter claims the URL.
    fn handles(&self, url: &Url) -> bool;

    /// Stable human-readable source name, e.g. "The New Yorker".
    fn source_name(&self) -> &'static str;

    /// Stable machine-safe slug, e.g. "newyorker".
    fn source_slug(&self) -> &'static str;

    /// Which probed date this source's listings are ordered by.
    fn date_preference(&self) -> DatePreference {
        DatePreference::PreferPublished
    }

    /// Category inferred from the URL path, when the source encodes one.
    fn category_from_path(&self, url: &Url) -> Option<String>;

    /// Site-specific body selectors, most specific first.
    fn body_selectors(&self) -> &'static [&'static str];

    /// CSS selector for the source's byline element, when it has one.
    fn byline_selector(&self) -> Option<&'static str> {
        None
    }

    /// Trailing site-name suffix to strip from `<title>` text.
    fn title_suffix(&self) -> Option<&'static str> {
        None
    }

    /// Chronological feed endpoint, when the source exposes one. Feed
    /// discovery takes precedence over listing pagination.
    fn feed_url(&self) -> Option<&'static str> {
        None
    }

    /// URL of the reverse-chronological listing page, when the source
    /// supports paginated discovery.
    fn listing_page_url(&self, _page: u32) -> Option<String> {
        None
    }

    /// Whether a URL path looks like an article (as opposed to section
    /// fronts, newsletters, and other non-article listing entries).
    fn is_article_path(&self, _path: &str) -> bool {
        true
    }

    /// Extract candidate article URLs from a listing page.
    ///
    /// The default scans anchors, resolves relative links against the page
    /// URL, and keeps deduplicated same-source article paths. Adapters with
    /// structured listings override this.
    fn listing_urls(&self, html: &str, base: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let anchors = Selector::parse("a[href]").unwrap();
        document
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| base.join(href).ok())
            .filter(|u| self.handles(u) && self.is_article_path(u.path()))
            .unique_by(|u| u.to_string())
            .collect()
    }
}

/// Exact-domain ownership check with a `www.` allowance.
pub fn host_matches(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => host == domain || host == format!("www.{domain}"),
        None => false,
    }
}

/// Fixed, ordered adapter list. Exactly one adapter claims a given URL;
/// registration order is the deliberate tie-break.
pub struct Registry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Registry {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// The registry with every built-in source, in registration order.
    pub fn with_default_sources() -> Self {
        Self::new(vec![
            Box::new(newyorker::NewYorker),
            Box::new(nytimes::NewYorkTimes),
            Box::new(atlantic::Atlantic),
            Box::new(aeon::Aeon),
            Box::new(nautilus::Nautilus),
        ])
    }

    /// First adapter whose ownership predicate matches, or `None`.
    ///
    /// Callers must treat `None` as a hard failure for the URL, never as an
    /// invitation to attempt default extraction.
    pub fn resolve(&self, url: &Url) -> Option<&dyn SourceAdapter> {
        self.adapters.iter().map(|a| a.as_ref()).find(|a| a.handles(url))
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn SourceAdapter> {
        self.adapters.iter().map(|a| a.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_matches_exact_and_www() {
        assert!(host_matches(&url("https://newyorker.com/a"), "newyorker.com"));
        assert!(host_matches(&url("https://www.newyorker.com/a"), "newyorker.com"));
        assert!(!host_matches(&url("https://cdn.newyorker.com/a"), "newyorker.com"));
        assert!(!host_matches(&url("https://newyorker.com.evil.example/a"), "newyorker.com"));
    }

    #[test]
    fn test_resolve_picks_owning_adapter() {
        let registry = Registry::with_default_sources();
        let adapter = registry
            .resolve(&url("https://www.newyorker.com/culture/essay"))
            .unwrap();
        assert_eq!(adapter.source_slug(), "newyorker");

        let adapter = registry
            .resolve(&url("https://www.nytimes.com/2025/06/30/science/foo.html"))
            .unwrap();
        assert_eq!(adapter.source_slug(), "nytimes");
    }

    #[test]
    fn test_resolve_unknown_source_is_none() {
        let registry = Registry::with_default_sources();
        assert!(registry.resolve(&url("https://example.com/article")).is_none());
    }

    #[test]
    fn test_adapter_exclusivity() {
        // For any URL a built-in adapter claims, no other adapter claims it.
        let registry = Registry::with_default_sources();
        let urls = [
            "https://www.newyorker.com/culture/essay",
            "https://www.nytimes.com/2025/06/30/science/foo.html",
            "https://www.theatlantic.com/science/2025/12/bar/",
            "https://aeon.co/essays/why-we-dream",
            "https://nautil.us/cosmos/dark-matter/",
        ];
        for u in urls {
            let u = url(u);
            let claiming = registry.adapters().filter(|a| a.handles(&u)).count();
            assert_eq!(claiming, 1, "expected exactly one adapter for {u}");
        }
    }

    #[test]
    fn test_default_listing_urls_scans_anchors() {
        let base = url("https://aeon.co/");
        let html = r#"<html><body>
            <a href="/essays/first">one</a>
            <a href="/essays/first">dup</a>
            <a href="/videos/clip">video</a>
            <a href="https://elsewhere.example/essays/x">offsite</a>
        </body></html>"#;
        let adapter = aeon::Aeon;
        let urls = adapter.listing_urls(html, &base);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].path(), "/essays/first");
    }
}
