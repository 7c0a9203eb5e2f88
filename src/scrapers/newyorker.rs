//! Adapter for The New Yorker.
//!
//! Articles live under category path segments
//! (`https://www.newyorker.com/culture/postscript/...`). The `/latest`
//! listing is reverse-chronological and embeds its entries in a JSON-LD
//! `ItemList`, which is far more reliable than anchor scanning on this site.
//! The listing is ordered by last-modified date, so day matching prefers the
//! modified date.

use crate::models::DatePreference;
use crate::scrapers::{SourceAdapter, host_matches};
use itertools::Itertools;
use scraper::{Html, Selector};
use url::Url;

const CATEGORIES: &[&str] = &[
    "news",
    "books",
    "culture",
    "magazine",
    "humor",
    "cartoons",
    "archive",
    "crossword-puzzles-and-games",
    "goings-on",
    "puzzles-and-games-dept",
    "newsletter",
    "video",
    "fiction-and-poetry",
    "podcasts",
    "podcast",
];

pub struct NewYorker;

impl SourceAdapter for NewYorker {
    fn handles(&self, url: &Url) -> bool {
        host_matches(url, "newyorker.com")
    }

    fn source_name(&self) -> &'static str {
        "The New Yorker"
    }

    fn source_slug(&self) -> &'static str {
        "newyorker"
    }

    fn date_preference(&self) -> DatePreference {
        DatePreference::PreferModified
    }

    fn category_from_path(&self, url: &Url) -> Option<String> {
        let path = url.path().trim_matches('/');
        CATEGORIES
            .iter()
            .find(|c| path == **c || path.starts_with(&format!("{}/", c)))
            .map(|c| c.to_string())
    }

    fn body_selectors(&self) -> &'static [&'static str] {
        &[
            ".body__container",
            ".container--body-inner",
            "article",
            "main",
        ]
    }

    fn byline_selector(&self) -> Option<&'static str> {
        Some(r#"a[href*="/contributors/"]"#)
    }

    fn title_suffix(&self) -> Option<&'static str> {
        Some("The New Yorker")
    }

    fn listing_page_url(&self, page: u32) -> Option<String> {
        Some(format!("https://www.newyorker.com/latest?page={page}"))
    }

    fn is_article_path(&self, path: &str) -> bool {
        path != "/latest" && !path.starts_with("/latest?")
    }

    /// The `/latest` page carries a JSON-LD `ItemList` of its entries.
    fn listing_urls(&self, html: &str, base: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let scripts = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
        let mut urls = Vec::new();
        for script in document.select(&scripts) {
            let raw = script.text().collect::<String>();
            let Ok(data) = serde_json::from_str::<serde_json::Value>(&raw) else {
                continue;
            };
            if data.get("@type").and_then(|t| t.as_str()) != Some("ItemList") {
                continue;
            }
            let Some(items) = data.get("itemListElement").and_then(|i| i.as_array()) else {
                continue;
            };
            for item in items {
                let Some(raw_url) = item.get("url").and_then(|u| u.as_str()) else {
                    continue;
                };
                if let Ok(resolved) = base.join(raw_url) {
                    if self.handles(&resolved) && self.is_article_path(resolved.path()) {
                        urls.push(resolved);
                    }
                }
            }
        }
        // ItemList entries can repeat non-adjacently.
        urls.into_iter().unique_by(|u| u.to_string()).collect()
    }
}
