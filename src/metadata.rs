//! Metadata extraction via strict per-field priority chains.
//!
//! Each field tries its sources in order and accepts the first non-empty,
//! validated result; every field degrades to a documented default rather
//! than being absent. The chains are deterministic and idempotent: the same
//! document always yields the same metadata.
//!
//! Priority chains:
//! - **title**: JSON-LD `headline` → `og:title` → first `<h1>` → `<title>`
//!   (minus the site-name suffix) → `"untitled"`
//! - **author**: JSON-LD author name → author meta tags → site byline
//!   element (anchor text, else humanized profile slug) → `"unknown"`
//! - **date**: `article:published_time` meta → JSON-LD `datePublished` →
//!   `<time datetime>` → the extraction date
//! - **category**: adapter URL path segment → JSON-LD `articleSection` →
//!   `article:section` meta → source display name

use crate::models::{ArticleMetadata, ExtractedDocument};
use crate::scrapers::SourceAdapter;
use crate::utils::humanize_slug;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

static BY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^by\s+").unwrap());
static EMBEDDED_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static REJECTED_AUTHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(unknown|none|n/a)$").unwrap());

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Extract normalized metadata from a fetched document.
#[instrument(level = "debug", skip_all, fields(url = %doc.url))]
pub fn extract(doc: &ExtractedDocument, adapter: &dyn SourceAdapter) -> ArticleMetadata {
    let document = Html::parse_document(&doc.html);
    let json_ld = json_ld_nodes(&document);

    let title = extract_title(&document, &json_ld, adapter.title_suffix())
        .unwrap_or_else(|| "untitled".to_string());
    let author = extract_author(&document, &json_ld, adapter.byline_selector())
        .unwrap_or_else(|| "unknown".to_string());
    let (published, _modified) = extract_dates(&document, &json_ld);
    let date = published.unwrap_or_else(|| doc.fetched_at.date_naive());
    let category = adapter
        .category_from_path(&doc.url)
        .or_else(|| extract_section(&document, &json_ld))
        .unwrap_or_else(|| adapter.source_name().to_string());
    let url = canonical_url(&document).unwrap_or_else(|| doc.url.clone());

    debug!(%title, %author, %date, %category, "Extracted metadata");
    ArticleMetadata {
        title,
        author,
        date,
        category,
        url,
    }
}

/// Publish and modified dates of a document, for discovery probing.
///
/// Returns `(published, modified)`; either may be `None`.
pub fn probe_dates(html: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let document = Html::parse_document(html);
    let json_ld = json_ld_nodes(&document);
    extract_dates(&document, &json_ld)
}

/// Title of a translated document.
///
/// Translators rewrite the visible heading but rarely the page chrome, so
/// the first `<h1>` wins over meta tags here, unlike the English chain.
pub fn translated_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Some(h1) = document.select(&selector("h1")).next() {
        let text = h1.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }
    meta_content(&document, r#"meta[property="og:title"]"#)
}

/// Canonical URL declared by the page (`og:url`, else `link[rel=canonical]`).
pub fn canonical_url(document: &Html) -> Option<Url> {
    meta_content(document, r#"meta[property="og:url"]"#)
        .or_else(|| {
            document
                .select(&selector(r#"link[rel="canonical"]"#))
                .next()
                .and_then(|l| l.value().attr("href"))
                .map(|h| h.to_string())
        })
        .and_then(|raw| Url::parse(&raw).ok())
}

fn extract_title(document: &Html, json_ld: &[Value], suffix: Option<&str>) -> Option<String> {
    if let Some(headline) = json_ld_str(json_ld, "headline") {
        return Some(headline);
    }
    if let Some(og) = meta_content(document, r#"meta[property="og:title"]"#) {
        return Some(og);
    }
    if let Some(h1) = document.select(&selector("h1")).next() {
        let text = h1.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return Some(text);
        }
    }
    if let Some(title_el) = document.select(&selector("title")).next() {
        let mut text = title_el.text().collect::<String>().trim().to_string();
        if let Some(suffix) = suffix {
            let pattern = Regex::new(&format!(r"\s*[|\-–—]\s*{}\s*$", regex::escape(suffix)))
                .expect("suffix pattern");
            text = pattern.replace(&text, "").trim().to_string();
        }
        if !text.is_empty() {
            return Some(text);
        }
    }
    None
}

fn extract_author(
    document: &Html,
    json_ld: &[Value],
    byline_selector: Option<&str>,
) -> Option<String> {
    if let Some(name) = json_ld.iter().find_map(author_name) {
        if let Some(clean) = clean_author(&name) {
            return Some(clean);
        }
    }
    for css in [r#"meta[property="article:author"]"#, r#"meta[name="author"]"#] {
        if let Some(content) = meta_content(document, css) {
            if let Some(clean) = clean_author(&content) {
                return Some(clean);
            }
        }
    }
    if let Some(css) = byline_selector {
        if let Ok(sel) = Selector::parse(css) {
            if let Some(el) = document.select(&sel).next() {
                let text = el.text().collect::<String>().trim().to_string();
                let text = BY_PREFIX.replace(&text, "").to_string();
                if let Some(clean) = clean_author(&text) {
                    return Some(clean);
                }
                // The only byline signal may be a profile URL; humanize its
                // slug into "First Last".
                if let Some(href) = el.value().attr("href") {
                    if let Some(slug) = href.trim_end_matches('/').rsplit('/').next() {
                        if let Some(clean) = clean_author(&humanize_slug(slug)) {
                            return Some(clean);
                        }
                    }
                }
            }
        }
    }
    None
}

/// Reject values that are bare URLs/paths, too short, or placeholder words;
/// strip any embedded URL substring before acceptance.
fn clean_author(raw: &str) -> Option<String> {
    let stripped = EMBEDDED_URL.replace_all(raw, "");
    let candidate = stripped.trim().trim_matches(',').trim();
    // Character count, not bytes: one CJK character is still one character.
    if candidate.chars().count() < 2 {
        return None;
    }
    if candidate.starts_with('/') || candidate.contains("://") {
        return None;
    }
    if REJECTED_AUTHOR.is_match(candidate) {
        return None;
    }
    Some(candidate.to_string())
}

fn extract_dates(document: &Html, json_ld: &[Value]) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let published = meta_content(document, r#"meta[property="article:published_time"]"#)
        .as_deref()
        .and_then(parse_iso_date)
        .or_else(|| json_ld_str(json_ld, "datePublished").as_deref().and_then(parse_iso_date))
        .or_else(|| {
            document
                .select(&selector("time[datetime]"))
                .next()
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_iso_date)
        });
    let modified = meta_content(document, r#"meta[property="article:modified_time"]"#)
        .as_deref()
        .and_then(parse_iso_date)
        .or_else(|| json_ld_str(json_ld, "dateModified").as_deref().and_then(parse_iso_date));
    (published, modified)
}

fn extract_section(document: &Html, json_ld: &[Value]) -> Option<String> {
    json_ld_str(json_ld, "articleSection")
        .or_else(|| meta_content(document, r#"meta[property="article:section"]"#))
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Parse an ISO-8601 timestamp or bare date down to a calendar date,
/// discarding any timezone offset after date extraction.
fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    raw.get(0..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    document
        .select(&selector(css))
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Parsed JSON-LD nodes: every top-level script value, with top-level arrays
/// and `@graph` members flattened into individual nodes.
pub(crate) fn json_ld_nodes(document: &Html) -> Vec<Value> {
    let mut nodes = Vec::new();
    for script in document.select(&selector(r#"script[type="application/ld+json"]"#)) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        match value {
            Value::Array(items) => nodes.extend(items),
            other => nodes.push(other),
        }
    }
    let graphs: Vec<Value> = nodes
        .iter()
        .filter_map(|n| n.get("@graph").and_then(|g| g.as_array()).cloned())
        .flatten()
        .collect();
    nodes.extend(graphs);
    nodes
}

fn json_ld_str(nodes: &[Value], key: &str) -> Option<String> {
    nodes
        .iter()
        .find_map(|n| n.get(key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Author name in any of the shapes JSON-LD uses: a plain string, an object
/// with `name`, or a list of either.
fn author_name(node: &Value) -> Option<String> {
    let author = node.get("author")?;
    match author {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("name").and_then(|n| n.as_str()).map(String::from),
        Value::Array(items) => items.first().and_then(|first| match first {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("name").and_then(|n| n.as_str()).map(String::from),
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::newyorker::NewYorker;
    use chrono::Utc;

    fn doc(url: &str, html: &str) -> ExtractedDocument {
        ExtractedDocument {
            url: Url::parse(url).unwrap(),
            html: html.to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_all_defaults_on_empty_document() {
        let d = doc(
            "https://www.newyorker.com/best-books-2025",
            "<html><head></head><body></body></html>",
        );
        let meta = extract(&d, &NewYorker);
        assert_eq!(meta.title, "untitled");
        assert_eq!(meta.author, "unknown");
        assert_eq!(meta.category, "The New Yorker");
        assert_eq!(meta.date, d.fetched_at.date_naive());
    }

    #[test]
    fn test_json_ld_headline_beats_og_title() {
        let html = r#"<html><head>
          <script type="application/ld+json">{"@type":"NewsArticle","headline":"Structured Headline"}</script>
          <meta property="og:title" content="Social Title">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.title, "Structured Headline");
    }

    #[test]
    fn test_title_tag_suffix_stripped() {
        let html = r#"<html><head><title>A Quiet Essay | The New Yorker</title></head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.title, "A Quiet Essay");
    }

    #[test]
    fn test_author_from_graph_json_ld() {
        let html = r#"<html><head>
          <script type="application/ld+json">
          {"@graph":[{"@type":"NewsArticle","author":[{"name":"Jane Doe"}]}]}
          </script>
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "Jane Doe");
    }

    #[test]
    fn test_author_cleaning_rejects_placeholders_and_urls() {
        let html = r#"<html><head>
          <meta name="author" content="n/a">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "unknown");

        let html = r#"<html><head>
          <meta name="author" content="https://www.newyorker.com/contributors/jane-doe">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "unknown");
    }

    #[test]
    fn test_author_length_check_counts_characters() {
        // A single multi-byte character is still one character and must be
        // rejected like a single ASCII letter.
        let html = r#"<html><head>
          <meta name="author" content="王">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "unknown");

        let html = r#"<html><head>
          <meta name="author" content="王小波">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "王小波");
    }

    #[test]
    fn test_author_embedded_url_stripped() {
        let html = r#"<html><head>
          <meta name="author" content="Jane Doe https://www.newyorker.com/contributors/jane-doe">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "Jane Doe");
    }

    #[test]
    fn test_byline_profile_slug_humanized() {
        let html = r#"<html><body>
          <a href="/contributors/jean-luc-picard"></a>
        </body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.author, "Jean Luc Picard");
    }

    #[test]
    fn test_date_timezone_discarded() {
        let html = r#"<html><head>
          <meta property="article:published_time" content="2025-06-30T23:15:00-05:00">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x", html), &NewYorker);
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_probe_dates_published_and_modified() {
        let html = r#"<html><head>
          <meta property="article:published_time" content="2025-06-28T10:00:00Z">
          <meta property="article:modified_time" content="2025-06-30T10:00:00Z">
        </head><body></body></html>"#;
        let (published, modified) = probe_dates(html);
        assert_eq!(published, NaiveDate::from_ymd_opt(2025, 6, 28));
        assert_eq!(modified, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn test_time_element_fallback() {
        let html = r#"<html><body><time datetime="2025-05-01">May 1</time></body></html>"#;
        let (published, _) = probe_dates(html);
        assert_eq!(published, NaiveDate::from_ymd_opt(2025, 5, 1));
    }

    #[test]
    fn test_category_from_url_beats_section_meta() {
        let html = r#"<html><head>
          <meta property="article:section" content="Ideas">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/books/review", html), &NewYorker);
        assert_eq!(meta.category, "books");
    }

    #[test]
    fn test_section_meta_when_path_has_no_category() {
        let html = r#"<html><head>
          <meta property="article:section" content="Ideas">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/best-books-2025", html), &NewYorker);
        assert_eq!(meta.category, "ideas");
    }

    #[test]
    fn test_canonical_url_preferred() {
        let html = r#"<html><head>
          <meta property="og:url" content="https://www.newyorker.com/news/canonical-path">
        </head><body></body></html>"#;
        let meta = extract(&doc("https://www.newyorker.com/news/x?utm=1", html), &NewYorker);
        assert_eq!(meta.url.path(), "/news/canonical-path");
    }

    #[test]
    fn test_translated_title_prefers_h1() {
        let html = r#"<html><head>
          <meta property="og:title" content="English Title">
        </head><body><h1>中文标题</h1></body></html>"#;
        assert_eq!(translated_title(html), Some("中文标题".to_string()));
    }

    #[test]
    fn test_extract_is_idempotent() {
        let html = r#"<html><head>
          <meta property="og:title" content="Stable Title">
          <meta property="article:published_time" content="2025-06-30T10:00:00Z">
        </head><body></body></html>"#;
        let d = doc("https://www.newyorker.com/news/x", html);
        assert_eq!(extract(&d, &NewYorker), extract(&d, &NewYorker));
    }
}
